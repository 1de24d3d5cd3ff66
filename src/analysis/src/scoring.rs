use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::constants::{IDEAL_ALLOCATION_PERCENTAGE, OVERSHOOT_DECAY_RATE};
use crate::types::{ReducedTask, TaskScore};

/// A reduced task together with its score, the unit the aggregation stages operate on.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoredTask {
    pub task: ReducedTask,
    pub score: TaskScore,
}

impl AsRef<ReducedTask> for ScoredTask {
    fn as_ref(&self) -> &ReducedTask {
        &self.task
    }
}

/// Scores one allocation percentage in `[0, 1]`.
///
/// Using less than requested is rewarded linearly (`allocation / 100`). Using more than requested
/// decays exponentially with the penalty, so large overshoots are punished superlinearly.
pub fn allocation_score(allocation: f64, raw_penalty: f64) -> f64 {
    if allocation > IDEAL_ALLOCATION_PERCENTAGE {
        (-OVERSHOOT_DECAY_RATE * raw_penalty).exp()
    } else {
        allocation / IDEAL_ALLOCATION_PERCENTAGE
    }
}

fn dimension_score(allocation: Option<f64>, raw_penalty: Option<f64>) -> Option<f64> {
    Some(allocation_score(allocation?, raw_penalty?))
}

/// Weighted mean over the dimensions that are present; only their weights enter the denominator.
pub fn pure_score(
    cpu_score: Option<f64>,
    memory_score: Option<f64>,
    weight_cpu: f64,
    weight_memory: f64,
) -> Option<f64> {
    let (numerator, denominator) = [(cpu_score, weight_cpu), (memory_score, weight_memory)]
        .into_iter()
        .filter_map(|(score, weight)| score.map(|s| (s * weight, weight)))
        .fold((0.0, 0.0), |(num, den), (s, w)| (num + s, den + w));

    (denominator > 0.0).then(|| numerator / denominator)
}

pub fn score_task(task: &ReducedTask, config: &AnalysisConfig) -> TaskScore {
    let cpu_score = dimension_score(task.cpu_allocation, task.raw_cpu_penalty);
    let memory_score = dimension_score(task.memory_allocation, task.raw_memory_penalty);

    TaskScore {
        task_id: task.task_id,
        run_name: task.run_name.clone(),
        process: task.process.clone(),
        status: task.status,

        cpu_allocation: task.cpu_allocation,
        memory_allocation: task.memory_allocation,
        raw_cpu_penalty: task.raw_cpu_penalty,
        raw_memory_penalty: task.raw_memory_penalty,

        cpu_score,
        memory_score,
        weight_cpu: config.cpu_weight,
        weight_memory: config.ram_weight,
        pure_score: pure_score(cpu_score, memory_score, config.cpu_weight, config.ram_weight),
    }
}

pub fn score_tasks(tasks: Vec<ReducedTask>, config: &AnalysisConfig) -> Vec<ScoredTask> {
    tasks
        .into_iter()
        .map(|task| {
            let score = score_task(&task, config);
            ScoredTask { task, score }
        })
        .collect()
}
