//! Process- and run-level scores, weighted by realtime and absolute resource usage.

use crate::config::AnalysisConfig;
use crate::constants::IDEAL_ALLOCATION_PERCENTAGE;
use crate::grouping::{group_by_process, mean};
use crate::scoring::ScoredTask;
use crate::types::{ProcessScore, RunScore};

/// One task's contribution to the weighted score: `(numerator, denominator)`.
///
/// Only tasks with both dimensions scored, a realtime and a cpu/rss measurement contribute.
fn weighted_terms(scored: &ScoredTask, config: &AnalysisConfig) -> Option<(f64, f64)> {
    let task = &scored.task;
    let cpu_score = scored.score.cpu_score?;
    let memory_score = scored.score.memory_score?;
    let realtime = task.realtime_ms? as f64;

    let frac_cpu = task.cpu_percentage_used? / IDEAL_ALLOCATION_PERCENTAGE;
    let frac_mem = task.rss_bytes? as f64 / config.memory_reference_bytes as f64;

    let numerator = (config.cpu_weight * cpu_score * frac_cpu
        + config.ram_weight * memory_score * frac_mem)
        * realtime;
    let denominator = (config.cpu_weight * frac_cpu + config.ram_weight * frac_mem) * realtime;
    Some((numerator, denominator))
}

/// `Σ numerator / Σ denominator` over the scoreable tasks, `None` when nothing contributes.
pub fn weighted_score<'a, I>(tasks: I, config: &AnalysisConfig) -> Option<f64>
where
    I: IntoIterator<Item = &'a ScoredTask>,
{
    let (numerator, denominator, contributing) = tasks
        .into_iter()
        .filter_map(|t| weighted_terms(t, config))
        .fold((0.0, 0.0, 0usize), |(num, den, n), (tn, td)| {
            (num + tn, den + td, n + 1)
        });

    if contributing == 0 || denominator <= 0.0 || !denominator.is_finite() {
        return None;
    }
    Some(numerator / denominator)
}

fn mean_pure_score(tasks: &[&ScoredTask]) -> Option<f64> {
    mean(tasks.iter().filter_map(|t| t.score.pure_score))
}

fn scored_count(tasks: &[&ScoredTask]) -> usize {
    tasks.iter().filter(|t| t.score.is_fully_scored()).count()
}

pub fn process_score(process: &str, tasks: &[&ScoredTask], config: &AnalysisConfig) -> ProcessScore {
    ProcessScore {
        process: process.to_string(),
        task_count: tasks.len(),
        scored_task_count: scored_count(tasks),
        weighted_score: weighted_score(tasks.iter().copied(), config),
        mean_pure_score: mean_pure_score(tasks),
    }
}

pub fn process_scores(tasks: &[ScoredTask], config: &AnalysisConfig) -> Vec<ProcessScore> {
    group_by_process(tasks)
        .iter()
        .map(|(process, group)| process_score(process, group, config))
        .collect()
}

/// Same formula as [`process_score`], over every task of the run regardless of process.
pub fn run_score(run_name: &str, tasks: &[ScoredTask], config: &AnalysisConfig) -> RunScore {
    let refs: Vec<&ScoredTask> = tasks.iter().collect();
    RunScore {
        run_name: run_name.to_string(),
        task_count: refs.len(),
        scored_task_count: scored_count(&refs),
        weighted_score: weighted_score(refs.iter().copied(), config),
        mean_pure_score: mean_pure_score(&refs),
    }
}
