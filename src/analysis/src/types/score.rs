use serde::{Deserialize, Serialize};

use crate::types::trace::TaskStatus;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaskScore {
    pub task_id: u64,
    pub run_name: String,
    pub process: String,
    pub status: TaskStatus,

    pub cpu_allocation: Option<f64>,
    pub memory_allocation: Option<f64>,
    pub raw_cpu_penalty: Option<f64>,
    pub raw_memory_penalty: Option<f64>,

    pub cpu_score: Option<f64>,
    pub memory_score: Option<f64>,
    pub weight_cpu: f64,
    pub weight_memory: f64,
    /// Weighted mean of the dimensions that could be scored.
    pub pure_score: Option<f64>,
}

impl TaskScore {
    pub fn is_fully_scored(&self) -> bool {
        self.cpu_score.is_some() && self.memory_score.is_some()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProcessScore {
    pub process: String,
    pub task_count: usize,
    pub scored_task_count: usize,
    /// Realtime and usage weighted score, `None` when no task could be scored.
    pub weighted_score: Option<f64>,
    pub mean_pure_score: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunScore {
    pub run_name: String,
    pub task_count: usize,
    pub scored_task_count: usize,
    pub weighted_score: Option<f64>,
    pub mean_pure_score: Option<f64>,
}
