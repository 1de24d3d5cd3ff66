use serde::{Deserialize, Serialize};

use crate::types::tags::TagLabel;
use crate::types::trace::TaskStatus;

/// Flattened projection of a [`TaskTrace`](crate::types::TaskTrace) with the derived
/// allocation and penalty fields. Derived fields are `None` whenever an input is missing,
/// a denominator is zero, or the task failed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReducedTask {
    pub task_id: u64,
    pub run_name: String,
    pub process: String,
    /// Top-level segment of `process`, before the first `:`.
    pub process_group: String,
    /// Remainder of `process` after the first `:`, kept for display.
    pub sub_process: Option<String>,
    pub tag: Option<String>,
    pub tags: Vec<TagLabel>,
    pub status: TaskStatus,

    pub cpus_requested: Option<u64>,
    pub cpu_percentage_used: Option<f64>,
    pub memory_requested_bytes: Option<u64>,
    pub rss_bytes: Option<u64>,
    pub vmem_bytes: Option<u64>,
    pub duration_ms: Option<u64>,
    pub realtime_ms: Option<u64>,

    pub cpu_allocation: Option<f64>,
    pub memory_allocation: Option<f64>,
    pub raw_cpu_penalty: Option<f64>,
    pub raw_memory_penalty: Option<f64>,
}

impl ReducedTask {
    pub fn is_failed(&self) -> bool {
        self.status == TaskStatus::Failed
    }
}

impl AsRef<ReducedTask> for ReducedTask {
    fn as_ref(&self) -> &ReducedTask {
        self
    }
}
