use serde::{Deserialize, Serialize};
use std::fmt;
use typed_builder::TypedBuilder;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TaskStatus {
    Submitted,
    Running,
    Completed,
    Cached,
    Failed,
    Aborted,
    #[default]
    #[serde(other)]
    Unknown,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Submitted => "SUBMITTED",
            TaskStatus::Running => "RUNNING",
            TaskStatus::Completed => "COMPLETED",
            TaskStatus::Cached => "CACHED",
            TaskStatus::Failed => "FAILED",
            TaskStatus::Aborted => "ABORTED",
            TaskStatus::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reported execution of one pipeline task, as handed over by the storage layer.
///
/// `task_id` is only unique within a run, process and attempt. Every measurement is optional:
/// the workflow engine omits fields it could not collect.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, TypedBuilder)]
pub struct TaskTrace {
    #[builder(setter(into))]
    pub run_name: String,
    pub task_id: u64,
    #[builder(setter(into))]
    pub process: String,

    #[serde(default)]
    #[builder(default, setter(strip_option, into))]
    pub name: Option<String>,
    #[serde(default)]
    #[builder(default, setter(strip_option, into))]
    pub tag: Option<String>,
    #[serde(default)]
    #[builder(default)]
    pub status: TaskStatus,
    #[serde(default)]
    #[builder(default, setter(strip_option))]
    pub attempt: Option<u32>,

    #[serde(default)]
    #[builder(default, setter(strip_option))]
    pub cpus_requested: Option<u64>,
    #[serde(default)]
    #[builder(default, setter(strip_option))]
    pub cpu_percentage_used: Option<f64>,
    #[serde(default)]
    #[builder(default, setter(strip_option))]
    pub memory_requested_bytes: Option<u64>,
    #[serde(default)]
    #[builder(default, setter(strip_option))]
    pub rss_bytes: Option<u64>,
    #[serde(default)]
    #[builder(default, setter(strip_option))]
    pub vmem_bytes: Option<u64>,
    #[serde(default)]
    #[builder(default, setter(strip_option))]
    pub duration_ms: Option<u64>,
    #[serde(default)]
    #[builder(default, setter(strip_option))]
    pub realtime_ms: Option<u64>,
    #[serde(default)]
    #[builder(default, setter(strip_option))]
    pub time_requested_ms: Option<u64>,
}
