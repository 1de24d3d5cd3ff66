use serde::Deserialize;

use crate::types::{TaskStatus, TaskTrace};

/// One event posted by the workflow engine's web-log reporter.
///
/// Run lifecycle events (`started`, `completed`, ...) carry `metadata` instead of a `trace`
/// and do not describe a task.
#[derive(Debug, Deserialize)]
pub struct WeblogEvent {
    #[serde(default, alias = "runName")]
    pub run_name: Option<String>,
    #[serde(default)]
    pub event: Option<String>,
    #[serde(default)]
    pub trace: Option<WeblogTrace>,
}

#[derive(Debug, Deserialize)]
pub struct WeblogTrace {
    pub task_id: u64,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub process: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub attempt: Option<u32>,
    #[serde(default)]
    pub cpus: Option<u64>,
    #[serde(default)]
    pub memory: Option<u64>,
    #[serde(default)]
    pub time: Option<u64>,
    #[serde(default)]
    pub duration: Option<u64>,
    #[serde(default)]
    pub realtime: Option<u64>,
    #[serde(default, rename = "%cpu")]
    pub cpu_percentage: Option<f64>,
    #[serde(default)]
    pub rss: Option<u64>,
    #[serde(default)]
    pub vmem: Option<u64>,
}

impl WeblogEvent {
    /// `None` for events that carry no task, or whose task cannot be attributed to a run and
    /// a process.
    pub fn into_task_trace(self) -> Option<TaskTrace> {
        let trace = self.trace?;
        let run_name = self.run_name?;
        let process = trace.process.or_else(|| trace.name.clone())?;

        Some(TaskTrace {
            run_name,
            task_id: trace.task_id,
            process,
            name: trace.name,
            tag: trace.tag,
            status: trace.status,
            attempt: trace.attempt,
            cpus_requested: trace.cpus,
            cpu_percentage_used: trace.cpu_percentage,
            memory_requested_bytes: trace.memory,
            rss_bytes: trace.rss,
            vmem_bytes: trace.vmem,
            duration_ms: trace.duration,
            realtime_ms: trace.realtime,
            time_requested_ms: trace.time,
        })
    }
}
