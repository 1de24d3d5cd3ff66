//! Projection of raw traces onto the flat record every later stage works on.

use tracing::debug;

use crate::constants::IDEAL_ALLOCATION_PERCENTAGE;
use crate::types::{ReducedTask, TagLabel, TaskTrace};

/// Splits `"ALIGN:STAR_ALIGN"` into `("ALIGN", Some("STAR_ALIGN"))`.
pub fn split_process_name(process: &str) -> (String, Option<String>) {
    match process.split_once(':') {
        Some((group, rest)) => {
            let rest = rest.trim();
            (
                group.trim().to_string(),
                (!rest.is_empty()).then(|| rest.to_string()),
            )
        }
        None => (process.trim().to_string(), None),
    }
}

fn usable_measurement(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v >= 0.0)
}

/// `cpu_percentage_used / cpus_requested`: 100 means every requested core was busy.
pub fn cpu_allocation(cpu_percentage_used: Option<f64>, cpus_requested: Option<u64>) -> Option<f64> {
    let used = usable_measurement(cpu_percentage_used)?;
    let cpus = cpus_requested.filter(|c| *c > 0)?;
    Some(used / cpus as f64)
}

/// `rss_bytes / memory_requested_bytes * 100`.
pub fn memory_allocation(rss_bytes: Option<u64>, memory_requested_bytes: Option<u64>) -> Option<f64> {
    let rss = rss_bytes?;
    let requested = memory_requested_bytes.filter(|m| *m > 0)?;
    Some(rss as f64 / requested as f64 * IDEAL_ALLOCATION_PERCENTAGE)
}

/// Absolute deviation from the ideal allocation, as a fraction: `|1 - allocation / 100|`.
pub fn raw_penalty(allocation: Option<f64>) -> Option<f64> {
    allocation.map(|a| (1.0 - a / IDEAL_ALLOCATION_PERCENTAGE).abs())
}

pub fn reduce_task(trace: &TaskTrace) -> ReducedTask {
    let (process_group, sub_process) = split_process_name(&trace.process);
    let tags = trace
        .tag
        .as_deref()
        .map(TagLabel::parse_all)
        .unwrap_or_default();

    let mut task = ReducedTask {
        task_id: trace.task_id,
        run_name: trace.run_name.clone(),
        process: trace.process.clone(),
        process_group,
        sub_process,
        tag: trace.tag.clone(),
        tags,
        status: trace.status,

        cpus_requested: trace.cpus_requested,
        cpu_percentage_used: trace.cpu_percentage_used,
        memory_requested_bytes: trace.memory_requested_bytes,
        rss_bytes: trace.rss_bytes,
        vmem_bytes: trace.vmem_bytes,
        duration_ms: trace.duration_ms,
        realtime_ms: trace.realtime_ms,

        cpu_allocation: None,
        memory_allocation: None,
        raw_cpu_penalty: None,
        raw_memory_penalty: None,
    };

    // measurements of a failed task say nothing about how it should be sized
    if task.is_failed() {
        return task;
    }

    task.cpu_allocation = cpu_allocation(task.cpu_percentage_used, task.cpus_requested);
    task.memory_allocation = memory_allocation(task.rss_bytes, task.memory_requested_bytes);
    task.raw_cpu_penalty = raw_penalty(task.cpu_allocation);
    task.raw_memory_penalty = raw_penalty(task.memory_allocation);
    task
}

pub fn reduce_tasks(traces: &[TaskTrace]) -> Vec<ReducedTask> {
    let tasks: Vec<ReducedTask> = traces.iter().map(reduce_task).collect();
    debug!(
        "Reduced {} traces ({} failed)",
        tasks.len(),
        tasks.iter().filter(|t| t.is_failed()).count()
    );
    tasks
}
