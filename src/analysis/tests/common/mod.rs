#![allow(dead_code)]

use tracer_analysis::constants::BYTES_PER_GIB;
use tracer_analysis::types::{TaskStatus, TaskTrace};

pub const RUN: &str = "nfcore-rnaseq";
pub const TEN_MINUTES_MS: u64 = 600_000;

/// A completed task that used exactly what it requested for ten minutes.
pub fn well_sized_task(task_id: u64, process: &str) -> TaskTrace {
    TaskTrace::builder()
        .run_name(RUN)
        .task_id(task_id)
        .process(process)
        .status(TaskStatus::Completed)
        .cpus_requested(4)
        .cpu_percentage_used(400.0)
        .memory_requested_bytes(4 * BYTES_PER_GIB)
        .rss_bytes(3 * BYTES_PER_GIB + BYTES_PER_GIB / 2)
        .duration_ms(TEN_MINUTES_MS)
        .realtime_ms(TEN_MINUTES_MS)
        .build()
}

pub fn cpu_task(task_id: u64, process: &str, cpus: u64, cpu_percentage: f64) -> TaskTrace {
    TaskTrace::builder()
        .run_name(RUN)
        .task_id(task_id)
        .process(process)
        .status(TaskStatus::Completed)
        .cpus_requested(cpus)
        .cpu_percentage_used(cpu_percentage)
        .duration_ms(TEN_MINUTES_MS)
        .realtime_ms(TEN_MINUTES_MS)
        .build()
}

pub fn failed(mut trace: TaskTrace) -> TaskTrace {
    trace.status = TaskStatus::Failed;
    trace
}

/// A small run mixing well-sized, over- and under-provisioned processes.
pub fn mixed_run() -> Vec<TaskTrace> {
    let mut traces = vec![
        well_sized_task(1, "NFCORE_RNASEQ:FASTQC"),
        well_sized_task(2, "NFCORE_RNASEQ:FASTQC"),
        cpu_task(3, "STAR_ALIGN", 8, 200.0),
        cpu_task(4, "STAR_ALIGN", 8, 280.0),
        cpu_task(5, "SALMON_QUANT", 2, 500.0),
        failed(cpu_task(6, "MULTIQC", 1, 10.0)),
    ];
    traces[0].tag = Some("sample:S1".into());
    traces[1].tag = Some("sample:S2".into());
    traces
}
