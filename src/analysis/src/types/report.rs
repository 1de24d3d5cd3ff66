use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::types::score::{ProcessScore, RunScore, TaskScore};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingMetric {
    Duration,
    Realtime,
    CpuPenalty,
    MemoryPenalty,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Ascending,
    Descending,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RankedTask {
    pub task_id: u64,
    pub process: String,
    pub value: f64,
}

/// Most extreme tasks of a domain (a whole run, or one process) per metric.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorstOffenders {
    pub by_duration: Vec<RankedTask>,
    pub by_cpu_penalty: Vec<RankedTask>,
    pub by_memory_penalty: Vec<RankedTask>,
}

/// Sums and averages over a group of tasks (a process or a tag).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub name: String,
    pub task_count: usize,
    pub failed_task_count: usize,
    pub task_ids: Vec<u64>,
    pub sub_processes: Vec<String>,

    pub duration_sum_ms: u64,
    pub duration_avg_ms: Option<f64>,
    pub realtime_sum_ms: u64,
    pub realtime_avg_ms: Option<f64>,

    pub cpu_allocation_avg: Option<f64>,
    pub memory_allocation_avg: Option<f64>,
    pub cpu_percentage_avg: Option<f64>,

    pub cpus_requested: Option<u64>,
    pub memory_requested_bytes: Option<u64>,
    pub max_rss_bytes: Option<u64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Cpu,
    Memory,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Cpu => f.write_str("cpu"),
            Resource::Memory => f.write_str("memory"),
        }
    }
}

/// Which side of the target band the average allocation fell on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BandViolation {
    AboveBand,
    BelowBand,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestrictionReason {
    /// The request already sits at the largest value seen in the run.
    MaxReached,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Recommendation {
    SetCpus { cpus: u64 },
    SetMemory { bytes: u64 },
    SplitTask,
    Restricted { reason: RestrictionReason },
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recommendation::SetCpus { cpus } => write!(f, "set cpus to {}", cpus),
            Recommendation::SetMemory { bytes } => write!(
                f,
                "set memory to {} GiB",
                bytes / crate::constants::BYTES_PER_GIB
            ),
            Recommendation::SplitTask => f.write_str("split the task into smaller units"),
            Recommendation::Restricted { .. } => {
                f.write_str("restricted: resource ceiling of the run reached")
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    pub run_name: String,
    pub process: String,
    pub resource: Resource,
    pub violation: BandViolation,
    pub allocation_percentage: f64,
    /// Cpus or bytes, depending on `resource`.
    pub current_request: u64,
    pub recommendation: Recommendation,
    /// Impact score used for ordering only.
    pub severity: f64,
    pub task_ids: Vec<u64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DurationOutlier {
    pub task_id: u64,
    pub process: String,
    pub duration_ms: u64,
    pub process_mean_ms: f64,
    pub ratio_to_process_mean: f64,
    pub ratio_to_other_processes: Option<f64>,
    pub ratio_to_run_mean: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_name: String,
    pub task_count: usize,
    pub failed_task_count: usize,
    pub task_scores: Vec<TaskScore>,
    pub worst: WorstOffenders,
    pub process_worst: BTreeMap<String, WorstOffenders>,
    pub process_summaries: Vec<GroupSummary>,
    pub process_scores: Vec<ProcessScore>,
    pub tag_summaries: Vec<GroupSummary>,
    pub run_score: RunScore,
    pub problems: Vec<Problem>,
    pub duration_outliers: Vec<DurationOutlier>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub runs: Vec<RunReport>,
}

impl AnalysisReport {
    pub fn run(&self, run_name: &str) -> Option<&RunReport> {
        self.runs.iter().find(|run| run.run_name == run_name)
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}
