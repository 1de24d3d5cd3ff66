//! Grouping of tasks by run, process and tag, worst-offender rankings and group summaries.

use itertools::Itertools;
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::config::AnalysisConfig;
use crate::types::{GroupSummary, RankedTask, RankingMetric, ReducedTask, SortOrder, WorstOffenders};

pub(crate) fn reduced<T: AsRef<ReducedTask>>(task: &T) -> &ReducedTask {
    task.as_ref()
}

pub fn group_by_run<T, I>(tasks: I) -> BTreeMap<String, Vec<T>>
where
    T: AsRef<ReducedTask>,
    I: IntoIterator<Item = T>,
{
    let mut groups: BTreeMap<String, Vec<T>> = BTreeMap::new();
    for task in tasks {
        let key = task.as_ref().run_name.clone();
        groups.entry(key).or_default().push(task);
    }
    groups
}

/// Groups on the top-level process name, so `ALIGN:STAR` and `ALIGN:HISAT` share a group.
pub fn group_by_process<T, I>(tasks: I) -> BTreeMap<String, Vec<T>>
where
    T: AsRef<ReducedTask>,
    I: IntoIterator<Item = T>,
{
    let mut groups: BTreeMap<String, Vec<T>> = BTreeMap::new();
    for task in tasks {
        let key = task.as_ref().process_group.clone();
        groups.entry(key).or_default().push(task);
    }
    groups
}

/// A task carrying several tag labels lands in each of their groups; untagged tasks are skipped.
pub fn group_by_tag<T, I>(tasks: I) -> BTreeMap<String, Vec<T>>
where
    T: AsRef<ReducedTask> + Clone,
    I: IntoIterator<Item = T>,
{
    let mut groups: BTreeMap<String, Vec<T>> = BTreeMap::new();
    for task in tasks {
        let labels = task
            .as_ref()
            .tags
            .iter()
            .map(ToString::to_string)
            .unique()
            .collect::<Vec<_>>();
        for label in labels {
            groups.entry(label).or_default().push(task.clone());
        }
    }
    groups
}

/// Number of entries a ranking keeps: the `top_percent_ratio` share of the domain, at least one,
/// never more than `limit`.
pub fn top_n(total: usize, top_percent_ratio: f64, limit: usize) -> usize {
    if total == 0 {
        return 0;
    }
    let by_ratio = (total as f64 * top_percent_ratio).ceil() as usize;
    by_ratio.max(1).min(limit).min(total)
}

pub fn metric_value(task: &ReducedTask, metric: RankingMetric) -> Option<f64> {
    match metric {
        RankingMetric::Duration => task.duration_ms.map(|d| d as f64),
        RankingMetric::Realtime => task.realtime_ms.map(|r| r as f64),
        RankingMetric::CpuPenalty => task.raw_cpu_penalty,
        RankingMetric::MemoryPenalty => task.raw_memory_penalty,
    }
}

/// The `top_n` most extreme tasks by `metric`. Tasks without a value are not ranked and ties keep
/// their input order.
pub fn rank_worst<T: AsRef<ReducedTask>>(
    tasks: &[T],
    metric: RankingMetric,
    top_n: usize,
    order: SortOrder,
) -> Vec<RankedTask> {
    tasks
        .iter()
        .map(reduced)
        .filter_map(|task| metric_value(task, metric).map(|value| (task, value)))
        .sorted_by(|(_, a), (_, b)| match order {
            SortOrder::Ascending => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            SortOrder::Descending => b.partial_cmp(a).unwrap_or(Ordering::Equal),
        })
        .take(top_n)
        .map(|(task, value)| RankedTask {
            task_id: task.task_id,
            process: task.process.clone(),
            value,
        })
        .collect()
}

pub fn worst_offenders<T: AsRef<ReducedTask>>(
    tasks: &[T],
    config: &AnalysisConfig,
) -> WorstOffenders {
    let n = top_n(
        tasks.len(),
        config.top_percent_ratio,
        config.limit_processes_per_domain_by_number,
    );
    WorstOffenders {
        by_duration: rank_worst(tasks, RankingMetric::Duration, n, SortOrder::Descending),
        by_cpu_penalty: rank_worst(tasks, RankingMetric::CpuPenalty, n, SortOrder::Descending),
        by_memory_penalty: rank_worst(tasks, RankingMetric::MemoryPenalty, n, SortOrder::Descending),
    }
}

pub(crate) fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

pub fn summarize_group<T: AsRef<ReducedTask>>(name: &str, tasks: &[T]) -> GroupSummary {
    let tasks: Vec<&ReducedTask> = tasks.iter().map(reduced).collect();

    let durations = tasks.iter().filter_map(|t| t.duration_ms).collect::<Vec<_>>();
    let realtimes = tasks.iter().filter_map(|t| t.realtime_ms).collect::<Vec<_>>();

    GroupSummary {
        name: name.to_string(),
        task_count: tasks.len(),
        failed_task_count: tasks.iter().filter(|t| t.is_failed()).count(),
        task_ids: tasks.iter().map(|t| t.task_id).collect(),
        sub_processes: tasks
            .iter()
            .filter_map(|t| t.sub_process.clone())
            .unique()
            .collect(),

        duration_sum_ms: durations.iter().sum(),
        duration_avg_ms: mean(durations.iter().map(|d| *d as f64)),
        realtime_sum_ms: realtimes.iter().sum(),
        realtime_avg_ms: mean(realtimes.iter().map(|r| *r as f64)),

        cpu_allocation_avg: mean(tasks.iter().filter_map(|t| t.cpu_allocation)),
        memory_allocation_avg: mean(tasks.iter().filter_map(|t| t.memory_allocation)),
        cpu_percentage_avg: mean(
            tasks
                .iter()
                .filter(|t| !t.is_failed())
                .filter_map(|t| t.cpu_percentage_used),
        ),

        cpus_requested: tasks.iter().filter_map(|t| t.cpus_requested).max(),
        memory_requested_bytes: tasks.iter().filter_map(|t| t.memory_requested_bytes).max(),
        max_rss_bytes: tasks.iter().filter_map(|t| t.rss_bytes).max(),
    }
}

pub fn summarize_processes<T: AsRef<ReducedTask>>(tasks: &[T]) -> Vec<GroupSummary> {
    group_by_process(tasks.iter().map(reduced))
        .iter()
        .map(|(process, group)| summarize_group(process, group))
        .collect()
}

pub fn summarize_tags<T: AsRef<ReducedTask>>(tasks: &[T]) -> Vec<GroupSummary> {
    group_by_tag(tasks.iter().map(reduced))
        .iter()
        .map(|(tag, group)| summarize_group(tag, group))
        .collect()
}
