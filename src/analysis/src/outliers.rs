//! Duration-ratio outliers: tasks running much longer than the rest of their process.
//!
//! Disabled unless `detect_duration_outliers` is set.

use std::collections::BTreeMap;

use crate::config::AnalysisConfig;
use crate::grouping::reduced;
use crate::types::{DurationOutlier, ReducedTask};

pub fn detect_duration_outliers<T: AsRef<ReducedTask>>(
    tasks: &[T],
    config: &AnalysisConfig,
) -> Vec<DurationOutlier> {
    let timed: Vec<(&ReducedTask, u64)> = tasks
        .iter()
        .map(reduced)
        .filter(|t| !t.is_failed())
        .filter_map(|t| t.duration_ms.map(|d| (t, d)))
        .collect();

    // (sum, count) per process and for the whole run, so the other-process mean is a subtraction
    let mut by_process: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for (task, duration) in &timed {
        let entry = by_process
            .entry(task.process_group.as_str())
            .or_insert((0.0, 0));
        entry.0 += *duration as f64;
        entry.1 += 1;
    }
    let run_sum: f64 = by_process.values().map(|(sum, _)| sum).sum();
    let run_count = timed.len();
    let run_mean = (run_count > 0).then(|| run_sum / run_count as f64);

    let mut outliers: Vec<DurationOutlier> = timed
        .iter()
        .filter_map(|(task, duration)| {
            let (process_sum, process_count) = by_process[task.process_group.as_str()];
            let process_mean = process_sum / process_count as f64;
            if process_mean <= 0.0 {
                return None;
            }
            let duration = *duration as f64;
            let ratio_to_process_mean = duration / process_mean;
            if ratio_to_process_mean <= config.duration_deviation_multiplier {
                return None;
            }

            let other_count = run_count - process_count;
            let other_mean =
                (other_count > 0).then(|| (run_sum - process_sum) / other_count as f64);
            let ratio = |reference: Option<f64>| {
                reference
                    .filter(|r| *r > 0.0)
                    .map(|r| duration / r)
            };

            Some(DurationOutlier {
                task_id: task.task_id,
                process: task.process.clone(),
                duration_ms: duration as u64,
                process_mean_ms: process_mean,
                ratio_to_process_mean,
                ratio_to_other_processes: ratio(other_mean),
                ratio_to_run_mean: ratio(run_mean),
            })
        })
        .collect();

    outliers.sort_by(|a, b| b.ratio_to_process_mean.total_cmp(&a.ratio_to_process_mean));
    outliers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::reduce_task;
    use crate::types::{TaskStatus, TaskTrace};

    fn task(id: u64, process: &str, duration_ms: u64) -> ReducedTask {
        reduce_task(
            &TaskTrace::builder()
                .run_name("run")
                .task_id(id)
                .process(process)
                .status(TaskStatus::Completed)
                .duration_ms(duration_ms)
                .build(),
        )
    }

    #[test]
    fn test_detects_task_far_above_process_mean() {
        let tasks = vec![
            task(1, "P", 100),
            task(2, "P", 100),
            task(3, "P", 100),
            task(4, "P", 1_000),
            task(5, "Q", 500),
        ];
        let outliers = detect_duration_outliers(&tasks, &AnalysisConfig::default());
        assert_eq!(outliers.len(), 1);
        let outlier = &outliers[0];
        assert_eq!(outlier.task_id, 4);
        assert_eq!(outlier.process_mean_ms, 325.0);
        assert_eq!(outlier.ratio_to_other_processes, Some(2.0));
        assert_eq!(outlier.ratio_to_run_mean, Some(1_000.0 / 360.0));
    }

    #[test]
    fn test_other_processes_are_pooled() {
        let tasks = vec![
            task(1, "P", 100),
            task(2, "P", 100),
            task(3, "P", 100),
            task(4, "P", 1_000),
            task(5, "Q", 500),
            task(6, "R", 300),
        ];
        let outliers = detect_duration_outliers(&tasks, &AnalysisConfig::default());
        assert_eq!(outliers.len(), 1);
        assert_eq!(outliers[0].ratio_to_other_processes, Some(2.5));
    }

    #[test]
    fn test_uniform_durations_have_no_outliers() {
        let tasks = vec![task(1, "P", 100), task(2, "P", 120)];
        assert!(detect_duration_outliers(&tasks, &AnalysisConfig::default()).is_empty());
    }

    #[test]
    fn test_single_process_has_no_other_ratio() {
        let tasks = vec![
            task(1, "P", 10),
            task(2, "P", 10),
            task(3, "P", 10),
            task(4, "P", 200),
        ];
        let outliers = detect_duration_outliers(&tasks, &AnalysisConfig::default());
        assert_eq!(outliers.len(), 1);
        assert_eq!(outliers[0].ratio_to_other_processes, None);
    }
}
