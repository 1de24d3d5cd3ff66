//! Compares aggregated allocations against the configured target bands and turns deviations into
//! right-sizing recommendations.

use tracing::debug;

use crate::config::{AllocationInterval, AnalysisConfig};
use crate::constants::{BYTES_PER_GIB, IDEAL_ALLOCATION_PERCENTAGE, MS_PER_MINUTE};
use crate::grouping::{group_by_process, reduced, summarize_group};
use crate::types::{
    BandViolation, GroupSummary, Problem, Recommendation, ReducedTask, Resource, RestrictionReason,
};

/// Run-wide ceilings a recommendation must stay under.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RunLimits {
    pub max_cpus_requested: Option<u64>,
    pub max_rss_bytes: Option<u64>,
}

impl RunLimits {
    pub fn from_tasks<T: AsRef<ReducedTask>>(tasks: &[T]) -> Self {
        let mut limits = RunLimits::default();
        for task in tasks.iter().map(reduced) {
            limits.max_cpus_requested = limits.max_cpus_requested.max(task.cpus_requested);
            if !task.is_failed() {
                limits.max_rss_bytes = limits.max_rss_bytes.max(task.rss_bytes);
            }
        }
        limits
    }
}

/// Whole cores covering `used_cores`: the fractional part only bumps to the next core when it
/// exceeds `fractional_threshold`. Never below one core.
pub fn round_cores(used_cores: f64, fractional_threshold: f64) -> u64 {
    let whole = used_cores.floor();
    let bump = if used_cores - whole > fractional_threshold {
        1.0
    } else {
        0.0
    };
    ((whole + bump) as u64).max(1)
}

/// Rounds to a GiB boundary, never below 1 GiB. With `force_up` any remainder rounds up,
/// otherwise remainders below half a GiB round down.
pub fn round_to_gib(bytes: f64, force_up: bool) -> u64 {
    let gib = bytes / BYTES_PER_GIB as f64;
    let whole = gib.floor();
    let remainder = gib - whole;
    let rounded = if (force_up && remainder > 0.0) || remainder >= 0.5 {
        whole + 1.0
    } else {
        whole
    };
    (rounded as u64).max(1) * BYTES_PER_GIB
}

fn band_violation(allocation: f64, band: &AllocationInterval) -> Option<BandViolation> {
    if band.contains(allocation) {
        None
    } else if allocation > band.high {
        Some(BandViolation::AboveBand)
    } else {
        Some(BandViolation::BelowBand)
    }
}

/// `minutes(duration) * requested quantity * |100 - allocation|`.
pub fn severity(duration_ms: u64, requested_quantity: f64, allocation: f64) -> f64 {
    duration_ms as f64 / MS_PER_MINUTE
        * requested_quantity
        * (IDEAL_ALLOCATION_PERCENTAGE - allocation).abs()
}

fn cpu_problem(
    run_name: &str,
    summary: &GroupSummary,
    limits: &RunLimits,
    config: &AnalysisConfig,
) -> Option<Problem> {
    let allocation = summary.cpu_allocation_avg?;
    let cpus = summary.cpus_requested.filter(|c| *c > 0)?;
    let violation = band_violation(allocation, &config.interval_valid_cpu_allocation_percentage)?;

    let recommendation = match violation {
        BandViolation::AboveBand => {
            // 250% of the request -> 2.5 -> 3 cpus
            let suggested = round_cores(
                allocation / IDEAL_ALLOCATION_PERCENTAGE,
                config.cpu_fractional_threshold,
            );
            let max_cpus = limits.max_cpus_requested.unwrap_or(cpus);
            if cpus >= max_cpus || suggested > max_cpus {
                Recommendation::Restricted {
                    reason: RestrictionReason::MaxReached,
                }
            } else {
                Recommendation::SetCpus { cpus: suggested }
            }
        }
        BandViolation::BelowBand if cpus > 1 => {
            let used_cores = allocation / IDEAL_ALLOCATION_PERCENTAGE * cpus as f64;
            Recommendation::SetCpus {
                cpus: round_cores(used_cores, config.cpu_fractional_threshold).min(cpus - 1),
            }
        }
        BandViolation::BelowBand => Recommendation::SplitTask,
    };

    Some(Problem {
        run_name: run_name.to_string(),
        process: summary.name.clone(),
        resource: Resource::Cpu,
        violation,
        allocation_percentage: allocation,
        current_request: cpus,
        recommendation,
        severity: severity(summary.duration_sum_ms, cpus as f64, allocation),
        task_ids: summary.task_ids.clone(),
    })
}

fn memory_problem(
    run_name: &str,
    summary: &GroupSummary,
    limits: &RunLimits,
    config: &AnalysisConfig,
) -> Option<Problem> {
    let allocation = summary.memory_allocation_avg?;
    let requested = summary.memory_requested_bytes.filter(|m| *m > 0)?;
    let violation = band_violation(allocation, &config.interval_valid_ram_allocation_percentage)?;

    let used_bytes = allocation / IDEAL_ALLOCATION_PERCENTAGE * requested as f64;
    let suggested = round_to_gib(used_bytes, violation == BandViolation::AboveBand);

    let recommendation = match violation {
        BandViolation::AboveBand
            if limits
                .max_rss_bytes
                .is_some_and(|max_rss| suggested > max_rss) =>
        {
            Recommendation::Restricted {
                reason: RestrictionReason::MaxReached,
            }
        }
        // rounding cannot go below the current request
        BandViolation::BelowBand if suggested >= requested => Recommendation::SplitTask,
        _ => Recommendation::SetMemory { bytes: suggested },
    };

    Some(Problem {
        run_name: run_name.to_string(),
        process: summary.name.clone(),
        resource: Resource::Memory,
        violation,
        allocation_percentage: allocation,
        current_request: requested,
        recommendation,
        severity: severity(
            summary.duration_sum_ms,
            requested as f64 / BYTES_PER_GIB as f64,
            allocation,
        ),
        task_ids: summary.task_ids.clone(),
    })
}

/// Problems of one run, most severe first. Failed tasks and tasks shorter than
/// `duration_to_consider_threshold_ms` (or without a duration) are not considered; a process
/// lacking the data for a dimension simply yields no problem for it.
pub fn detect_problems<T: AsRef<ReducedTask>>(
    run_name: &str,
    tasks: &[T],
    config: &AnalysisConfig,
) -> Vec<Problem> {
    let limits = RunLimits::from_tasks(tasks);

    let considered = tasks.iter().map(reduced).filter(|t| {
        !t.is_failed()
            && t.duration_ms
                .is_some_and(|d| d >= config.duration_to_consider_threshold_ms)
    });

    let mut problems: Vec<Problem> = group_by_process(considered)
        .iter()
        .map(|(process, group)| summarize_group(process, group))
        .flat_map(|summary| {
            [
                cpu_problem(run_name, &summary, &limits, config),
                memory_problem(run_name, &summary, &limits, config),
            ]
        })
        .flatten()
        .collect();

    problems.sort_by(|a, b| b.severity.total_cmp(&a.severity));

    debug!("Detected {} problems in run {}", problems.len(), run_name);
    problems
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::reduce_task;
    use crate::types::{TaskStatus, TaskTrace};
    use rstest::rstest;

    const TEN_MINUTES_MS: u64 = 600_000;

    fn cpu_task(id: u64, process: &str, cpus: u64, cpu_pct: f64) -> ReducedTask {
        reduce_task(
            &TaskTrace::builder()
                .run_name("run")
                .task_id(id)
                .process(process)
                .status(TaskStatus::Completed)
                .cpus_requested(cpus)
                .cpu_percentage_used(cpu_pct)
                .duration_ms(TEN_MINUTES_MS)
                .build(),
        )
    }

    fn memory_task(id: u64, process: &str, requested_gib: f64, rss_gib: f64) -> ReducedTask {
        reduce_task(
            &TaskTrace::builder()
                .run_name("run")
                .task_id(id)
                .process(process)
                .status(TaskStatus::Completed)
                .memory_requested_bytes((requested_gib * BYTES_PER_GIB as f64) as u64)
                .rss_bytes((rss_gib * BYTES_PER_GIB as f64) as u64)
                .duration_ms(TEN_MINUTES_MS)
                .build(),
        )
    }

    #[rstest]
    #[case(2.5, 0.2, 3)]
    #[case(2.1, 0.2, 2)]
    #[case(2.0, 0.2, 2)]
    #[case(0.3, 0.2, 1)]
    #[case(0.1, 0.2, 1)]
    fn test_round_cores(#[case] used: f64, #[case] threshold: f64, #[case] expected: u64) {
        assert_eq!(round_cores(used, threshold), expected);
    }

    #[rstest]
    #[case(2.3, false, 2)]
    #[case(2.5, false, 3)]
    #[case(2.3, true, 3)]
    #[case(2.0, true, 2)]
    #[case(0.2, false, 1)]
    fn test_round_to_gib(#[case] gib: f64, #[case] force_up: bool, #[case] expected_gib: u64) {
        assert_eq!(
            round_to_gib(gib * BYTES_PER_GIB as f64, force_up),
            expected_gib * BYTES_PER_GIB
        );
    }

    #[test]
    fn test_under_used_single_cpu_recommends_split() {
        let tasks = vec![cpu_task(1, "P", 1, 50.0)];
        let problems = detect_problems("run", &tasks, &AnalysisConfig::default());
        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].violation, BandViolation::BelowBand);
        assert_eq!(problems[0].recommendation, Recommendation::SplitTask);
    }

    #[test]
    fn test_under_used_cpus_are_decreased() {
        let tasks = vec![cpu_task(1, "P", 8, 200.0)];
        let problems = detect_problems("run", &tasks, &AnalysisConfig::default());
        // 25% of 8 cores -> 2 cores used
        assert_eq!(problems[0].recommendation, Recommendation::SetCpus { cpus: 2 });
    }

    #[test]
    fn test_over_used_cpus_are_increased_below_run_max() {
        let tasks = vec![cpu_task(1, "P", 2, 500.0), cpu_task(2, "Q", 4, 400.0)];
        let problems = detect_problems("run", &tasks, &AnalysisConfig::default());
        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].process, "P");
        assert_eq!(problems[0].allocation_percentage, 250.0);
        assert_eq!(problems[0].recommendation, Recommendation::SetCpus { cpus: 3 });
    }

    #[test]
    fn test_over_used_cpus_at_run_max_are_restricted() {
        let tasks = vec![cpu_task(1, "P", 2, 500.0)];
        let problems = detect_problems("run", &tasks, &AnalysisConfig::default());
        assert_eq!(
            problems[0].recommendation,
            Recommendation::Restricted {
                reason: RestrictionReason::MaxReached
            }
        );
    }

    #[test]
    fn test_recommendation_above_run_max_is_restricted() {
        // 600% of the request -> 6 cpus while the largest request in the run is 4
        let tasks = vec![cpu_task(1, "P", 2, 1_200.0), cpu_task(2, "Q", 4, 400.0)];
        let problems = detect_problems("run", &tasks, &AnalysisConfig::default());
        assert_eq!(
            problems[0].recommendation,
            Recommendation::Restricted {
                reason: RestrictionReason::MaxReached
            }
        );
    }

    #[test]
    fn test_memory_under_band_rounds_to_nearest_gib() {
        let tasks = vec![memory_task(1, "P", 8.0, 2.3)];
        let problems = detect_problems("run", &tasks, &AnalysisConfig::default());
        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].resource, Resource::Memory);
        assert_eq!(
            problems[0].recommendation,
            Recommendation::SetMemory {
                bytes: 2 * BYTES_PER_GIB
            }
        );
    }

    #[test]
    fn test_memory_under_band_at_smallest_step_is_split() {
        let tasks = vec![memory_task(1, "P", 1.0, 0.3)];
        let problems = detect_problems("run", &tasks, &AnalysisConfig::default());
        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].violation, BandViolation::BelowBand);
        assert_eq!(problems[0].recommendation, Recommendation::SplitTask);
    }

    #[test]
    fn test_over_used_cpus_scale_with_allocation() {
        let tasks = vec![cpu_task(1, "P", 2, 500.0), cpu_task(2, "Q", 8, 800.0)];
        let problems = detect_problems("run", &tasks, &AnalysisConfig::default());
        let problem = problems.iter().find(|p| p.process == "P").unwrap();
        assert_eq!(problem.recommendation, Recommendation::SetCpus { cpus: 3 });
    }

    #[rstest]
    #[case(59.9, Some(BandViolation::BelowBand))]
    #[case(60.0, None)]
    #[case(140.0, None)]
    #[case(140.1, Some(BandViolation::AboveBand))]
    fn test_band_violation(#[case] allocation: f64, #[case] expected: Option<BandViolation>) {
        let band = AllocationInterval::new(60.0, 140.0);
        assert_eq!(band_violation(allocation, &band), expected);
    }

    #[test]
    fn test_memory_over_band_rounds_up() {
        let tasks = vec![memory_task(1, "P", 2.0, 2.4), memory_task(2, "Q", 4.0, 3.9)];
        let problems = detect_problems("run", &tasks, &AnalysisConfig::default());
        let problem = problems.iter().find(|p| p.process == "P").unwrap();
        assert_eq!(problem.violation, BandViolation::AboveBand);
        assert_eq!(
            problem.recommendation,
            Recommendation::SetMemory {
                bytes: 3 * BYTES_PER_GIB
            }
        );
    }

    #[test]
    fn test_memory_over_band_beyond_observed_rss_is_restricted() {
        let tasks = vec![memory_task(1, "P", 2.0, 2.4)];
        let problems = detect_problems("run", &tasks, &AnalysisConfig::default());
        assert_eq!(
            problems[0].recommendation,
            Recommendation::Restricted {
                reason: RestrictionReason::MaxReached
            }
        );
    }

    #[test]
    fn test_short_tasks_are_ignored() {
        let mut task = cpu_task(1, "P", 1, 10.0);
        task.duration_ms = Some(500);
        let problems = detect_problems("run", &[task], &AnalysisConfig::default());
        assert!(problems.is_empty());
    }

    #[test]
    fn test_tasks_in_band_have_no_problem() {
        let tasks = vec![cpu_task(1, "P", 2, 180.0)];
        assert!(detect_problems("run", &tasks, &AnalysisConfig::default()).is_empty());
    }

    #[test]
    fn test_problems_sorted_by_severity() {
        let tasks = vec![cpu_task(1, "SMALL", 2, 100.0), cpu_task(2, "BIG", 16, 160.0)];
        let problems = detect_problems("run", &tasks, &AnalysisConfig::default());
        assert_eq!(problems.len(), 2);
        assert_eq!(problems[0].process, "BIG");
        assert!(problems[0].severity >= problems[1].severity);
    }

    #[test]
    fn test_severity() {
        // 10 minutes * 4 cpus * |100 - 50|
        assert_eq!(severity(TEN_MINUTES_MS, 4.0, 50.0), 2_000.0);
    }
}
