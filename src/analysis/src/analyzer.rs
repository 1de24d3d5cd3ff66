use tracing::{debug, info, warn};

use crate::aggregation::{process_scores, run_score};
use crate::config::AnalysisConfig;
use crate::detector::detect_problems;
use crate::errors::AnalysisResult;
use crate::grouping::{
    group_by_process, group_by_run, summarize_processes, summarize_tags, worst_offenders,
};
use crate::normalize::reduce_tasks;
use crate::outliers::detect_duration_outliers;
use crate::scoring::{score_tasks, ScoredTask};
use crate::types::{AnalysisReport, RunReport, TaskTrace};

/// Runs the normalize → score → group → aggregate → detect pipeline over a snapshot of traces.
///
/// The analyzer owns its configuration and keeps no other state, so concurrent requests with
/// different thresholds each build their own analyzer.
#[derive(Clone, Debug)]
pub struct TraceAnalyzer {
    config: AnalysisConfig,
}

impl TraceAnalyzer {
    /// Rejects an invalid configuration before any computation.
    pub fn new(config: AnalysisConfig) -> AnalysisResult<Self> {
        if let Err(e) = config.validate() {
            warn!("Rejecting analysis configuration: {}", e);
            return Err(e.into());
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn analyze(&self, traces: &[TaskTrace]) -> AnalysisReport {
        self.analyze_filtered(traces, None)
    }

    /// Like [`analyze`](Self::analyze), restricted to one run when `run_name` is given.
    pub fn analyze_filtered(&self, traces: &[TaskTrace], run_name: Option<&str>) -> AnalysisReport {
        let traces: Vec<TaskTrace> = traces
            .iter()
            .filter(|t| run_name.map_or(true, |name| t.run_name == name))
            .cloned()
            .collect();

        let scored = score_tasks(reduce_tasks(&traces), &self.config);
        let runs: Vec<RunReport> = group_by_run(scored)
            .into_iter()
            .map(|(run_name, tasks)| self.run_report(&run_name, &tasks))
            .collect();

        info!(
            "Analyzed {} tasks across {} runs",
            traces.len(),
            runs.len()
        );
        AnalysisReport { runs }
    }

    /// Report for the tasks of a single run. An empty slice yields an empty report.
    pub fn analyze_run(&self, run_name: &str, traces: &[TaskTrace]) -> RunReport {
        let traces: Vec<TaskTrace> = traces
            .iter()
            .filter(|t| t.run_name == run_name)
            .cloned()
            .collect();
        let scored = score_tasks(reduce_tasks(&traces), &self.config);
        self.run_report(run_name, &scored)
    }

    fn run_report(&self, run_name: &str, tasks: &[ScoredTask]) -> RunReport {
        let config = &self.config;

        let process_worst = group_by_process(tasks)
            .into_iter()
            .map(|(process, group)| (process, worst_offenders(&group, config)))
            .collect();

        let duration_outliers = if config.detect_duration_outliers {
            detect_duration_outliers(tasks, config)
        } else {
            Vec::new()
        };

        let report = RunReport {
            run_name: run_name.to_string(),
            task_count: tasks.len(),
            failed_task_count: tasks.iter().filter(|t| t.task.is_failed()).count(),
            task_scores: tasks.iter().map(|t| t.score.clone()).collect(),
            worst: worst_offenders(tasks, config),
            process_worst,
            process_summaries: summarize_processes(tasks),
            process_scores: process_scores(tasks, config),
            tag_summaries: summarize_tags(tasks),
            run_score: run_score(run_name, tasks, config),
            problems: detect_problems(run_name, tasks, config),
            duration_outliers,
        };

        debug!(
            "Run {}: {} tasks, {} processes, {} problems, score {:?}",
            run_name,
            report.task_count,
            report.process_summaries.len(),
            report.problems.len(),
            report.run_score.weighted_score
        );
        report
    }
}

/// Validates `config` and analyzes every run found in `traces`.
pub fn analyze(traces: &[TaskTrace], config: &AnalysisConfig) -> AnalysisResult<AnalysisReport> {
    Ok(TraceAnalyzer::new(config.clone())?.analyze(traces))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{AnalysisError, ConfigurationError};
    use crate::types::TaskStatus;

    fn trace(run: &str, id: u64, process: &str) -> TaskTrace {
        TaskTrace::builder()
            .run_name(run)
            .task_id(id)
            .process(process)
            .status(TaskStatus::Completed)
            .cpus_requested(2)
            .cpu_percentage_used(150.0)
            .duration_ms(60_000)
            .realtime_ms(60_000)
            .build()
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = AnalysisConfig {
            cpu_weight: -1.0,
            ..Default::default()
        };
        let err = analyze(&[], &config).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::InvalidConfiguration(ConfigurationError::InvalidWeight { .. })
        ));
    }

    #[test]
    fn test_runs_are_reported_separately() {
        let traces = vec![trace("b", 1, "P"), trace("a", 1, "P"), trace("b", 2, "Q")];
        let report = analyze(&traces, &AnalysisConfig::default()).unwrap();
        assert_eq!(report.runs.len(), 2);
        assert_eq!(report.run("a").unwrap().task_count, 1);
        assert_eq!(report.run("b").unwrap().process_summaries.len(), 2);
    }

    #[test]
    fn test_run_filter() {
        let analyzer = TraceAnalyzer::new(AnalysisConfig::default()).unwrap();
        let traces = vec![trace("a", 1, "P"), trace("b", 1, "P")];
        let report = analyzer.analyze_filtered(&traces, Some("b"));
        assert_eq!(report.runs.len(), 1);
        assert_eq!(report.runs[0].run_name, "b");
    }

    #[test]
    fn test_outliers_only_when_enabled() {
        let mut traces: Vec<TaskTrace> = (1..=3).map(|id| trace("r", id, "P")).collect();
        let mut slow = trace("r", 4, "P");
        slow.duration_ms = Some(6_000_000);
        traces.push(slow);

        let analyzer = TraceAnalyzer::new(AnalysisConfig::default()).unwrap();
        assert!(analyzer.analyze_run("r", &traces).duration_outliers.is_empty());

        let analyzer = TraceAnalyzer::new(AnalysisConfig {
            detect_duration_outliers: true,
            ..Default::default()
        })
        .unwrap();
        let outliers = analyzer.analyze_run("r", &traces).duration_outliers;
        assert_eq!(outliers.len(), 1);
        assert_eq!(outliers[0].task_id, 4);
    }
}
