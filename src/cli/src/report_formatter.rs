use anyhow::Result;
use colored::{Color, Colorize};
use std::fmt::Write;
use tracer_analysis::types::{BandViolation, Problem, RankedTask, RunReport};

const LABEL_WIDTH: usize = 20;

/// Renders run reports as boxed, colored terminal output.
pub struct ReportFormatter {
    output: String,
    width: usize,
}

fn score_color(score: f64) -> Color {
    if score >= 0.8 {
        Color::Green
    } else if score >= 0.5 {
        Color::Yellow
    } else {
        Color::Red
    }
}

fn format_score(score: Option<f64>) -> (String, Color) {
    match score {
        Some(score) => (format!("{:.3}", score), score_color(score)),
        None => ("n/a".to_string(), Color::White),
    }
}

fn format_duration(ms: f64) -> String {
    let seconds = ms / 1_000.0;
    if seconds >= 3_600.0 {
        format!("{:.1}h", seconds / 3_600.0)
    } else if seconds >= 60.0 {
        format!("{:.1}m", seconds / 60.0)
    } else {
        format!("{:.1}s", seconds)
    }
}

fn truncate(value: &str, max_chars: usize) -> String {
    if value.chars().count() > max_chars {
        let kept: String = value.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        value.to_string()
    }
}

impl ReportFormatter {
    pub fn new(width: usize) -> Self {
        Self {
            output: String::new(),
            width,
        }
    }

    pub fn add_header(&mut self, title: &str) -> Result<()> {
        writeln!(
            &mut self.output,
            "\n┌{:─^width$}┐",
            format!(" {} ", title),
            width = self.width.saturating_sub(2)
        )?;
        Ok(())
    }

    pub fn add_footer(&mut self) -> Result<()> {
        writeln!(
            &mut self.output,
            "└{:─^width$}┘",
            "",
            width = self.width.saturating_sub(2)
        )?;
        Ok(())
    }

    pub fn add_section_header(&mut self, title: &str) -> Result<()> {
        writeln!(
            &mut self.output,
            "├{:─^width$}┤",
            format!(" {} ", title),
            width = self.width.saturating_sub(2)
        )?;
        Ok(())
    }

    pub fn add_field(&mut self, label: &str, value: &str, color: Color) -> Result<()> {
        let max_value_width = self.width.saturating_sub(LABEL_WIDTH + 4);
        let value = truncate(value, max_value_width);

        writeln!(
            &mut self.output,
            "│ {:<label_width$} │ {}  ",
            truncate(label, LABEL_WIDTH),
            value.color(color),
            label_width = LABEL_WIDTH
        )?;
        Ok(())
    }

    pub fn get_output(&self) -> &str {
        &self.output
    }

    fn add_problem(&mut self, problem: &Problem) -> Result<()> {
        let side = match problem.violation {
            BandViolation::AboveBand => "over",
            BandViolation::BelowBand => "under",
        };
        let color = match problem.violation {
            BandViolation::AboveBand => Color::Red,
            BandViolation::BelowBand => Color::Yellow,
        };
        let value = format!(
            "{} {} {:.0}%: {}",
            problem.resource, side, problem.allocation_percentage, problem.recommendation
        );
        self.add_field(&problem.process, &value, color)
    }

    fn add_ranking(&mut self, label: &str, ranked: &[RankedTask], as_duration: bool) -> Result<()> {
        if ranked.is_empty() {
            return Ok(());
        }
        let value = ranked
            .iter()
            .map(|r| {
                let value = if as_duration {
                    format_duration(r.value)
                } else {
                    format!("{:.2}", r.value)
                };
                format!("#{} {} ({})", r.task_id, r.process, value)
            })
            .collect::<Vec<_>>()
            .join(", ");
        self.add_field(label, &value, Color::Cyan)
    }

    pub fn add_run(&mut self, run: &RunReport) -> Result<()> {
        self.add_header(&format!("Run: {}", run.run_name))?;

        self.add_field(
            "Tasks",
            &format!("{} ({} failed)", run.task_count, run.failed_task_count),
            Color::White,
        )?;
        let (score, color) = format_score(run.run_score.weighted_score);
        self.add_field("Weighted score", &score, color)?;
        let (score, color) = format_score(run.run_score.mean_pure_score);
        self.add_field("Mean task score", &score, color)?;

        if !run.process_scores.is_empty() {
            self.add_section_header("Processes")?;
            for process in &run.process_scores {
                let (score, color) = format_score(process.weighted_score);
                self.add_field(
                    &process.process,
                    &format!("{} ({} tasks)", score, process.task_count),
                    color,
                )?;
            }
        }

        self.add_section_header("Problems")?;
        if run.problems.is_empty() {
            self.add_field("None", "all processes within target bands", Color::Green)?;
        }
        for problem in &run.problems {
            self.add_problem(problem)?;
        }

        self.add_section_header("Worst offenders")?;
        self.add_ranking("Duration", &run.worst.by_duration, true)?;
        self.add_ranking("CPU penalty", &run.worst.by_cpu_penalty, false)?;
        self.add_ranking("Memory penalty", &run.worst.by_memory_penalty, false)?;

        if !run.duration_outliers.is_empty() {
            self.add_section_header("Duration outliers")?;
            for outlier in &run.duration_outliers {
                self.add_field(
                    &format!("#{}", outlier.task_id),
                    &format!(
                        "{} {} ({:.1}x process mean)",
                        outlier.process,
                        format_duration(outlier.duration_ms as f64),
                        outlier.ratio_to_process_mean
                    ),
                    Color::Magenta,
                )?;
            }
        }

        self.add_footer()
    }
}
