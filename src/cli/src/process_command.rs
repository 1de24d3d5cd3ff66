use crate::commands::{Cli, Command};
use crate::logging::setup_logging;
use crate::report_formatter::ReportFormatter;
use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::Colorize;
use std::path::Path;
use tracer_analysis::ingest::read_traces;
use tracer_analysis::{AnalysisConfig, ConfigLoader, TraceAnalyzer};

const REPORT_WIDTH: usize = 100;

pub fn process_cli() -> Result<()> {
    let cli = Cli::parse();
    let _guard = setup_logging(&cli.log_level, cli.log_file.as_deref())?;

    // Use the --config flag, if provided, when loading the configuration
    let config = ConfigLoader::load(cli.config.as_deref())?;

    match cli.command {
        Command::Analyze { input, run, json } => analyze(&input, run.as_deref(), json, config),
        Command::Config => print_config(&config),
    }
}

fn analyze(input: &Path, run: Option<&str>, json: bool, config: AnalysisConfig) -> Result<()> {
    let traces = read_traces(input)?;
    tracing::info!("Loaded {} tasks from {:?}", traces.len(), input);

    let analyzer = TraceAnalyzer::new(config)?;
    let report = analyzer.analyze_filtered(&traces, run);

    if let Some(run) = run {
        if report.is_empty() {
            bail!("No tasks found for run {:?}", run);
        }
    }

    if json {
        let output =
            serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        println!("{}", output);
        return Ok(());
    }

    if report.is_empty() {
        println!("{}", "No tasks found in trace file".yellow());
        return Ok(());
    }

    let mut formatter = ReportFormatter::new(REPORT_WIDTH);
    for run in &report.runs {
        formatter.add_run(run)?;
    }
    println!("{}", formatter.get_output());
    Ok(())
}

fn print_config(config: &AnalysisConfig) -> Result<()> {
    let output = serde_json::to_string_pretty(config).context("Failed to serialize config")?;
    println!("{}", output);
    Ok(())
}
