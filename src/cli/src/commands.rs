use clap::{Parser, Subcommand};
use std::path::PathBuf;

fn about_message() -> String {
    format!(
        "Scores resource usage of pipeline runs and suggests right-sized requests\nVersion: {}",
        env!("CARGO_PKG_VERSION")
    )
}

#[derive(Parser, Clone)]
#[clap(
    name = "tracer-analyze",
    about = about_message(),
    version = env!("CARGO_PKG_VERSION"),
    after_help = "For more information, visit: https://tracer.cloud\n"
)]
pub struct Cli {
    /// TOML file overriding the default analysis thresholds
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set, e.g. `debug` or `tracer_analysis=trace`
    #[clap(long, global = true, default_value = "info")]
    pub log_level: String,

    /// Also write logs to this file
    #[clap(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Analyze a trace file (JSON array or newline-delimited web-log events)
    Analyze {
        /// Path to the trace file
        input: PathBuf,

        /// Only analyze this run
        #[clap(long)]
        run: Option<String>,

        /// Output the report in JSON format
        #[clap(long)]
        json: bool,
    },

    /// Shows the effective analysis configuration
    Config,
}
