//! Aggregation and scoring of workflow execution traces.
//!
//! Raw task traces flow through one pipeline: [`normalize`] → [`scoring`] → [`grouping`] →
//! [`aggregation`] → [`detector`], orchestrated by [`TraceAnalyzer`].

pub mod aggregation;
pub mod analyzer;
pub mod config;
pub mod constants;
pub mod detector;
pub mod errors;
pub mod grouping;
pub mod ingest;
pub mod normalize;
pub mod outliers;
pub mod scoring;
pub mod types;

pub use analyzer::{analyze, TraceAnalyzer};
pub use config::{AllocationInterval, AnalysisConfig, ConfigLoader};
pub use errors::{AnalysisError, AnalysisResult, ConfigurationError};
