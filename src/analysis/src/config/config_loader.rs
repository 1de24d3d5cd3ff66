use std::path::Path;

use anyhow::{Context, Result};
use config::{Config as RConfig, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::{
    DEFAULT_CPU_ALLOCATION_INTERVAL, DEFAULT_CPU_FRACTIONAL_THRESHOLD, DEFAULT_CPU_WEIGHT,
    DEFAULT_DURATION_DEVIATION_MULTIPLIER, DEFAULT_DURATION_TO_CONSIDER_THRESHOLD_MS,
    DEFAULT_LIMIT_PER_DOMAIN, DEFAULT_MEMORY_REFERENCE_BYTES, DEFAULT_RAM_ALLOCATION_INTERVAL,
    DEFAULT_RAM_WEIGHT, DEFAULT_TOP_PERCENT_RATIO, ENV_LIST_SEPARATOR, ENV_PREFIX,
};
use crate::errors::ConfigurationError;

/// Target band for an allocation percentage, written as `[low, high]`.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct AllocationInterval {
    pub low: f64,
    pub high: f64,
}

impl AllocationInterval {
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.low <= value && value <= self.high
    }

    fn validate(&self, name: &'static str) -> Result<(), ConfigurationError> {
        let bounds_ok = [self.low, self.high]
            .iter()
            .all(|bound| bound.is_finite() && *bound >= 0.0);
        if !bounds_ok {
            return Err(ConfigurationError::InvalidIntervalBounds {
                name,
                low: self.low,
                high: self.high,
            });
        }
        if self.low > self.high {
            return Err(ConfigurationError::InvertedInterval {
                name,
                low: self.low,
                high: self.high,
            });
        }
        Ok(())
    }
}

impl From<(f64, f64)> for AllocationInterval {
    fn from((low, high): (f64, f64)) -> Self {
        Self { low, high }
    }
}

impl From<AllocationInterval> for (f64, f64) {
    fn from(interval: AllocationInterval) -> Self {
        (interval.low, interval.high)
    }
}

/// Thresholds for one analysis request. Always passed explicitly, never stored globally.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct AnalysisConfig {
    pub interval_valid_cpu_allocation_percentage: AllocationInterval,
    pub interval_valid_ram_allocation_percentage: AllocationInterval,
    pub cpu_weight: f64,
    pub ram_weight: f64,
    pub top_percent_ratio: f64,
    pub limit_processes_per_domain_by_number: usize,
    pub duration_to_consider_threshold_ms: u64,

    /// Remainder of used cores above which the cpu recommendation is bumped to the next integer.
    pub cpu_fractional_threshold: f64,
    /// Bytes of rss that count as one unit of absolute memory usage when weighting scores.
    pub memory_reference_bytes: u64,
    pub duration_deviation_multiplier: f64,
    pub detect_duration_outliers: bool,
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.interval_valid_cpu_allocation_percentage
            .validate("interval_valid_cpu_allocation_percentage")?;
        self.interval_valid_ram_allocation_percentage
            .validate("interval_valid_ram_allocation_percentage")?;

        for (name, value) in [("cpu_weight", self.cpu_weight), ("ram_weight", self.ram_weight)] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigurationError::InvalidWeight { name, value });
            }
        }
        if self.cpu_weight == 0.0 && self.ram_weight == 0.0 {
            return Err(ConfigurationError::ZeroWeights);
        }

        if !(0.0..=1.0).contains(&self.top_percent_ratio) {
            return Err(ConfigurationError::TopPercentRatioOutOfRange(
                self.top_percent_ratio,
            ));
        }
        if self.limit_processes_per_domain_by_number == 0 {
            return Err(ConfigurationError::ZeroLimit);
        }
        if !(0.0..1.0).contains(&self.cpu_fractional_threshold) {
            return Err(ConfigurationError::FractionalThresholdOutOfRange(
                self.cpu_fractional_threshold,
            ));
        }
        if !self.duration_deviation_multiplier.is_finite()
            || self.duration_deviation_multiplier <= 0.0
        {
            return Err(ConfigurationError::InvalidDeviationMultiplier(
                self.duration_deviation_multiplier,
            ));
        }
        if self.memory_reference_bytes == 0 {
            return Err(ConfigurationError::ZeroMemoryReference);
        }
        Ok(())
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn load_default_config() -> Result<AnalysisConfig> {
        Self::load(None)
    }

    /// Layers defaults, an optional TOML file and `TRACER_ANALYSIS_*` environment variables,
    /// then validates the result.
    pub fn load(path: Option<&Path>) -> Result<AnalysisConfig> {
        let mut builder = RConfig::builder();

        // set defaults
        builder = builder
            .set_default(
                "interval_valid_cpu_allocation_percentage",
                vec![
                    DEFAULT_CPU_ALLOCATION_INTERVAL.0,
                    DEFAULT_CPU_ALLOCATION_INTERVAL.1,
                ],
            )?
            .set_default(
                "interval_valid_ram_allocation_percentage",
                vec![
                    DEFAULT_RAM_ALLOCATION_INTERVAL.0,
                    DEFAULT_RAM_ALLOCATION_INTERVAL.1,
                ],
            )?
            .set_default("cpu_weight", DEFAULT_CPU_WEIGHT)?
            .set_default("ram_weight", DEFAULT_RAM_WEIGHT)?
            .set_default("top_percent_ratio", DEFAULT_TOP_PERCENT_RATIO)?
            .set_default(
                "limit_processes_per_domain_by_number",
                DEFAULT_LIMIT_PER_DOMAIN as u64,
            )?
            .set_default(
                "duration_to_consider_threshold_ms",
                DEFAULT_DURATION_TO_CONSIDER_THRESHOLD_MS,
            )?
            .set_default("cpu_fractional_threshold", DEFAULT_CPU_FRACTIONAL_THRESHOLD)?
            .set_default("memory_reference_bytes", DEFAULT_MEMORY_REFERENCE_BYTES)?
            .set_default(
                "duration_deviation_multiplier",
                DEFAULT_DURATION_DEVIATION_MULTIPLIER,
            )?
            .set_default("detect_duration_outliers", false)?;

        if let Some(path) = path {
            debug!("Loading analysis config from {:?}", path);
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .list_separator(ENV_LIST_SEPARATOR)
                .with_list_parse_key("interval_valid_cpu_allocation_percentage")
                .with_list_parse_key("interval_valid_ram_allocation_percentage"),
        );

        let config: AnalysisConfig = builder
            .build()?
            .try_deserialize()
            .context("failed to parse analysis config")?;

        config.validate().context("invalid analysis config")?;

        Ok(config)
    }
}
