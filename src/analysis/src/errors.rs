use thiserror::Error;

/// A threshold configuration that would produce misleading recommendations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("{name}: low bound ({low}) must not exceed high bound ({high})")]
    InvertedInterval {
        name: &'static str,
        low: f64,
        high: f64,
    },

    #[error("{name}: bounds must be finite and non-negative, got [{low}, {high}]")]
    InvalidIntervalBounds {
        name: &'static str,
        low: f64,
        high: f64,
    },

    #[error("{name} must be a finite, non-negative number, got {value}")]
    InvalidWeight { name: &'static str, value: f64 },

    #[error("cpu_weight and ram_weight cannot both be zero")]
    ZeroWeights,

    #[error("top_percent_ratio must lie in [0, 1], got {0}")]
    TopPercentRatioOutOfRange(f64),

    #[error("limit_processes_per_domain_by_number must be at least 1")]
    ZeroLimit,

    #[error("cpu_fractional_threshold must lie in [0, 1), got {0}")]
    FractionalThresholdOutOfRange(f64),

    #[error("duration_deviation_multiplier must be a positive number, got {0}")]
    InvalidDeviationMultiplier(f64),

    #[error("memory_reference_bytes must be greater than zero")]
    ZeroMemoryReference,
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The request was rejected before any computation took place.
    #[error("analysis request rejected: {0}")]
    InvalidConfiguration(#[from] ConfigurationError),
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;
