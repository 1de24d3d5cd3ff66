pub const DEFAULT_CPU_ALLOCATION_INTERVAL: (f64, f64) = (60.0, 140.0);
pub const DEFAULT_RAM_ALLOCATION_INTERVAL: (f64, f64) = (60.0, 100.0);
pub const DEFAULT_CPU_WEIGHT: f64 = 0.5;
pub const DEFAULT_RAM_WEIGHT: f64 = 0.5;
pub const DEFAULT_TOP_PERCENT_RATIO: f64 = 0.1;
pub const DEFAULT_LIMIT_PER_DOMAIN: usize = 10;
pub const DEFAULT_DURATION_TO_CONSIDER_THRESHOLD_MS: u64 = 10_000;
pub const DEFAULT_CPU_FRACTIONAL_THRESHOLD: f64 = 0.2;
pub const DEFAULT_DURATION_DEVIATION_MULTIPLIER: f64 = 2.0;

pub const BYTES_PER_GIB: u64 = 1024 * 1024 * 1024;
pub const DEFAULT_MEMORY_REFERENCE_BYTES: u64 = BYTES_PER_GIB;

/// Decay rate applied to the penalty of over-utilized tasks.
pub const OVERSHOOT_DECAY_RATE: f64 = 4.0;
pub const IDEAL_ALLOCATION_PERCENTAGE: f64 = 100.0;

pub const MS_PER_MINUTE: f64 = 60_000.0;

pub const ENV_PREFIX: &str = "TRACER_ANALYSIS";
pub const ENV_LIST_SEPARATOR: &str = ",";
