use crate::config::{AllocationInterval, AnalysisConfig};
use crate::constants::{
    DEFAULT_CPU_ALLOCATION_INTERVAL, DEFAULT_CPU_FRACTIONAL_THRESHOLD, DEFAULT_CPU_WEIGHT,
    DEFAULT_DURATION_DEVIATION_MULTIPLIER, DEFAULT_DURATION_TO_CONSIDER_THRESHOLD_MS,
    DEFAULT_LIMIT_PER_DOMAIN, DEFAULT_MEMORY_REFERENCE_BYTES, DEFAULT_RAM_ALLOCATION_INTERVAL,
    DEFAULT_RAM_WEIGHT, DEFAULT_TOP_PERCENT_RATIO,
};

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            interval_valid_cpu_allocation_percentage: AllocationInterval::from(
                DEFAULT_CPU_ALLOCATION_INTERVAL,
            ),
            interval_valid_ram_allocation_percentage: AllocationInterval::from(
                DEFAULT_RAM_ALLOCATION_INTERVAL,
            ),
            cpu_weight: DEFAULT_CPU_WEIGHT,
            ram_weight: DEFAULT_RAM_WEIGHT,
            top_percent_ratio: DEFAULT_TOP_PERCENT_RATIO,
            limit_processes_per_domain_by_number: DEFAULT_LIMIT_PER_DOMAIN,
            duration_to_consider_threshold_ms: DEFAULT_DURATION_TO_CONSIDER_THRESHOLD_MS,

            cpu_fractional_threshold: DEFAULT_CPU_FRACTIONAL_THRESHOLD,
            memory_reference_bytes: DEFAULT_MEMORY_REFERENCE_BYTES,
            duration_deviation_multiplier: DEFAULT_DURATION_DEVIATION_MULTIPLIER,
            detect_duration_outliers: false,
        }
    }
}
