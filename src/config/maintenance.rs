use serde::{Deserialize, Serialize};

/// Maintenance cadences and the hot-option key set.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MaintenanceConfig {
    /// Minimum seconds between autoload optimization passes.
    /// TOML: `maintenance.daily_cadence_secs`. Default: `86400`.
    #[serde(default = "default_daily_cadence_secs")]
    pub daily_cadence_secs: i64,

    /// Period of the scheduled transient reap, in seconds.
    /// TOML: `maintenance.weekly_cadence_secs`. Default: `604800`.
    #[serde(default = "default_weekly_cadence_secs")]
    pub weekly_cadence_secs: i64,

    /// Option names warmed into the in-memory cache at process start.
    /// TOML: `maintenance.hot_option_keys`. Default: `["template", "stylesheet"]`.
    #[serde(default = "default_hot_option_keys")]
    pub hot_option_keys: Vec<String>,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            daily_cadence_secs: default_daily_cadence_secs(),
            weekly_cadence_secs: default_weekly_cadence_secs(),
            hot_option_keys: default_hot_option_keys(),
        }
    }
}

/// Query observation flags and threshold.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelemetryConfig {
    /// Whether per-request queries are recorded at all.
    /// TOML: `telemetry.record_queries`. Default: `false`.
    #[serde(default)]
    pub record_queries: bool,

    /// Whether debug logging (and therefore slow-query emission) is on.
    /// TOML: `telemetry.debug_log`. Default: `false`.
    #[serde(default)]
    pub debug_log: bool,

    /// Strict lower bound for a query to count as slow, in seconds.
    /// TOML: `telemetry.slow_query_threshold_secs`. Default: `0.1`.
    #[serde(default = "default_slow_query_threshold_secs")]
    pub slow_query_threshold_secs: f64,
}

impl TelemetryConfig {
    /// Slow-query reports are emitted only when both flags are set.
    pub fn slow_query_logging_enabled(&self) -> bool {
        self.record_queries && self.debug_log
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            record_queries: false,
            debug_log: false,
            slow_query_threshold_secs: default_slow_query_threshold_secs(),
        }
    }
}

fn default_daily_cadence_secs() -> i64 {
    86_400
}

fn default_weekly_cadence_secs() -> i64 {
    604_800
}

fn default_hot_option_keys() -> Vec<String> {
    vec!["template".to_string(), "stylesheet".to_string()]
}

fn default_slow_query_threshold_secs() -> f64 {
    0.1
}
