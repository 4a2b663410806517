//! Service configuration.

use lendstats_core::{
    AnalyticsError, RetentionWindow, DEFAULT_RETENTION_MAX_AGE_DAYS,
    DEFAULT_RETENTION_MIN_AGE_DAYS,
};

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address to listen on (default: "0.0.0.0:3001").
    pub listen_addr: String,

    /// Redis connection URL. Without it the in-memory store is used.
    pub redis_url: Option<String>,

    /// CORS allowed origins.
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    pub request_timeout_seconds: u64,

    /// Youngest date age (in days) removed by the retention sweep.
    pub retention_min_age_days: u32,

    /// Oldest date age (in days) removed by the retention sweep.
    pub retention_max_age_days: u32,

    /// UTC hour of the daily retention sweep.
    pub sweep_hour_utc: u32,

    /// Whether background jobs run in this process.
    pub scheduler_enabled: bool,
}

impl ServiceConfig {
    /// Load configuration from environment variables.
    ///
    /// Unparseable values fall back to their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            listen_addr: std::env::var("LISTEN_ADDR").unwrap_or(defaults.listen_addr),
            redis_url: std::env::var("REDIS_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            cors_origins: std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "*".into())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            max_body_bytes: env_parse("MAX_BODY_BYTES").unwrap_or(defaults.max_body_bytes),
            request_timeout_seconds: env_parse("REQUEST_TIMEOUT_SECONDS")
                .unwrap_or(defaults.request_timeout_seconds),
            retention_min_age_days: env_parse("RETENTION_MIN_AGE_DAYS")
                .unwrap_or(defaults.retention_min_age_days),
            retention_max_age_days: env_parse("RETENTION_MAX_AGE_DAYS")
                .unwrap_or(defaults.retention_max_age_days),
            sweep_hour_utc: env_parse("SWEEP_HOUR_UTC").unwrap_or(defaults.sweep_hour_utc),
            scheduler_enabled: std::env::var("SCHEDULER_ENABLED")
                .map(|v| !matches!(v.trim(), "0" | "false" | "no" | "off"))
                .unwrap_or(defaults.scheduler_enabled),
        }
    }

    /// The retention window described by the two age bounds.
    ///
    /// # Errors
    ///
    /// Returns `AnalyticsError::Configuration` if the bounds are invalid.
    pub fn retention_window(&self) -> Result<RetentionWindow, AnalyticsError> {
        RetentionWindow::new(self.retention_min_age_days, self.retention_max_age_days)
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|s| s.trim().parse().ok())
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:3001".into(),
            redis_url: None,
            cors_origins: vec!["*".into()],
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 30,
            retention_min_age_days: DEFAULT_RETENTION_MIN_AGE_DAYS,
            retention_max_age_days: DEFAULT_RETENTION_MAX_AGE_DAYS,
            sweep_hour_utc: 2,
            scheduler_enabled: true,
        }
    }
}
