//! Application state.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use lendstats_core::{AnalyticsError, Clock, ONLINE_USERS_TTL_SECS};
use lendstats_store::AggregationStore;

use crate::config::ServiceConfig;
use crate::ingest::EventIngestor;
use crate::query::QueryService;
use crate::retention::{OnlineKeepAlive, RetentionSweep};
use crate::scheduler::{FiringPolicy, Scheduler};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The storage backend.
    pub store: Arc<dyn AggregationStore>,

    /// Time source for date partitions and uptime.
    pub clock: Arc<dyn Clock>,

    /// Service configuration.
    pub config: ServiceConfig,

    /// Write path.
    pub ingestor: EventIngestor,

    /// Read path.
    pub queries: QueryService,

    /// Retention sweep, shared by the scheduler and the admin endpoint.
    pub sweep: RetentionSweep,

    /// Online-set keep-alive.
    pub keep_alive: OnlineKeepAlive,

    /// When this process started serving.
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns `AnalyticsError::Configuration` if the retention window in
    /// `config` is invalid.
    pub fn new(
        store: Arc<dyn AggregationStore>,
        clock: Arc<dyn Clock>,
        config: ServiceConfig,
    ) -> Result<Self, AnalyticsError> {
        let window = config.retention_window()?;
        let started_at = clock.now();

        Ok(Self {
            ingestor: EventIngestor::new(store.clone(), clock.clone()),
            queries: QueryService::new(store.clone(), clock.clone(), started_at),
            sweep: RetentionSweep::new(store.clone(), clock.clone(), window),
            keep_alive: OnlineKeepAlive::new(store.clone(), ONLINE_USERS_TTL_SECS),
            store,
            clock,
            config,
            started_at,
        })
    }

    /// Build the background scheduler: the retention sweep daily at
    /// `sweep_hour_utc`:00 and the keep-alive at the top of every hour.
    ///
    /// # Errors
    ///
    /// Returns `AnalyticsError::Configuration` if `sweep_hour_utc` is not a
    /// valid hour.
    pub fn scheduler(&self) -> Result<Scheduler, AnalyticsError> {
        let sweep_policy = FiringPolicy::daily_at(self.config.sweep_hour_utc, 0)?;
        let keep_alive_policy = FiringPolicy::hourly_at(0)?;

        Ok(Scheduler::new(self.clock.clone())
            .with_job(Arc::new(self.sweep.clone()), sweep_policy)
            .with_job(Arc::new(self.keep_alive.clone()), keep_alive_policy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lendstats_core::SystemClock;
    use lendstats_store::MemoryStore;

    fn state(config: ServiceConfig) -> Result<AppState, AnalyticsError> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let store = Arc::new(MemoryStore::new(clock.clone()));
        AppState::new(store, clock, config)
    }

    #[test]
    fn default_scheduler_has_both_jobs() {
        let state = state(ServiceConfig::default()).unwrap();
        assert_eq!(state.scheduler().unwrap().len(), 2);
    }

    #[test]
    fn invalid_sweep_hour_is_rejected() {
        let state = state(ServiceConfig {
            sweep_hour_utc: 24,
            ..ServiceConfig::default()
        })
        .unwrap();
        assert!(state.scheduler().is_err());
    }

    #[test]
    fn invalid_window_is_rejected() {
        let result = state(ServiceConfig {
            retention_min_age_days: 0,
            ..ServiceConfig::default()
        });
        assert!(result.is_err());
    }
}
