//! Common test utilities for lendstats integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum_test::TestServer;
use chrono::{DateTime, TimeZone, Utc};

use lendstats_core::ManualClock;
use lendstats_service::{create_router, AppState, ServiceConfig};
use lendstats_store::{AggregationStore, MemoryStore, Result, StoreError};

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// The clock every component reads; advance it to cross days.
    pub clock: Arc<ManualClock>,
    /// The backing store, for assertions below the HTTP layer.
    pub store: Arc<MemoryStore>,
    /// A copy of the state behind the router.
    pub state: AppState,
}

impl TestHarness {
    /// Create a new test harness with an empty store at a fixed instant.
    pub fn new() -> Self {
        Self::at(Utc.with_ymd_and_hms(2024, 9, 2, 10, 0, 0).unwrap())
    }

    /// Create a new test harness whose clock starts at `now`.
    pub fn at(now: DateTime<Utc>) -> Self {
        let clock = Arc::new(ManualClock::new(now));
        let store = Arc::new(MemoryStore::new(clock.clone()));

        let state = AppState::new(store.clone(), clock.clone(), test_config())
            .expect("Failed to build app state");
        let router: Router = create_router(state.clone());
        let server = TestServer::new(router).expect("Failed to create test server");

        Self {
            server,
            clock,
            store,
            state,
        }
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration used by every harness.
pub fn test_config() -> ServiceConfig {
    ServiceConfig {
        listen_addr: "127.0.0.1:0".into(),
        scheduler_enabled: false,
        ..ServiceConfig::default()
    }
}

/// A server whose store rejects every call.
pub fn unavailable_server() -> TestServer {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 9, 2, 10, 0, 0).unwrap(),
    ));
    let state = AppState::new(Arc::new(UnavailableStore), clock, test_config())
        .expect("Failed to build app state");
    TestServer::new(create_router(state)).expect("Failed to create test server")
}

/// Store stand-in for an unreachable backend.
pub struct UnavailableStore;

fn down<T>() -> Result<T> {
    Err(StoreError::Unavailable("connection refused".into()))
}

#[async_trait]
impl AggregationStore for UnavailableStore {
    async fn increment(&self, _key: &str) -> Result<i64> {
        down()
    }

    async fn increment_score(&self, _key: &str, _member: &str, _delta: f64) -> Result<f64> {
        down()
    }

    async fn add_member(&self, _key: &str, _member: &str) -> Result<bool> {
        down()
    }

    async fn set_expiry(&self, _key: &str, _seconds: u64) -> Result<bool> {
        down()
    }

    async fn set_expiry_if_absent(&self, _key: &str, _seconds: u64) -> Result<bool> {
        down()
    }

    async fn delete(&self, _key: &str) -> Result<u64> {
        down()
    }

    async fn get(&self, _key: &str) -> Result<Option<i64>> {
        down()
    }

    async fn score_of(&self, _key: &str, _member: &str) -> Result<Option<f64>> {
        down()
    }

    async fn cardinality(&self, _key: &str) -> Result<u64> {
        down()
    }

    async fn ranked_cardinality(&self, _key: &str) -> Result<u64> {
        down()
    }

    async fn range_by_score(&self, _key: &str, _limit: usize) -> Result<Vec<(String, f64)>> {
        down()
    }

    async fn members(&self, _key: &str) -> Result<Vec<String>> {
        down()
    }

    async fn ttl(&self, _key: &str) -> Result<Option<u64>> {
        down()
    }

    async fn ping(&self) -> Result<()> {
        down()
    }
}
