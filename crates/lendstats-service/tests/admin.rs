//! Health, status and admin integration tests.

mod common;

use chrono::Duration;
use common::{unavailable_server, TestHarness};
use lendstats_core::Clock;
use lendstats_store::{keys, AggregationStore};

// ============================================================================
// Health / Status
// ============================================================================

#[tokio::test]
async fn health_check_returns_ok() {
    let harness = TestHarness::new();

    let response = harness.server.get("/health").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "lendstats");
}

#[tokio::test]
async fn status_reports_connected_store() {
    let harness = TestHarness::new();
    harness.clock.advance(Duration::seconds(5));

    let response = harness.server.get("/api/status").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["service"], "lendstats");
    assert_eq!(body["status"], "running");
    assert_eq!(body["storeStatus"], "connected");
    assert_eq!(body["uptime"], 5.0);
    assert!(body["memory"].is_object());
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn status_reports_disconnected_store() {
    let server = unavailable_server();

    let response = server.get("/api/status").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["storeStatus"], "disconnected");
}

// ============================================================================
// Cleanup
// ============================================================================

#[tokio::test]
async fn cleanup_removes_keys_in_window_only() {
    let harness = TestHarness::new();
    let today = harness.clock.today();
    let old = today - Duration::days(10);
    let recent = today - Duration::days(3);

    for date in [old, recent] {
        harness
            .store
            .increment(&keys::daily_borrows(date))
            .await
            .unwrap();
        harness
            .store
            .add_member(&keys::daily_login_users(date), "u1")
            .await
            .unwrap();
    }

    let response = harness.server.post("/api/admin/cleanup").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    assert!(body["message"].as_str().unwrap().contains('2'));

    assert_eq!(harness.store.get(&keys::daily_borrows(old)).await.unwrap(), None);
    assert_eq!(
        harness.store.get(&keys::daily_borrows(recent)).await.unwrap(),
        Some(1)
    );

    // Nothing left to remove.
    let body: serde_json::Value = harness.server.post("/api/admin/cleanup").await.json();
    assert!(body["message"].as_str().unwrap().contains(" 0 "));
}

#[tokio::test]
async fn cleanup_store_failure_is_internal_error() {
    let server = unavailable_server();

    server
        .post("/api/admin/cleanup")
        .await
        .assert_status(axum::http::StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn scheduled_sweep_shares_admin_window() {
    let harness = TestHarness::new();
    let window = harness.state.sweep.window();

    assert_eq!(window.min_age_days(), 8);
    assert_eq!(window.max_age_days(), 60);
}
