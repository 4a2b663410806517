//! Statistics integration tests.

mod common;

use axum::http::StatusCode;
use chrono::Duration;
use common::{unavailable_server, TestHarness};
use serde_json::json;

async fn borrow(harness: &TestHarness, book: &str, user: &str) {
    harness
        .server
        .post("/api/collect/borrow")
        .json(&json!({ "bookId": book, "userId": user }))
        .await
        .assert_status_ok();
}

async fn give_back(harness: &TestHarness, book: &str, user: &str) {
    harness
        .server
        .post("/api/collect/return")
        .json(&json!({ "bookId": book, "userId": user }))
        .await
        .assert_status_ok();
}

// ============================================================================
// Today
// ============================================================================

#[tokio::test]
async fn today_reflects_borrows_and_returns() {
    let harness = TestHarness::new();
    for _ in 0..3 {
        borrow(&harness, "B1", "u1").await;
    }
    give_back(&harness, "B1", "u1").await;

    let response = harness.server.get("/api/stats/today").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["date"], "2024-09-02");
    assert_eq!(body["borrows"], 3);
    assert_eq!(body["returns"], 1);
    assert_eq!(body["netBorrows"], 2);
    assert_eq!(body["onlineUsers"], 0);
    assert_eq!(body["dailyLoginUsers"], 0);
}

#[tokio::test]
async fn today_resets_at_midnight() {
    let harness = TestHarness::new();
    borrow(&harness, "B1", "u1").await;

    harness.clock.advance(Duration::days(1));

    let body: serde_json::Value = harness.server.get("/api/stats/today").await.json();
    assert_eq!(body["date"], "2024-09-03");
    assert_eq!(body["borrows"], 0);
}

#[tokio::test]
async fn today_store_failure_is_internal_error() {
    let server = unavailable_server();

    server
        .get("/api/stats/today")
        .await
        .assert_status(StatusCode::INTERNAL_SERVER_ERROR);
}

// ============================================================================
// Hot books
// ============================================================================

#[tokio::test]
async fn hot_books_empty() {
    let harness = TestHarness::new();

    let response = harness.server.get("/api/stats/hot-books").await;

    response.assert_status_ok();
    response.assert_json(&json!({ "total": 0, "books": [] }));
}

#[tokio::test]
async fn hot_books_ranked_and_limited() {
    let harness = TestHarness::new();
    for (book, times) in [("B1", 1), ("B2", 4), ("B3", 2)] {
        for _ in 0..times {
            borrow(&harness, book, "u1").await;
        }
    }

    let response = harness
        .server
        .get("/api/stats/hot-books")
        .add_query_param("limit", 2)
        .await;

    response.assert_status_ok();
    response.assert_json(&json!({
        "total": 2,
        "books": [
            { "bookId": "B2", "borrowCount": 4 },
            { "bookId": "B3", "borrowCount": 2 }
        ]
    }));
}

#[tokio::test]
async fn hot_books_invalid_limit_uses_default() {
    let harness = TestHarness::new();
    for i in 0..12 {
        borrow(&harness, &format!("B{i}"), "u1").await;
    }

    for limit in ["abc", "0", "-5"] {
        let body: serde_json::Value = harness
            .server
            .get("/api/stats/hot-books")
            .add_query_param("limit", limit)
            .await
            .json();
        assert_eq!(body["total"], 10, "limit={limit}");
    }
}

// ============================================================================
// Overview
// ============================================================================

#[tokio::test]
async fn overview_reports_totals() {
    let harness = TestHarness::new();
    borrow(&harness, "B1", "u1").await;
    borrow(&harness, "B2", "u2").await;
    give_back(&harness, "B1", "u1").await;
    harness
        .server
        .post("/api/collect/login")
        .json(&json!({ "userId": "u1" }))
        .await
        .assert_status_ok();
    harness.clock.advance(Duration::seconds(30));

    let body: serde_json::Value = harness.server.get("/api/stats/overview").await.json();

    assert_eq!(body["totalBorrows"], 2);
    assert_eq!(body["totalReturns"], 1);
    assert_eq!(body["currentOnlineUsers"], 1);
    assert_eq!(body["trackedBooks"], 2);
    assert_eq!(body["systemUptime"], 30.0);
    assert_eq!(body["lastUpdated"], "2024-09-02T10:00:30Z");
}

// ============================================================================
// Recent days
// ============================================================================

#[tokio::test]
async fn recent_days_zero_filled_oldest_first() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .get("/api/stats/recent-days")
        .add_query_param("days", 3)
        .await;

    response.assert_status_ok();
    response.assert_json(&json!({
        "period": "last 3 days",
        "data": [
            { "date": "2024-08-31", "borrows": 0, "returns": 0, "loginUsers": 0 },
            { "date": "2024-09-01", "borrows": 0, "returns": 0, "loginUsers": 0 },
            { "date": "2024-09-02", "borrows": 0, "returns": 0, "loginUsers": 0 }
        ]
    }));
}

#[tokio::test]
async fn recent_days_defaults_to_a_week() {
    let harness = TestHarness::new();
    borrow(&harness, "B1", "u1").await;

    let body: serde_json::Value = harness.server.get("/api/stats/recent-days").await.json();

    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 7);
    assert_eq!(data[6]["date"], "2024-09-02");
    assert_eq!(data[6]["borrows"], 1);
    assert_eq!(data[0]["date"], "2024-08-27");
}
