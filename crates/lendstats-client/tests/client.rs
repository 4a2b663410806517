//! Client SDK tests against a mock lendstats server.

use lendstats_client::{ClientError, LendstatsClient};
use lendstats_core::{BookId, UserId};
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn ack() -> serde_json::Value {
    json!({
        "success": true,
        "message": "Borrow event recorded",
        "timestamp": "2024-09-02T10:00:00Z"
    })
}

#[tokio::test]
async fn record_borrow_posts_camel_case_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/collect/borrow"))
        .and(body_json(json!({ "bookId": "B1", "userId": "u1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(ack()))
        .expect(1)
        .mount(&server)
        .await;

    let client = LendstatsClient::new(server.uri()).unwrap();
    let response = client
        .record_borrow(&BookId::new("B1").unwrap(), &UserId::new("u1").unwrap())
        .await
        .unwrap();

    assert!(response.success);
}

#[tokio::test]
async fn record_login_omits_absent_username() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/collect/login"))
        .and(body_json(json!({ "userId": "u1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(ack()))
        .expect(1)
        .mount(&server)
        .await;

    let client = LendstatsClient::new(server.uri()).unwrap();
    client
        .record_login(&UserId::new("u1").unwrap(), None)
        .await
        .unwrap();
}

#[tokio::test]
async fn missing_parameter_maps_to_typed_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/collect/return"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "code": "missing_parameter", "message": "bookId is required" }
        })))
        .mount(&server)
        .await;

    let client = LendstatsClient::new(server.uri()).unwrap();
    let err = client
        .record_return(&BookId::new("B1").unwrap(), &UserId::new("u1").unwrap())
        .await
        .unwrap_err();

    match err {
        ClientError::MissingParameter(message) => assert_eq!(message, "bookId is required"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn server_error_maps_to_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/stats/today"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": { "code": "internal_error", "message": "An internal error occurred" }
        })))
        .mount(&server)
        .await;

    let client = LendstatsClient::new(server.uri()).unwrap();
    let err = client.today_stats().await.unwrap_err();

    match err {
        ClientError::Api { code, status, .. } => {
            assert_eq!(code, "internal_error");
            assert_eq!(status, 500);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn non_json_error_body_is_unknown() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let client = LendstatsClient::new(server.uri()).unwrap();
    let err = client.status().await.unwrap_err();

    assert!(matches!(err, ClientError::Api { ref code, status: 502, .. } if code == "unknown"));
}

#[tokio::test]
async fn hot_books_sends_limit_and_parses_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/stats/hot-books"))
        .and(query_param("limit", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 2,
            "books": [
                { "bookId": "B2", "borrowCount": 4 },
                { "bookId": "B3", "borrowCount": 2 }
            ]
        })))
        .mount(&server)
        .await;

    let client = LendstatsClient::new(server.uri()).unwrap();
    let hot = client.hot_books(Some(2)).await.unwrap();

    assert_eq!(hot.total, 2);
    assert_eq!(hot.books[0].book_id, "B2");
    assert_eq!(hot.books[0].borrow_count, 4);
}

#[tokio::test]
async fn recent_days_parses_dates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/stats/recent-days"))
        .and(query_param("days", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "period": "last 2 days",
            "data": [
                { "date": "2024-09-01", "borrows": 3, "returns": 1, "loginUsers": 2 },
                { "date": "2024-09-02", "borrows": 0, "returns": 0, "loginUsers": 0 }
            ]
        })))
        .mount(&server)
        .await;

    let client = LendstatsClient::new(server.uri()).unwrap();
    let recent = client.recent_days(Some(2)).await.unwrap();

    assert_eq!(recent.period, "last 2 days");
    assert_eq!(recent.data.len(), 2);
    assert_eq!(recent.data[0].borrows, 3);
    assert_eq!(recent.data[0].login_users, 2);
}

#[tokio::test]
async fn cleanup_returns_acknowledgement() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/admin/cleanup"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Cleanup completed, removed 6 expired keys",
            "timestamp": "2024-09-02T02:00:00Z"
        })))
        .mount(&server)
        .await;

    let client = LendstatsClient::new(server.uri()).unwrap();
    let ack = client.cleanup().await.unwrap();

    assert!(ack.message.contains('6'));
}

#[tokio::test]
async fn unexpected_success_body_is_serialization_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/stats/overview"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "totalBorrows": "many" })))
        .mount(&server)
        .await;

    let client = LendstatsClient::new(server.uri()).unwrap();
    let err = client.overview().await.unwrap_err();

    assert!(matches!(err, ClientError::Serialization(_)));
}
