//! Lendstats HTTP client implementation.

use reqwest::Client;
use std::time::Duration;

use lendstats_core::{
    Acknowledgement, BookId, HotBooks, Overview, RecentDays, ServiceStatus, TodayStats, UserId,
};

use crate::error::ClientError;
use crate::types::{ApiErrorResponse, LendingRequest, LoginRequest};

/// Lendstats API client.
///
/// Provides methods for reporting lending events and reading statistics.
#[derive(Debug, Clone)]
pub struct LendstatsClient {
    client: Client,
    base_url: String,
}

impl LendstatsClient {
    /// Create a new lendstats client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the lendstats service (e.g., `"http://lendstats:3001"`)
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Configuration` if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_options(base_url, ClientOptions::default())
    }

    /// Create a new lendstats client with custom options.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Configuration` if the HTTP client cannot be built.
    pub fn with_options(
        base_url: impl Into<String>,
        options: ClientOptions,
    ) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_seconds))
            .build()
            .map_err(|e| ClientError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    // ========================================================================
    // Event collection
    // ========================================================================

    /// Report a borrow.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn record_borrow(
        &self,
        book_id: &BookId,
        user_id: &UserId,
    ) -> Result<Acknowledgement, ClientError> {
        self.post_lending("/api/collect/borrow", book_id, user_id)
            .await
    }

    /// Report a return.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn record_return(
        &self,
        book_id: &BookId,
        user_id: &UserId,
    ) -> Result<Acknowledgement, ClientError> {
        self.post_lending("/api/collect/return", book_id, user_id)
            .await
    }

    /// Report a login.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn record_login(
        &self,
        user_id: &UserId,
        username: Option<&str>,
    ) -> Result<Acknowledgement, ClientError> {
        let url = format!("{}/api/collect/login", self.base_url);
        let request = LoginRequest {
            user_id: user_id.to_string(),
            username: username.map(str::to_string),
        };

        let response = self.client.post(&url).json(&request).send().await?;

        self.handle_response(response).await
    }

    async fn post_lending(
        &self,
        path: &str,
        book_id: &BookId,
        user_id: &UserId,
    ) -> Result<Acknowledgement, ClientError> {
        let url = format!("{}{path}", self.base_url);
        let request = LendingRequest {
            book_id: book_id.to_string(),
            user_id: user_id.to_string(),
        };

        tracing::debug!(url = %url, book_id = %book_id, user_id = %user_id, "Sending lending event");
        let response = self.client.post(&url).json(&request).send().await?;

        self.handle_response(response).await
    }

    // ========================================================================
    // Statistics
    // ========================================================================

    /// Today's counters.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn today_stats(&self) -> Result<TodayStats, ClientError> {
        self.get("/api/stats/today", &[]).await
    }

    /// Most borrowed books; the server default applies when `limit` is `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn hot_books(&self, limit: Option<usize>) -> Result<HotBooks, ClientError> {
        let query: Vec<(&str, String)> = limit
            .map(|l| vec![("limit", l.to_string())])
            .unwrap_or_default();
        self.get("/api/stats/hot-books", &query).await
    }

    /// All-time overview.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn overview(&self) -> Result<Overview, ClientError> {
        self.get("/api/stats/overview", &[]).await
    }

    /// Per-day rollup; the server default applies when `days` is `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn recent_days(&self, days: Option<u32>) -> Result<RecentDays, ClientError> {
        let query: Vec<(&str, String)> = days
            .map(|d| vec![("days", d.to_string())])
            .unwrap_or_default();
        self.get("/api/stats/recent-days", &query).await
    }

    // ========================================================================
    // Operations
    // ========================================================================

    /// Service and store status.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn status(&self) -> Result<ServiceStatus, ClientError> {
        self.get("/api/status", &[]).await
    }

    /// Trigger the retention sweep.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn cleanup(&self) -> Result<Acknowledgement, ClientError> {
        let url = format!("{}/api/admin/cleanup", self.base_url);

        let response = self.client.post(&url).send().await?;

        self.handle_response(response).await
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        let url = format!("{}{path}", self.base_url);

        let response = self.client.get(&url).query(query).send().await?;

        self.handle_response(response).await
    }

    /// Handle API response and convert errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();

        if status.is_success() {
            let body = response.bytes().await?;
            return Ok(serde_json::from_slice(&body)?);
        }

        // Try to parse error response
        let error_body: Result<ApiErrorResponse, _> = response.json().await;

        match error_body {
            Ok(api_error) => match api_error.error.code.as_str() {
                "missing_parameter" => Err(ClientError::MissingParameter(api_error.error.message)),
                code => Err(ClientError::Api {
                    code: code.to_string(),
                    message: api_error.error.message,
                    status: status.as_u16(),
                }),
            },
            Err(_) => Err(ClientError::Api {
                code: "unknown".to_string(),
                message: format!("HTTP {status}"),
                status: status.as_u16(),
            }),
        }
    }
}

/// Client options for customization.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Request timeout in seconds (default: 30).
    pub timeout_seconds: u64,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_creation() {
        let client = LendstatsClient::new("http://localhost:3001").unwrap();
        assert_eq!(client.base_url, "http://localhost:3001");
    }

    #[test]
    fn client_trims_trailing_slash() {
        let client = LendstatsClient::new("http://localhost:3001/").unwrap();
        assert_eq!(client.base_url, "http://localhost:3001");
    }

    #[test]
    fn client_options() {
        let options = ClientOptions { timeout_seconds: 5 };
        assert!(LendstatsClient::with_options("http://localhost:3001", options).is_ok());
    }
}
