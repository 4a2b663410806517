//! Lendstats HTTP API service.
//!
//! This crate turns lending events into aggregate statistics and serves them
//! over HTTP:
//!
//! - Event ingestion (borrow, return, login)
//! - Statistics queries (today, hot books, overview, recent days)
//! - Retention sweep and online keep-alive, run on a schedule
//!
//! # Consistency
//!
//! One event fans out into several independent store writes. There is no
//! transaction around them; if a later write fails the earlier ones stay
//! applied and the request fails with a 500. Counters and the ranking can
//! therefore drift apart after a store outage.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Health handler is async for the router

pub mod config;
pub mod error;
pub mod handlers;
pub mod ingest;
pub mod query;
pub mod retention;
pub mod routes;
pub mod scheduler;
pub mod state;

pub use config::ServiceConfig;
pub use error::ApiError;
pub use ingest::{EventIngestor, Recorded};
pub use query::QueryService;
pub use retention::{OnlineKeepAlive, RetentionSweep};
pub use routes::create_router;
pub use scheduler::{FiringPolicy, Job, JobReport, Scheduler};
pub use state::AppState;

/// Name reported by `/health` and `/api/status`.
pub const SERVICE_NAME: &str = "lendstats";
