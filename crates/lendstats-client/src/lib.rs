//! Lendstats Client SDK.
//!
//! This crate provides a client library for library systems that report
//! lending events to the lendstats service and read its statistics back.
//!
//! # Example
//!
//! ```no_run
//! use lendstats_client::LendstatsClient;
//! use lendstats_core::{BookId, UserId};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = LendstatsClient::new("http://lendstats:3001")?;
//!
//! let book = BookId::new("978-0262033848")?;
//! let user = UserId::new("reader-17")?;
//! client.record_borrow(&book, &user).await?;
//!
//! let today = client.today_stats().await?;
//! println!("{} borrows today", today.borrows);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod client;
mod error;
mod types;

pub use client::{ClientOptions, LendstatsClient};
pub use error::ClientError;
pub use types::*;
