//! API handlers.

pub mod admin;
pub mod collect;
pub mod health;
pub mod stats;
pub mod status;
