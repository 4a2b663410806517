//! Service status handler.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use sysinfo::System;

use lendstats_core::{MemoryUsage, ServiceStatus};

use crate::state::AppState;

/// Service, store and process status.
///
/// Always answers; an unreachable store is reported as `disconnected`.
pub async fn status(State(state): State<Arc<AppState>>) -> Json<ServiceStatus> {
    let store_status = match state.store.ping().await {
        Ok(()) => "connected",
        Err(e) => {
            tracing::warn!(error = %e, "Store ping failed");
            "disconnected"
        }
    };

    let now = state.clock.now();
    Json(ServiceStatus {
        service: crate::SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "running".to_string(),
        store_status: store_status.to_string(),
        uptime: state.queries.uptime_seconds(now),
        memory: memory_usage().await,
        timestamp: now,
    })
}

/// Process memory; empty where the platform does not expose it.
///
/// The process table is read on the blocking pool.
async fn memory_usage() -> MemoryUsage {
    match tokio::task::spawn_blocking(process_memory).await {
        Ok(usage) => usage,
        Err(e) => {
            tracing::warn!(error = %e, "Memory sampling task failed");
            MemoryUsage::default()
        }
    }
}

fn process_memory() -> MemoryUsage {
    let Ok(pid) = sysinfo::get_current_pid() else {
        return MemoryUsage::default();
    };

    let mut system = System::new();
    if !system.refresh_process(pid) {
        return MemoryUsage::default();
    }

    system
        .process(pid)
        .map(|process| MemoryUsage {
            resident_bytes: Some(process.memory()),
            virtual_bytes: Some(process.virtual_memory()),
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn samples_this_process() {
        let usage = memory_usage().await;
        if sysinfo::IS_SUPPORTED_SYSTEM {
            assert!(usage.resident_bytes.is_some_and(|bytes| bytes > 0));
            assert!(usage.virtual_bytes.is_some());
        } else {
            assert_eq!(usage, MemoryUsage::default());
        }
    }
}
