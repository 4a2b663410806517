//! Lendstats Service - HTTP API for lending statistics
//!
//! This is the main entry point for the lendstats service.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lendstats_core::{Clock, SystemClock};
use lendstats_service::{create_router, AppState, ServiceConfig};
use lendstats_store::{AggregationStore, MemoryStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,lendstats=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Lendstats Service");

    // Load configuration from environment
    let config = ServiceConfig::from_env();

    tracing::info!(
        listen_addr = %config.listen_addr,
        redis_configured = %config.redis_url.is_some(),
        retention_min_age_days = config.retention_min_age_days,
        retention_max_age_days = config.retention_max_age_days,
        sweep_hour_utc = config.sweep_hour_utc,
        scheduler_enabled = config.scheduler_enabled,
        "Service configuration loaded"
    );

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let store = open_store(&config, clock.clone()).await?;

    // Build app state
    let state = AppState::new(store, clock, config.clone())?;

    // Background jobs
    let cancel = CancellationToken::new();
    let jobs = if config.scheduler_enabled {
        state.scheduler()?.spawn(&cancel)
    } else {
        tracing::info!("Scheduler disabled");
        Vec::new()
    };

    // Create the router
    let app = create_router(state);
    tracing::info!("Router configured with all API endpoints");

    // Start HTTP server
    tracing::info!(listen_addr = %config.listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel.clone()))
        .await?;

    cancel.cancel();
    for job in jobs {
        if let Err(e) = job.await {
            tracing::warn!(error = %e, "Scheduled job task did not stop cleanly");
        }
    }

    tracing::info!("Lendstats Service stopped");
    Ok(())
}

/// Open the configured store, falling back to memory when Redis is absent.
async fn open_store(
    config: &ServiceConfig,
    clock: Arc<dyn Clock>,
) -> Result<Arc<dyn AggregationStore>, Box<dyn std::error::Error>> {
    match &config.redis_url {
        #[cfg(feature = "redis-backend")]
        Some(url) => {
            tracing::info!("Connecting to Redis aggregation store");
            let store = lendstats_store::RedisStore::connect(url).await?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "redis-backend"))]
        Some(_) => {
            tracing::warn!("REDIS_URL is set but the redis-backend feature is disabled");
            Ok(Arc::new(MemoryStore::new(clock)))
        }
        None => {
            tracing::warn!("REDIS_URL not set - statistics are kept in memory and lost on restart");
            Ok(Arc::new(MemoryStore::new(clock)))
        }
    }
}

/// Resolve on Ctrl-C, cancelling background jobs.
async fn shutdown_signal(cancel: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
    cancel.cancel();
}
