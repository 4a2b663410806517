//! Administrative handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use lendstats_core::Acknowledgement;

use crate::error::ApiError;
use crate::state::AppState;

/// Run the retention sweep now.
///
/// Uses the same window as the scheduled daily sweep.
pub async fn cleanup(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Acknowledgement>, ApiError> {
    let report = state.sweep.run_once().await?;

    tracing::info!(
        keys_removed = report.keys_removed,
        "Manual retention sweep completed"
    );

    Ok(Json(Acknowledgement::ok(
        format!(
            "Cleanup completed, removed {} expired keys",
            report.keys_removed
        ),
        state.clock.now(),
    )))
}
