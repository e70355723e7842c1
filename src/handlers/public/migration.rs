use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::server::AppState;

/// GET /api/migration - progress snapshot
///
/// Counts are read one collection at a time and are advisory while a run is
/// in flight.
pub async fn migration_status(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let status = state.migrator.status().await?;
    Ok(Json(json!({ "stats": status })))
}
