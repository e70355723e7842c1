use axum::{extract::State, Extension, Json};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::server::AppState;

/// POST /api/migration - run the legacy migration to completion
pub async fn migration_trigger(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, ApiError> {
    tracing::info!(
        subject = user.subject.as_deref().unwrap_or("<unverified>"),
        role = user.role.as_deref().unwrap_or("<unverified>"),
        verified = user.verified,
        "Migration triggered"
    );

    let stats = state.migrator.run().await?;

    let message = format!(
        "Migration completed: {} records processed, {} migrated, {} skipped",
        stats.total,
        stats.migrated(),
        stats.skipped
    );

    Ok(Json(json!({
        "success": true,
        "message": message,
        "stats": stats
    })))
}
