use axum::extract::{Path, State};
use axum::Json;
use bson::{doc, DateTime};
use serde_json::{json, Value};

use crate::api::format::{document_from_json, document_to_api_value};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::migration::category::{LIFE_PATH_TYPE, ZODIAC_TYPE};
use crate::migration::{project, reconcile, Category, Outcome};
use crate::server::AppState;

/// PUT /api/life-paths/:code
pub async fn life_path_put(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult<Value> {
    upsert(&state, Category::LifePath, LIFE_PATH_TYPE, &code, body).await
}

/// DELETE /api/life-paths/:code
pub async fn life_path_delete(State(state): State<AppState>, Path(code): Path<String>) -> ApiResult<Value> {
    remove(&state, Category::LifePath, "Life path", &code).await
}

/// PUT /api/zodiacs/:code
pub async fn zodiac_put(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult<Value> {
    upsert(&state, Category::Zodiac, ZODIAC_TYPE, &code, body).await
}

/// DELETE /api/zodiacs/:code
pub async fn zodiac_delete(State(state): State<AppState>, Path(code): Path<String>) -> ApiResult<Value> {
    remove(&state, Category::Zodiac, "Zodiac", &code).await
}

/// The body goes through the same projection as a legacy record, so
/// partial bodies get the usual defaults. The path code wins over any
/// `code` in the body. Timestamps are server-managed.
async fn upsert(state: &AppState, category: Category, type_name: &str, code: &str, body: Value) -> ApiResult<Value> {
    let mut source = document_from_json(body)?;
    for stamp in ["createdAt", "updatedAt"] {
        source.remove(stamp);
    }
    source.insert("type", type_name);
    source.insert("code", code);

    let now = DateTime::now();
    let record = project(&source, &category, now)?;
    let outcome = reconcile(state.store.as_ref(), &record, now).await?;

    if outcome == Outcome::AlreadyExists {
        return Err(ApiError::conflict(format!("{} was written concurrently, retry", record.key)));
    }

    let stored = state
        .store
        .find_one(record.collection, record.key.filter())
        .await?
        .ok_or_else(|| ApiError::internal_server_error("Entry vanished after write"))?;

    let data = json!({
        "outcome": outcome,
        "entry": document_to_api_value(stored)
    });

    Ok(match outcome {
        Outcome::Inserted => ApiResponse::created(data),
        _ => ApiResponse::success(data),
    })
}

async fn remove(state: &AppState, category: Category, label: &str, code: &str) -> ApiResult<Value> {
    let collection = category
        .collection()
        .ok_or_else(|| ApiError::internal_server_error("Category has no collection"))?;

    if state.store.delete_one(collection, doc! { "code": code }).await? {
        tracing::info!("Deleted {} '{}'", label, code);
        Ok(ApiResponse::success(json!({ "deleted": code })))
    } else {
        Err(ApiError::not_found(format!("{} '{}' not found", label, code)))
    }
}
