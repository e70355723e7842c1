use axum::extract::{Path, Query, State};
use bson::{doc, Document};
use serde::Deserialize;
use serde_json::Value;

use crate::api::format::{document_to_api_value, documents_to_api_values};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::migration::category::{LIFE_PATH_COLLECTION, ZODIAC_COLLECTION};
use crate::migration::legacy::scalar_code;
use crate::migration::PairKind;
use crate::server::AppState;

/// GET /api/life-paths
pub async fn life_paths_list(State(state): State<AppState>) -> ApiResult<Vec<Value>> {
    list(&state, LIFE_PATH_COLLECTION).await
}

/// GET /api/life-paths/:code
pub async fn life_path_get(State(state): State<AppState>, Path(code): Path<String>) -> ApiResult<Value> {
    show(&state, LIFE_PATH_COLLECTION, "Life path", &code).await
}

/// GET /api/zodiacs
pub async fn zodiacs_list(State(state): State<AppState>) -> ApiResult<Vec<Value>> {
    list(&state, ZODIAC_COLLECTION).await
}

/// GET /api/zodiacs/:code
pub async fn zodiac_get(State(state): State<AppState>, Path(code): Path<String>) -> ApiResult<Value> {
    show(&state, ZODIAC_COLLECTION, "Zodiac", &code).await
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairQuery {
    pub factor1_code: Option<String>,
    pub factor2_code: Option<String>,
}

impl PairQuery {
    fn matches(&self, entry: &Document) -> bool {
        code_matches(entry, "factor1Code", self.factor1_code.as_deref())
            && code_matches(entry, "factor2Code", self.factor2_code.as_deref())
    }
}

// Factor codes are stored verbatim and may be integers
fn code_matches(entry: &Document, field: &str, wanted: Option<&str>) -> bool {
    match wanted {
        None => true,
        Some(wanted) => entry.get(field).and_then(scalar_code).as_deref() == Some(wanted.trim()),
    }
}

/// GET /api/compatibility/:pair?factor1Code=&factor2Code=
pub async fn compatibility_list(
    State(state): State<AppState>,
    Path(pair): Path<String>,
    Query(query): Query<PairQuery>,
) -> ApiResult<Vec<Value>> {
    let kind = PairKind::from_slug(&pair).ok_or_else(|| {
        ApiError::bad_request(format!(
            "Unknown compatibility pair '{}', expected one of: {}",
            pair,
            PairKind::ALL.iter().map(|k| k.slug()).collect::<Vec<_>>().join(", ")
        ))
    })?;

    let entries: Vec<Document> = state
        .store
        .find_many(kind.collection(), Document::new())
        .await?
        .into_iter()
        .filter(|entry| query.matches(entry))
        .collect();

    Ok(ApiResponse::success(documents_to_api_values(entries)))
}

async fn list(state: &AppState, collection: &str) -> ApiResult<Vec<Value>> {
    let entries = state.store.find_many(collection, Document::new()).await?;
    Ok(ApiResponse::success(documents_to_api_values(entries)))
}

async fn show(state: &AppState, collection: &str, label: &str, code: &str) -> ApiResult<Value> {
    match state.store.find_one(collection, doc! { "code": code }).await? {
        Some(entry) => Ok(ApiResponse::success(document_to_api_value(entry))),
        None => Err(ApiError::not_found(format!("{} '{}' not found", label, code))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_query_matches_text_and_integer_codes() {
        let query = PairQuery {
            factor1_code: Some("3".into()),
            factor2_code: None,
        };
        assert!(query.matches(&doc! { "factor1Code": "3", "factor2Code": "Leo" }));
        assert!(query.matches(&doc! { "factor1Code": 3_i32, "factor2Code": "Leo" }));
        assert!(!query.matches(&doc! { "factor1Code": "4" }));
        assert!(PairQuery::default().matches(&doc! {}));
    }
}
