#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use bson::Document;
use serde_json::Value;
use tower::ServiceExt;

use thansohoc_api::server::{app, AppState, ServerOptions};
use thansohoc_api::store::{DocumentStore, DocumentStream, InMemoryStore, SharedStore, StoreError};

pub const LEGACY: &str = "numerology_data";
pub const TEST_SECRET: &str = "test-secret";

pub struct TestApp {
    pub store: Arc<InMemoryStore>,
    pub router: Router,
}

/// Router over a fresh in-memory store with destination unique keys
pub async fn test_app(options: ServerOptions) -> TestApp {
    let store = Arc::new(InMemoryStore::new().with_destination_keys().await);
    let router = app(AppState::new(store.clone(), LEGACY), options);
    TestApp { store, router }
}

/// Router over an arbitrary store
pub fn app_over(store: SharedStore, options: ServerOptions) -> Router {
    app(AppState::new(store, LEGACY), options)
}

/// Drive one request through the router and decode the JSON body
pub async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    authorization: Option<&str>,
    body: Option<Value>,
) -> Result<(StatusCode, Value)> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }

    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&json)?))?,
        None => builder.body(Body::empty())?,
    };

    let response = router.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, json))
}

/// Every operation fails as if the database were down
pub struct UnavailableStore;

fn down() -> StoreError {
    StoreError::Unavailable("server selection timed out".to_string())
}

#[async_trait]
impl DocumentStore for UnavailableStore {
    async fn find_all(&self, _collection: &str) -> Result<DocumentStream, StoreError> {
        Err(down())
    }

    async fn find_many(&self, _collection: &str, _filter: Document) -> Result<Vec<Document>, StoreError> {
        Err(down())
    }

    async fn find_one(&self, _collection: &str, _filter: Document) -> Result<Option<Document>, StoreError> {
        Err(down())
    }

    async fn insert_one(&self, _collection: &str, _document: Document) -> Result<(), StoreError> {
        Err(down())
    }

    async fn update_one(&self, _collection: &str, _filter: Document, _set: Document) -> Result<bool, StoreError> {
        Err(down())
    }

    async fn delete_one(&self, _collection: &str, _filter: Document) -> Result<bool, StoreError> {
        Err(down())
    }

    async fn count(&self, _collection: &str) -> Result<u64, StoreError> {
        Err(down())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Err(down())
    }
}

/// Lookups always miss, as if another writer inserted between the
/// reconciler's find and its insert
pub struct StaleLookupStore(pub Arc<InMemoryStore>);

#[async_trait]
impl DocumentStore for StaleLookupStore {
    async fn find_all(&self, collection: &str) -> Result<DocumentStream, StoreError> {
        self.0.find_all(collection).await
    }

    async fn find_many(&self, collection: &str, filter: Document) -> Result<Vec<Document>, StoreError> {
        self.0.find_many(collection, filter).await
    }

    async fn find_one(&self, _collection: &str, _filter: Document) -> Result<Option<Document>, StoreError> {
        Ok(None)
    }

    async fn insert_one(&self, collection: &str, document: Document) -> Result<(), StoreError> {
        self.0.insert_one(collection, document).await
    }

    async fn update_one(&self, collection: &str, filter: Document, set: Document) -> Result<bool, StoreError> {
        self.0.update_one(collection, filter, set).await
    }

    async fn delete_one(&self, collection: &str, filter: Document) -> Result<bool, StoreError> {
        self.0.delete_one(collection, filter).await
    }

    async fn count(&self, collection: &str) -> Result<u64, StoreError> {
        self.0.count(collection).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.0.ping().await
    }
}
