//! Document store abstraction over named collections of BSON documents.
//!
//! The migration pipeline and the content handlers only ever talk to
//! [`DocumentStore`]; [`MongoStore`] backs the running service and
//! [`InMemoryStore`] backs dry runs and tests.

pub mod memory;
pub mod mongo;

use std::sync::Arc;

use async_trait::async_trait;
use bson::Document;
use futures::stream::BoxStream;
use thiserror::Error;

pub use memory::InMemoryStore;
pub use mongo::MongoStore;

/// Errors surfaced by a document store
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Connection, server selection or I/O failure. Nothing read or written
    /// after this can be trusted.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Unique index rejected a write
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    #[error("Store operation failed: {0}")]
    Operation(String),

    #[error("Document encoding failed: {0}")]
    Encoding(String),
}

/// Cursor over a collection
pub type DocumentStream = BoxStream<'static, Result<Document, StoreError>>;

/// Shared handle injected into handlers and the migrator
pub type SharedStore = Arc<dyn DocumentStore>;

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Stream every document of a collection
    async fn find_all(&self, collection: &str) -> Result<DocumentStream, StoreError>;

    /// All documents whose fields equal the filter's fields
    async fn find_many(&self, collection: &str, filter: Document) -> Result<Vec<Document>, StoreError>;

    async fn find_one(&self, collection: &str, filter: Document) -> Result<Option<Document>, StoreError>;

    async fn insert_one(&self, collection: &str, document: Document) -> Result<(), StoreError>;

    /// `$set` the given fields on the first match. Returns whether a document matched.
    async fn update_one(&self, collection: &str, filter: Document, set: Document) -> Result<bool, StoreError>;

    /// Returns whether a document was deleted
    async fn delete_one(&self, collection: &str, filter: Document) -> Result<bool, StoreError>;

    async fn count(&self, collection: &str) -> Result<u64, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}
