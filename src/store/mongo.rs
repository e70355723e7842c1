//! MongoDB-backed document store
//!
//! Destination collections get their natural-key unique indexes at startup;
//! those indexes are what reject a losing insert when two migration runs race.

use async_trait::async_trait;
use bson::{doc, Document};
use futures::{StreamExt, TryStreamExt};
use mongodb::{
    error::{Error as MongoError, ErrorKind, WriteFailure},
    options::IndexOptions,
    Client, Database, IndexModel,
};
use tracing::info;

use super::{DocumentStore, DocumentStream, StoreError};
use crate::migration::category::{PairKind, LIFE_PATH_COLLECTION, ZODIAC_COLLECTION};

const DUPLICATE_KEY_CODE: i32 = 11000;

/// MongoDB client wrapper bound to one database
#[derive(Clone)]
pub struct MongoStore {
    database: Database,
}

impl MongoStore {
    /// Connect and verify the connection with a ping
    pub async fn connect(uri: &str, db_name: &str, timeout_ms: u64) -> Result<Self, StoreError> {
        info!("Connecting to MongoDB at {}", redact_uri(uri));

        // Bound server selection so an unreachable server fails fast
        let separator = if uri.contains('?') { '&' } else { '?' };
        let timeout_uri = format!(
            "{}{}serverSelectionTimeoutMS={}&connectTimeoutMS={}",
            uri, separator, timeout_ms, timeout_ms
        );

        let client = Client::with_uri_str(&timeout_uri).await.map_err(map_error)?;
        let store = Self {
            database: client.database(db_name),
        };
        store.ping().await?;

        info!("Connected to MongoDB database '{}'", db_name);
        Ok(store)
    }

    /// Create the natural-key unique indexes on every destination collection
    pub async fn ensure_indexes(&self) -> Result<(), StoreError> {
        for collection in [LIFE_PATH_COLLECTION, ZODIAC_COLLECTION] {
            self.create_unique_index(collection, doc! { "code": 1 }, "code_unique")
                .await?;
        }

        for pair in PairKind::ALL {
            self.create_unique_index(
                pair.collection(),
                doc! { "factor1Type": 1, "factor1Code": 1, "factor2Type": 1, "factor2Code": 1 },
                "factor_pair_unique",
            )
            .await?;
        }

        Ok(())
    }

    async fn create_unique_index(&self, collection: &str, keys: Document, name: &str) -> Result<(), StoreError> {
        let index = IndexModel::builder()
            .keys(keys)
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name(name.to_string())
                    .build(),
            )
            .build();

        self.database
            .collection::<Document>(collection)
            .create_index(index)
            .await
            .map_err(map_error)?;

        info!("Ensured unique index {} on {}", name, collection);
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn find_all(&self, collection: &str) -> Result<DocumentStream, StoreError> {
        let cursor = self
            .database
            .collection::<Document>(collection)
            .find(doc! {})
            .await
            .map_err(map_error)?;

        Ok(cursor.map_err(map_error).boxed())
    }

    async fn find_many(&self, collection: &str, filter: Document) -> Result<Vec<Document>, StoreError> {
        let cursor = self
            .database
            .collection::<Document>(collection)
            .find(filter)
            .await
            .map_err(map_error)?;

        cursor.map_err(map_error).try_collect().await
    }

    async fn find_one(&self, collection: &str, filter: Document) -> Result<Option<Document>, StoreError> {
        self.database
            .collection::<Document>(collection)
            .find_one(filter)
            .await
            .map_err(map_error)
    }

    async fn insert_one(&self, collection: &str, document: Document) -> Result<(), StoreError> {
        self.database
            .collection::<Document>(collection)
            .insert_one(document)
            .await
            .map_err(map_error)?;
        Ok(())
    }

    async fn update_one(&self, collection: &str, filter: Document, set: Document) -> Result<bool, StoreError> {
        let result = self
            .database
            .collection::<Document>(collection)
            .update_one(filter, doc! { "$set": set })
            .await
            .map_err(map_error)?;
        Ok(result.matched_count > 0)
    }

    async fn delete_one(&self, collection: &str, filter: Document) -> Result<bool, StoreError> {
        let result = self
            .database
            .collection::<Document>(collection)
            .delete_one(filter)
            .await
            .map_err(map_error)?;
        Ok(result.deleted_count > 0)
    }

    async fn count(&self, collection: &str) -> Result<u64, StoreError> {
        self.database
            .collection::<Document>(collection)
            .count_documents(doc! {})
            .await
            .map_err(map_error)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(map_error)?;
        Ok(())
    }
}

/// Sort driver errors into the store taxonomy
fn map_error(err: MongoError) -> StoreError {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == DUPLICATE_KEY_CODE => {
            StoreError::DuplicateKey(write_error.message.clone())
        }
        ErrorKind::ServerSelection { .. } | ErrorKind::Io(_) | ErrorKind::ConnectionPoolCleared { .. } => {
            StoreError::Unavailable(err.to_string())
        }
        ErrorKind::BsonDeserialization(_) | ErrorKind::BsonSerialization(_) => StoreError::Encoding(err.to_string()),
        _ => StoreError::Operation(err.to_string()),
    }
}

/// Strip credentials from a connection string before it reaches the logs
pub fn redact_uri(uri: &str) -> String {
    match url::Url::parse(uri) {
        Ok(mut url) => {
            if !url.username().is_empty() {
                let _ = url.set_username("***");
            }
            if url.password().is_some() {
                let _ = url.set_password(Some("***"));
            }
            url.to_string()
        }
        Err(_) => "<unparseable uri>".to_string(),
    }
}
