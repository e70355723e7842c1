//! In-memory document store used for dry runs and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use bson::{oid::ObjectId, Bson, Document};
use futures::StreamExt;
use tokio::sync::RwLock;

use super::{DocumentStore, DocumentStream, StoreError};

#[derive(Debug, Default)]
struct Collection {
    documents: Vec<Document>,
    /// Field sets whose combined values must be unique
    unique_keys: Vec<Vec<String>>,
}

impl Collection {
    fn violates_unique(&self, candidate: &Document, skip: Option<usize>) -> Option<String> {
        for key in &self.unique_keys {
            let clash = self.documents.iter().enumerate().any(|(idx, existing)| {
                Some(idx) != skip
                    && key
                        .iter()
                        .all(|field| candidate.get(field).is_some() && candidate.get(field) == existing.get(field))
            });
            if clash {
                return Some(key.join(","));
            }
        }
        None
    }
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enforce uniqueness of the combined `fields` on a collection
    pub async fn with_unique_key(self, collection: &str, fields: &[&str]) -> Self {
        {
            let mut collections = self.collections.write().await;
            collections
                .entry(collection.to_string())
                .or_default()
                .unique_keys
                .push(fields.iter().map(|f| f.to_string()).collect());
        }
        self
    }

    /// Unique keys mirroring the MongoDB destination indexes
    pub async fn with_destination_keys(self) -> Self {
        use crate::migration::category::{PairKind, LIFE_PATH_COLLECTION, ZODIAC_COLLECTION};

        let mut store = self
            .with_unique_key(LIFE_PATH_COLLECTION, &["code"])
            .await
            .with_unique_key(ZODIAC_COLLECTION, &["code"])
            .await;
        for pair in PairKind::ALL {
            store = store
                .with_unique_key(
                    pair.collection(),
                    &["factor1Type", "factor1Code", "factor2Type", "factor2Code"],
                )
                .await;
        }
        store
    }

    /// Bulk load documents as-is, bypassing unique keys
    pub async fn seed(&self, collection: &str, documents: impl IntoIterator<Item = Document>) {
        let mut collections = self.collections.write().await;
        let target = collections.entry(collection.to_string()).or_default();
        for mut document in documents {
            if !document.contains_key("_id") {
                document.insert("_id", ObjectId::new());
            }
            target.documents.push(document);
        }
    }

    /// Snapshot of a collection's documents
    pub async fn documents(&self, collection: &str) -> Vec<Document> {
        let collections = self.collections.read().await;
        collections
            .get(collection)
            .map(|c| c.documents.clone())
            .unwrap_or_default()
    }
}

fn matches(document: &Document, filter: &Document) -> bool {
    filter.iter().all(|(key, expected)| match document.get(key) {
        Some(actual) => actual == expected,
        None => matches!(expected, Bson::Null),
    })
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn find_all(&self, collection: &str) -> Result<DocumentStream, StoreError> {
        let documents = self.documents(collection).await;
        Ok(futures::stream::iter(documents.into_iter().map(Ok)).boxed())
    }

    async fn find_many(&self, collection: &str, filter: Document) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|c| {
                c.documents
                    .iter()
                    .filter(|d| matches(d, &filter))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn find_one(&self, collection: &str, filter: Document) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|c| c.documents.iter().find(|d| matches(d, &filter)).cloned()))
    }

    async fn insert_one(&self, collection: &str, mut document: Document) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        let target = collections.entry(collection.to_string()).or_default();

        if let Some(key) = target.violates_unique(&document, None) {
            return Err(StoreError::DuplicateKey(format!("{} already has {}", collection, key)));
        }
        if !document.contains_key("_id") {
            document.insert("_id", ObjectId::new());
        }
        target.documents.push(document);
        Ok(())
    }

    async fn update_one(&self, collection: &str, filter: Document, set: Document) -> Result<bool, StoreError> {
        let mut collections = self.collections.write().await;
        let Some(target) = collections.get_mut(collection) else {
            return Ok(false);
        };
        let Some(idx) = target.documents.iter().position(|d| matches(d, &filter)) else {
            return Ok(false);
        };

        let mut updated = target.documents[idx].clone();
        for (key, value) in set {
            updated.insert(key, value);
        }
        if let Some(key) = target.violates_unique(&updated, Some(idx)) {
            return Err(StoreError::DuplicateKey(format!("{} already has {}", collection, key)));
        }
        target.documents[idx] = updated;
        Ok(true)
    }

    async fn delete_one(&self, collection: &str, filter: Document) -> Result<bool, StoreError> {
        let mut collections = self.collections.write().await;
        let Some(target) = collections.get_mut(collection) else {
            return Ok(false);
        };
        match target.documents.iter().position(|d| matches(d, &filter)) {
            Some(idx) => {
                target.documents.remove(idx);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn count(&self, collection: &str) -> Result<u64, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|c| c.documents.len() as u64)
            .unwrap_or(0))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use futures::TryStreamExt;

    #[tokio::test]
    async fn unique_key_rejects_second_insert() {
        let store = InMemoryStore::new().with_unique_key("zodiacs", &["code"]).await;
        store.insert_one("zodiacs", doc! { "code": "Aries" }).await.unwrap();

        let err = store
            .insert_one("zodiacs", doc! { "code": "Aries", "title": "again" })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey(_)));
        assert_eq!(store.count("zodiacs").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn update_sets_only_given_fields() {
        let store = InMemoryStore::new();
        store
            .insert_one("life_paths", doc! { "code": "7", "title": "Seeker", "overview": "x" })
            .await
            .unwrap();

        let matched = store
            .update_one("life_paths", doc! { "code": "7" }, doc! { "title": "The Seeker" })
            .await
            .unwrap();
        assert!(matched);

        let found = store.find_one("life_paths", doc! { "code": "7" }).await.unwrap().unwrap();
        assert_eq!(found.get_str("title").unwrap(), "The Seeker");
        assert_eq!(found.get_str("overview").unwrap(), "x");
    }

    #[tokio::test]
    async fn update_without_match_reports_false() {
        let store = InMemoryStore::new();
        let matched = store
            .update_one("life_paths", doc! { "code": "1" }, doc! { "title": "Leader" })
            .await
            .unwrap();
        assert!(!matched);
    }

    #[tokio::test]
    async fn find_all_streams_seeded_documents() {
        let store = InMemoryStore::new();
        store
            .seed("numerology_data", vec![doc! { "type": "zodiac" }, doc! { "type": "life-path" }])
            .await;

        let all: Vec<Document> = store.find_all("numerology_data").await.unwrap().try_collect().await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|d| d.contains_key("_id")));
    }

    #[tokio::test]
    async fn delete_removes_first_match() {
        let store = InMemoryStore::new();
        store.insert_one("zodiacs", doc! { "code": "Leo" }).await.unwrap();
        assert!(store.delete_one("zodiacs", doc! { "code": "Leo" }).await.unwrap());
        assert!(!store.delete_one("zodiacs", doc! { "code": "Leo" }).await.unwrap());
    }
}
