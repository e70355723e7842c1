//! Reconciler: insert-or-update keyed on the natural key.
//!
//! Lookup and write are two separate round-trips. Concurrent runs can both
//! miss the lookup; the destination's unique index rejects the losing
//! insert, which is reported as [`Outcome::AlreadyExists`].

use bson::{Bson, DateTime};
use serde::Serialize;
use tracing::debug;

use super::project::DestinationRecord;
use crate::store::{DocumentStore, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Outcome {
    Inserted,
    Updated,
    /// Lost an insert race against another writer of the same key
    AlreadyExists,
}

pub async fn reconcile(
    store: &dyn DocumentStore,
    record: &DestinationRecord,
    now: DateTime,
) -> Result<Outcome, StoreError> {
    let filter = record.key.filter();
    let created_at = record.created_at.clone().unwrap_or(Bson::DateTime(now));

    match store.find_one(record.collection, filter.clone()).await? {
        Some(existing) => {
            let mut set = record.fields.clone();
            // createdAt survives updates; only backfill it when absent
            if !existing.contains_key("createdAt") {
                set.insert("createdAt", created_at);
            }

            if store.update_one(record.collection, filter, set).await? {
                debug!("Updated {} [{}]", record.collection, record.key);
                Ok(Outcome::Updated)
            } else {
                // Deleted between lookup and write; the next run will insert it
                debug!("{} [{}] vanished before update", record.collection, record.key);
                Ok(Outcome::AlreadyExists)
            }
        }
        None => {
            let mut document = record.fields.clone();
            document.insert("createdAt", created_at);

            match store.insert_one(record.collection, document).await {
                Ok(()) => {
                    debug!("Inserted {} [{}]", record.collection, record.key);
                    Ok(Outcome::Inserted)
                }
                Err(StoreError::DuplicateKey(msg)) => {
                    debug!("{} [{}] already exists: {}", record.collection, record.key, msg);
                    Ok(Outcome::AlreadyExists)
                }
                Err(e) => Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migration::category::Category;
    use crate::migration::project::project;
    use crate::store::InMemoryStore;
    use bson::doc;

    fn at(millis: i64) -> DateTime {
        DateTime::from_millis(millis)
    }

    #[tokio::test]
    async fn inserts_then_updates_preserving_created_at() {
        let store = InMemoryStore::new().with_destination_keys().await;
        let source = doc! { "type": "life-path", "code": "7", "title": "Seeker" };

        let first = project(&source, &Category::LifePath, at(1_000)).unwrap();
        assert_eq!(reconcile(&store, &first, at(1_000)).await.unwrap(), Outcome::Inserted);

        let second = project(&source, &Category::LifePath, at(2_000)).unwrap();
        assert_eq!(reconcile(&store, &second, at(2_000)).await.unwrap(), Outcome::Updated);

        let stored = store.documents("life_paths").await;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].get_datetime("createdAt").unwrap(), &at(1_000));
        assert_eq!(stored[0].get_datetime("updatedAt").unwrap(), &at(2_000));
    }

    #[tokio::test]
    async fn source_created_at_wins_on_insert() {
        let store = InMemoryStore::new();
        let source = doc! { "type": "zodiac", "code": "Leo", "createdAt": at(42) };
        let record = project(&source, &Category::Zodiac, at(9_000)).unwrap();

        reconcile(&store, &record, at(9_000)).await.unwrap();

        let stored = store.find_one("zodiacs", doc! { "code": "Leo" }).await.unwrap().unwrap();
        assert_eq!(stored.get_datetime("createdAt").unwrap(), &at(42));
    }

    #[tokio::test]
    async fn update_backfills_missing_created_at() {
        let store = InMemoryStore::new();
        store.seed("zodiacs", vec![doc! { "code": "Leo", "title": "old" }]).await;

        let source = doc! { "type": "zodiac", "code": "Leo", "title": "Lion" };
        let record = project(&source, &Category::Zodiac, at(5_000)).unwrap();
        assert_eq!(reconcile(&store, &record, at(5_000)).await.unwrap(), Outcome::Updated);

        let stored = store.find_one("zodiacs", doc! { "code": "Leo" }).await.unwrap().unwrap();
        assert_eq!(stored.get_str("title").unwrap(), "Lion");
        assert_eq!(stored.get_datetime("createdAt").unwrap(), &at(5_000));
    }
}
