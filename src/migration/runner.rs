//! Batch orchestrator: classify, project and reconcile every legacy record.
//!
//! Records are consumed from a cursor strictly one at a time. A record that
//! cannot be classified, projected or written is counted and skipped; only a
//! store outage aborts the run. Each reconciled record is durable as soon as
//! it is written, there is no run-wide transaction.

use bson::{DateTime, Document};
use futures::StreamExt;
use thiserror::Error;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::category::{Category, SkipReason};
use super::classify::classify;
use super::project::project;
use super::reconcile::reconcile;
use super::stats::{MigrationStats, RecordResult};
use super::status::{read_status, MigrationStatus};
use crate::store::{DocumentStore, SharedStore, StoreError};

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Migration aborted, store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Migration could not start: {0}")]
    Store(StoreError),
}

impl From<StoreError> for MigrationError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) => MigrationError::StoreUnavailable(msg),
            other => MigrationError::Store(other),
        }
    }
}

/// Runs the legacy → typed collections migration
#[derive(Clone)]
pub struct Migrator {
    store: SharedStore,
    legacy_collection: String,
}

impl Migrator {
    pub fn new(store: SharedStore, legacy_collection: impl Into<String>) -> Self {
        Self {
            store,
            legacy_collection: legacy_collection.into(),
        }
    }

    pub async fn run(&self) -> Result<MigrationStats, MigrationError> {
        let run_id = Uuid::new_v4();
        let span = info_span!("migration", %run_id, source = %self.legacy_collection);
        self.run_inner().instrument(span).await
    }

    async fn run_inner(&self) -> Result<MigrationStats, MigrationError> {
        info!("Starting migration from '{}'", self.legacy_collection);

        let mut source = self.store.find_all(&self.legacy_collection).await?;
        let mut stats = MigrationStats::default();

        while let Some(next) = source.next().await {
            stats = match next {
                Ok(document) => migrate_one(self.store.as_ref(), &document, stats).await?,
                Err(StoreError::Unavailable(msg)) => {
                    error!("Lost the store after {} records: {}", stats.total, msg);
                    return Err(MigrationError::StoreUnavailable(msg));
                }
                Err(e) => {
                    warn!("Unreadable legacy record: {}", e);
                    stats.record(&unreadable(), RecordResult::Failed)
                }
            };
        }

        info!(
            total = stats.total,
            migrated = stats.migrated(),
            inserted = stats.inserted,
            updated = stats.updated,
            skipped = stats.skipped,
            "Migration finished"
        );
        Ok(stats)
    }

    pub async fn status(&self) -> Result<MigrationStatus, StoreError> {
        read_status(self.store.as_ref(), &self.legacy_collection).await
    }
}

fn unreadable() -> Category {
    Category::Unrecognized(SkipReason::UnknownType(String::new()))
}

/// Process one legacy document. Only a store outage is returned as an error.
async fn migrate_one(
    store: &dyn DocumentStore,
    document: &Document,
    stats: MigrationStats,
) -> Result<MigrationStats, MigrationError> {
    let id = document
        .get("_id")
        .map(|id| id.to_string())
        .unwrap_or_else(|| "<no id>".to_string());

    let category = classify(document);
    if !category.is_recognized() {
        debug!("Skipping legacy record {}: {}", id, category);
        return Ok(stats.record(&category, RecordResult::Unrecognized));
    }

    let now = DateTime::now();
    let record = match project(document, &category, now) {
        Ok(record) => record,
        Err(e) => {
            warn!("Cannot transform legacy record {} as {}: {}", id, category, e);
            return Ok(stats.record(&category, RecordResult::Failed));
        }
    };

    match reconcile(store, &record, now).await {
        Ok(outcome) => Ok(stats.record(&category, RecordResult::Written(outcome))),
        Err(StoreError::Unavailable(msg)) => {
            error!("Store unavailable while writing {} [{}]: {}", record.collection, record.key, msg);
            Err(MigrationError::StoreUnavailable(msg))
        }
        Err(e) => {
            warn!("Failed to write {} [{}]: {}", record.collection, record.key, e);
            Ok(stats.record(&category, RecordResult::Failed))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migration::stats::CategoryTally;
    use crate::store::InMemoryStore;
    use bson::doc;
    use std::sync::Arc;

    async fn migrator_with(documents: Vec<Document>) -> (Arc<InMemoryStore>, Migrator) {
        let store = Arc::new(InMemoryStore::new().with_destination_keys().await);
        store.seed("numerology_data", documents).await;
        let migrator = Migrator::new(store.clone(), "numerology_data");
        (store, migrator)
    }

    #[tokio::test]
    async fn routes_each_record_to_its_destination() {
        let (store, migrator) = migrator_with(vec![
            doc! { "type": "life-path", "code": "7", "title": "Seeker" },
            doc! { "type": "zodiac", "code": "Aries" },
            doc! { "factor1Type": "zodiac", "factor1Code": "Aries", "factor2Type": "life-path", "factor2Code": "3" },
            doc! { "factor1Type": "zodiac", "factor1Code": "Leo", "factor2Type": "zodiac", "factor2Code": "Aries" },
            doc! { "type": "tarot", "code": "1" },
        ])
        .await;

        let stats = migrator.run().await.unwrap();

        assert_eq!(stats.total, 5);
        assert_eq!(stats.life_path.migrated, 1);
        assert_eq!(stats.zodiac.migrated, 1);
        assert_eq!(stats.life_path_zodiac.migrated, 1);
        assert_eq!(stats.zodiac_zodiac.migrated, 1);
        assert_eq!(stats.unrecognized, 1);
        assert!(stats.is_conserved());

        assert_eq!(store.count("life_path_zodiac_compatibilities").await.unwrap(), 1);
        assert_eq!(store.count("zodiac_zodiac_compatibilities").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn malformed_record_does_not_stop_the_batch() {
        let (store, migrator) = migrator_with(vec![
            doc! { "type": "life-path", "code": "1", "traits": "not a list" },
            doc! { "type": "life-path", "code": "2" },
        ])
        .await;

        let stats = migrator.run().await.unwrap();
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.life_path, CategoryTally { total: 2, migrated: 1 });
        assert_eq!(store.count("life_paths").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn second_run_only_updates() {
        let (store, migrator) = migrator_with(vec![
            doc! { "type": "life-path", "code": "1" },
            doc! { "type": "zodiac", "code": "Leo" },
        ])
        .await;

        let first = migrator.run().await.unwrap();
        let second = migrator.run().await.unwrap();

        assert_eq!(first.inserted, 2);
        assert_eq!(second.inserted, 0);
        assert_eq!(second.updated, 2);
        assert_eq!(store.count("life_paths").await.unwrap(), 1);
        assert_eq!(store.count("zodiacs").await.unwrap(), 1);
    }
}
