use serde::Serialize;

use super::category::{PairKind, LIFE_PATH_COLLECTION, ZODIAC_COLLECTION};
use crate::store::{DocumentStore, StoreError};

/// `destination / old * 100`, zero when there is no legacy data
pub fn progress_percent(destination: u64, old: u64) -> f64 {
    if old == 0 {
        return 0.0;
    }
    destination as f64 / old as f64 * 100.0
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub life_path: f64,
    pub zodiac: f64,
    pub life_path_life_path: f64,
    pub life_path_zodiac: f64,
    pub zodiac_zodiac: f64,
}

/// Advisory snapshot of migration progress. Counts are read one
/// collection at a time and may be mutually inconsistent mid-run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationStatus {
    pub old_data: u64,
    pub life_path: u64,
    pub zodiac: u64,
    pub life_path_life_path: u64,
    pub life_path_zodiac: u64,
    pub zodiac_zodiac: u64,
    pub progress: Progress,
}

pub async fn read_status(store: &dyn DocumentStore, legacy_collection: &str) -> Result<MigrationStatus, StoreError> {
    let old_data = store.count(legacy_collection).await?;
    let life_path = store.count(LIFE_PATH_COLLECTION).await?;
    let zodiac = store.count(ZODIAC_COLLECTION).await?;
    let life_path_life_path = store.count(PairKind::LifePathLifePath.collection()).await?;
    let life_path_zodiac = store.count(PairKind::LifePathZodiac.collection()).await?;
    let zodiac_zodiac = store.count(PairKind::ZodiacZodiac.collection()).await?;

    Ok(MigrationStatus {
        old_data,
        life_path,
        zodiac,
        life_path_life_path,
        life_path_zodiac,
        zodiac_zodiac,
        progress: Progress {
            life_path: progress_percent(life_path, old_data),
            zodiac: progress_percent(zodiac, old_data),
            life_path_life_path: progress_percent(life_path_life_path, old_data),
            life_path_zodiac: progress_percent(life_path_zodiac, old_data),
            zodiac_zodiac: progress_percent(zodiac_zodiac, old_data),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use bson::doc;

    #[test]
    fn empty_legacy_collection_reports_zero_progress() {
        assert_eq!(progress_percent(0, 0), 0.0);
        assert_eq!(progress_percent(12, 0), 0.0);
    }

    #[test]
    fn progress_is_a_percentage_of_legacy_count() {
        assert_eq!(progress_percent(1, 4), 25.0);
        assert_eq!(progress_percent(4, 4), 100.0);
    }

    #[tokio::test]
    async fn counts_every_collection() {
        let store = InMemoryStore::new();
        store
            .seed(
                "numerology_data",
                vec![doc! { "type": "life-path" }, doc! { "type": "zodiac" }, doc! { "type": "zodiac" }, doc! {}],
            )
            .await;
        store.seed("life_paths", vec![doc! { "code": "1" }]).await;
        store.seed("zodiacs", vec![doc! { "code": "Leo" }, doc! { "code": "Aries" }]).await;

        let status = read_status(&store, "numerology_data").await.unwrap();
        assert_eq!(status.old_data, 4);
        assert_eq!(status.life_path, 1);
        assert_eq!(status.zodiac, 2);
        assert_eq!(status.progress.life_path, 25.0);
        assert_eq!(status.progress.zodiac, 50.0);
        assert_eq!(status.progress.zodiac_zodiac, 0.0);
    }
}
