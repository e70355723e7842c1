use serde::Serialize;

use super::category::{Category, PairKind};
use super::reconcile::Outcome;

/// Seen / successfully written counts for one destination
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryTally {
    pub total: u64,
    pub migrated: u64,
}

/// Accumulator threaded through one migration run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationStats {
    pub total: u64,
    pub life_path: CategoryTally,
    pub zodiac: CategoryTally,
    pub life_path_life_path: CategoryTally,
    pub life_path_zodiac: CategoryTally,
    pub zodiac_zodiac: CategoryTally,
    pub inserted: u64,
    pub updated: u64,
    /// unrecognized + failed + already_exists
    pub skipped: u64,
    pub unrecognized: u64,
    pub failed: u64,
    pub already_exists: u64,
}

/// How a single record ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordResult {
    Written(Outcome),
    Unrecognized,
    Failed,
}

impl MigrationStats {
    fn tally_mut(&mut self, category: &Category) -> Option<&mut CategoryTally> {
        match category {
            Category::LifePath => Some(&mut self.life_path),
            Category::Zodiac => Some(&mut self.zodiac),
            Category::Compatibility(PairKind::LifePathLifePath) => Some(&mut self.life_path_life_path),
            Category::Compatibility(PairKind::LifePathZodiac) => Some(&mut self.life_path_zodiac),
            Category::Compatibility(PairKind::ZodiacZodiac) => Some(&mut self.zodiac_zodiac),
            Category::Unrecognized(_) => None,
        }
    }

    /// Fold one record's result into the counters
    pub fn record(mut self, category: &Category, result: RecordResult) -> Self {
        self.total += 1;
        if let Some(tally) = self.tally_mut(category) {
            tally.total += 1;
        }

        match result {
            RecordResult::Written(Outcome::Inserted) | RecordResult::Written(Outcome::Updated) => {
                if let Some(tally) = self.tally_mut(category) {
                    tally.migrated += 1;
                }
                if result == RecordResult::Written(Outcome::Inserted) {
                    self.inserted += 1;
                } else {
                    self.updated += 1;
                }
            }
            RecordResult::Written(Outcome::AlreadyExists) => {
                self.already_exists += 1;
                self.skipped += 1;
            }
            RecordResult::Unrecognized => {
                self.unrecognized += 1;
                self.skipped += 1;
            }
            RecordResult::Failed => {
                self.failed += 1;
                self.skipped += 1;
            }
        }

        self
    }

    /// Records written across every destination
    pub fn migrated(&self) -> u64 {
        self.life_path.migrated
            + self.zodiac.migrated
            + self.life_path_life_path.migrated
            + self.life_path_zodiac.migrated
            + self.zodiac_zodiac.migrated
    }

    /// `total == migrated + skipped`
    pub fn is_conserved(&self) -> bool {
        self.total == self.migrated() + self.skipped
    }
}
