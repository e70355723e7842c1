//! One-time reshaping of the flat legacy numerology collection into typed
//! destination collections.
//!
//! Pipeline per legacy record:
//! classify (pure) → project (pure) → reconcile (one lookup, one write),
//! folded into [`MigrationStats`]. Safe to re-run: a second pass over an
//! unchanged source only updates.

pub mod category;
pub mod classify;
pub mod legacy;
pub mod project;
pub mod reconcile;
pub mod runner;
pub mod stats;
pub mod status;

pub use category::{Category, FactorKind, PairKind, SkipReason};
pub use classify::classify;
pub use legacy::{LegacyRecord, TransformError};
pub use project::{project, DestinationRecord, NaturalKey};
pub use reconcile::{reconcile, Outcome};
pub use runner::{MigrationError, Migrator};
pub use stats::{CategoryTally, MigrationStats};
pub use status::{progress_percent, MigrationStatus, Progress};
