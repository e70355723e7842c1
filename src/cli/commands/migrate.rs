use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use bson::Document;
use clap::Args;
use serde_json::Value;

use crate::cli::utils::{connect_store, output_success};
use crate::cli::OutputFormat;
use crate::config;
use crate::migration::{MigrationStats, Migrator};
use crate::store::{InMemoryStore, SharedStore};

#[derive(Args, Debug)]
pub struct MigrateArgs {
    #[arg(long, help = "Dry run over a JSON or YAML snapshot of the legacy collection instead of MongoDB")]
    pub snapshot: Option<PathBuf>,

    #[arg(long, help = "Legacy collection name (defaults to MONGODB_LEGACY_COLLECTION)")]
    pub source: Option<String>,
}

pub async fn handle(args: MigrateArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let source = args
        .source
        .unwrap_or_else(|| config::config().database.legacy_collection.clone());

    let (stats, dry_run) = match &args.snapshot {
        Some(path) => (dry_run(path, &source).await?, true),
        None => {
            let store = connect_store().await?;
            store.ensure_indexes().await?;
            let store: SharedStore = Arc::new(store);
            (Migrator::new(store, source.clone()).run().await?, false)
        }
    };

    let message = format!(
        "{}Migrated {} of {} records from '{}' ({} inserted, {} updated, {} skipped)",
        if dry_run { "[dry run] " } else { "" },
        stats.migrated(),
        stats.total,
        source,
        stats.inserted,
        stats.updated,
        stats.skipped
    );
    output_success(&output_format, &message, Some(serde_json::json!({ "stats": stats })))
}

/// Run the full pipeline against an in-memory copy of a snapshot file
pub async fn dry_run(path: &Path, source: &str) -> anyhow::Result<MigrationStats> {
    let documents = load_snapshot(path)?;
    tracing::info!("Loaded {} legacy records from {}", documents.len(), path.display());

    let store = InMemoryStore::new().with_destination_keys().await;
    store.seed(source, documents).await;

    let stats = Migrator::new(Arc::new(store), source).run().await?;
    Ok(stats)
}

/// Read a snapshot: a JSON or YAML array of legacy records
pub fn load_snapshot(path: &Path) -> anyhow::Result<Vec<Document>> {
    let content = fs::read_to_string(path).with_context(|| format!("reading snapshot {}", path.display()))?;

    let records: Vec<Value> = match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => serde_yaml::from_str(&content).context("parsing YAML snapshot")?,
        _ => serde_json::from_str(&content).context("parsing JSON snapshot")?,
    };

    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            if !record.is_object() {
                bail!("Snapshot record {} is not an object", index);
            }
            bson::to_document(&record).with_context(|| format!("converting snapshot record {}", index))
        })
        .collect()
}
