use std::sync::Arc;

use clap::Args;
use serde_json::json;

use crate::cli::utils::{connect_store, output_success};
use crate::cli::OutputFormat;
use crate::config;
use crate::migration::Migrator;

#[derive(Args, Debug)]
pub struct StatusArgs {
    #[arg(long, help = "Legacy collection name (defaults to MONGODB_LEGACY_COLLECTION)")]
    pub source: Option<String>,
}

pub async fn handle(args: StatusArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let source = args
        .source
        .unwrap_or_else(|| config::config().database.legacy_collection.clone());

    let store = connect_store().await?;
    let status = Migrator::new(Arc::new(store), source.clone()).status().await?;

    let message = format!(
        "'{}' holds {} legacy records; {} life paths ({:.1}%), {} zodiacs ({:.1}%)",
        source,
        status.old_data,
        status.life_path,
        status.progress.life_path,
        status.zodiac,
        status.progress.zodiac
    );
    output_success(&output_format, &message, Some(json!({ "stats": status })))
}
