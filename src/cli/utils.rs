use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::config;
use crate::store::{mongo::redact_uri, MongoStore};

/// Output a success message in the appropriate format.
/// Object `data` is merged into the JSON response; text mode prints it indented.
pub fn output_success(output_format: &OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(Value::Object(extra)), Some(object)) = (data, response.as_object_mut()) {
                object.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
            if let Some(Value::Object(extra)) = data {
                for (key, value) in extra {
                    println!("  {}: {}", key, value);
                }
            }
        }
    }
    Ok(())
}

/// Output an error message in the appropriate format
pub fn output_error(output_format: &OutputFormat, message: &str) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let response = json!({
                "success": false,
                "error": message
            });
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
        }
    }
    Ok(())
}

/// Connect to the configured MongoDB deployment
pub async fn connect_store() -> anyhow::Result<MongoStore> {
    let database = &config::config().database;
    let store = MongoStore::connect(&database.uri, &database.name, database.connect_timeout_ms)
        .await
        .map_err(|e| anyhow::anyhow!("Cannot reach MongoDB at {}: {}", redact_uri(&database.uri), e))?;
    Ok(store)
}
