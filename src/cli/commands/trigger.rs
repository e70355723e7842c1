use std::time::Duration;

use anyhow::{anyhow, Context};
use clap::Args;
use serde_json::{json, Value};

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;

#[derive(Args, Debug)]
pub struct TriggerArgs {
    #[arg(long, default_value = "http://localhost:3000", help = "Server base URL")]
    pub url: String,

    #[arg(long, env = "THANSOHOC_TOKEN", help = "Admin bearer token")]
    pub token: String,

    #[arg(long, default_value_t = 300, help = "Request timeout in seconds")]
    pub timeout: u64,
}

pub async fn handle(args: TriggerArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let client = reqwest::Client::new();
    let url = format!("{}/api/migration", args.url.trim_end_matches('/'));

    let response = client
        .post(&url)
        .bearer_auth(&args.token)
        .timeout(Duration::from_secs(args.timeout))
        .send()
        .await
        .with_context(|| format!("POST {}", url))?;

    let status = response.status();
    let body: Value = response.json().await.context("server returned a non-JSON body")?;

    if !status.is_success() {
        let message = body
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("request failed");
        return Err(anyhow!("{} ({})", message, status));
    }

    let message = body
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("Migration completed")
        .to_string();
    output_success(&output_format, &message, Some(json!({ "stats": body.get("stats") })))
}
