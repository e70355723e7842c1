pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "thansohoc")]
#[command(about = "Thần Số Học operator CLI - legacy data migration and admin tokens")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Migrate legacy numerology records into the typed collections")]
    Migrate(commands::migrate::MigrateArgs),

    #[command(about = "Show migration progress")]
    Status(commands::status::StatusArgs),

    #[command(about = "Mint a signed admin token")]
    Token(commands::token::TokenArgs),

    #[command(about = "Trigger a migration on a running server")]
    Trigger(commands::trigger::TriggerArgs),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Migrate(args) => commands::migrate::handle(args, output_format).await,
        Commands::Status(args) => commands::status::handle(args, output_format).await,
        Commands::Token(args) => commands::token::handle(args, output_format).await,
        Commands::Trigger(args) => commands::trigger::handle(args, output_format).await,
    }
}
