use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use majalla::config::Config;
use majalla::http::{self, AppState};
use majalla::relay::BrevoRelay;
use majalla::storage::Database;

#[derive(Parser, Debug)]
#[command(name = "majalla", about = "Bilingual content site backend")]
struct Args {
    /// Path to the TOML config file
    #[arg(long, value_name = "FILE", default_value = "majalla.toml")]
    config: PathBuf,

    /// Override the database path from the config file
    #[arg(long, value_name = "FILE")]
    database: Option<String>,

    /// Override the listen port from the config file
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let mut config = Config::load(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;
    if let Some(database) = args.database {
        config.database = database;
    }
    if let Some(port) = args.port {
        config.port = port;
    }

    let db = Database::open(&config.database)
        .await
        .with_context(|| format!("Failed to open database at {}", config.database))?;

    let relay = BrevoRelay::new(&config.brevo);

    http::serve(AppState { db, relay }, config.port).await
}
