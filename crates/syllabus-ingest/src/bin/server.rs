//! Syllabus ingestion server binary
//!
//! Run with: cargo run -p syllabus-ingest --bin syllabus-ingest-server -- --config ingest.toml

use clap::Parser;
use std::path::PathBuf;
use syllabus_ingest::{config::AppConfig, server::IngestServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "syllabus-ingest-server", version, about = "Syllabus PDF ingestion service")]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "syllabus_ingest=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = AppConfig::load(args.config.as_deref())?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Generation endpoint: {}", config.generation.endpoint_url());
    tracing::info!("  - Database: {}", config.storage.database_path.display());
    tracing::info!("  - Blob backend: {:?}", config.storage.blob_backend);
    match &config.broker.rest_url {
        Some(url) => tracing::info!("  - Broker: {} (topic '{}')", url, config.broker.topic),
        None => tracing::warn!("  - Broker: none configured, chunk events will only be logged"),
    }

    let server = IngestServer::new(config).await?;
    tracing::info!("Health: http://{}/health", server.address());

    server.start().await?;

    Ok(())
}
