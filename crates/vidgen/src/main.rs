//! vidgen CLI binary.
//!
//! This binary drives the generation pipeline from the command line:
//! - Generate scripts, images, audio and videos, one stage or all at once
//! - Upload existing images and audio
//! - List, export and delete stored assets

use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use vidgen::{FileSystemAssetStore, VidgenConfig};

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, dispatch};

    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    // Initialize tracing; RUST_LOG overrides the default level
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = VidgenConfig::load_from(cli.config.as_deref())?;
    let store = Arc::new(FileSystemAssetStore::new(config.storage_path()));
    let pipeline = config.build_pipeline(store.clone());

    // Every invocation is a session: restore the newest selections first
    pipeline.recover().await?;

    let result = dispatch(cli.command, &pipeline, &store, &config).await;
    if let Err(e) = &result
        && let Some(storage) = e.as_storage()
    {
        let class = if storage.kind.is_write() {
            "write"
        } else if storage.kind.is_read() {
            "read"
        } else {
            "other"
        };
        tracing::error!(class, error = %e, "Asset storage failed");
    }
    pipeline.shutdown().await?;
    result?;

    Ok(())
}
