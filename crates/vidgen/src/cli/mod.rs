//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the vidgen binary.

mod assets;
mod commands;
mod generate;

pub use commands::{Cli, Commands, OutputFormat};

use vidgen::{FileSystemAssetStore, Pipeline, VidgenConfig, VidgenResult};

/// Run one command against a recovered pipeline.
pub async fn dispatch(
    command: Commands,
    pipeline: &Pipeline,
    store: &FileSystemAssetStore,
    config: &VidgenConfig,
) -> VidgenResult<()> {
    match command {
        Commands::Script { prompt, out } => {
            generate::script(pipeline, config, prompt, out.as_deref()).await
        }
        Commands::Image { prompt } => generate::image(pipeline, config, prompt).await,
        Commands::Audio { text, script_file } => {
            generate::audio(pipeline, text, script_file.as_deref()).await
        }
        Commands::Video { image, audio } => generate::video(pipeline, image, audio).await,
        Commands::Run {
            script_prompt,
            image_prompt,
        } => generate::run(pipeline, config, script_prompt, image_prompt).await,
        Commands::Upload { asset_type, path } => {
            generate::upload(pipeline, asset_type, &path).await
        }
        Commands::List { asset_type, format } => {
            assets::list(pipeline, store, asset_type, format).await
        }
        Commands::Export { id, path } => assets::export(pipeline, &id, &path).await,
        Commands::Delete { id } => assets::delete(pipeline, &id).await,
        Commands::Clear { yes } => assets::clear(pipeline, yes).await,
    }
}
