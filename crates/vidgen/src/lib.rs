//! vidgen - script → voice → face → video
//!
//! vidgen chains four generative collaborators (text, image, speech,
//! talking-head video) and keeps every artifact in a local asset store, so a
//! session can pick up where the last one ended.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vidgen::{FileSystemAssetStore, VidgenConfig};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = VidgenConfig::load()?;
//! let store = Arc::new(FileSystemAssetStore::new(config.storage_path()));
//! let pipeline = config.build_pipeline(store);
//!
//! pipeline.recover().await?;
//! pipeline.generate_script(&config.prompts.script).await?;
//! pipeline.generate_image(&config.prompts.image).await?;
//! pipeline.generate_audio().await?;
//! let video = pipeline.generate_video().await?;
//! println!("Video stored as {}", video.id);
//!
//! pipeline.shutdown().await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - `vidgen_error` - Error types
//! - `vidgen_storage` - Asset store, manifest index and asset ids
//! - `vidgen_providers` - Generation collaborator traits and HTTP client
//! - `vidgen_pipeline` - Stage orchestration, selection and display handles
//!
//! This crate re-exports everything and adds layered configuration and the
//! `vidgen` binary.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;

pub use config::{ApiConfig, PromptConfig, StorageConfig, VidgenConfig};

pub use vidgen_error::*;
pub use vidgen_pipeline::*;
pub use vidgen_providers::*;
pub use vidgen_storage::*;
