//! Pipeline orchestration for vidgen.
//!
//! [`Pipeline`] threads asset identity through four sequential generation
//! calls (script → image → audio → video), persisting every media result to
//! an [`AssetStore`](vidgen_storage::AssetStore) and auto-selecting it as the
//! next stage's input.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vidgen_pipeline::{Generators, Pipeline, PipelineConfig};
//! use vidgen_providers::GenerationClient;
//! use vidgen_storage::FileSystemAssetStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(FileSystemAssetStore::new("/tmp/vidgen"));
//! let generators = Generators::from_client(GenerationClient::new("http://localhost:3000"));
//! let pipeline = Pipeline::new(store, generators, PipelineConfig::default());
//!
//! pipeline.recover().await?;
//! pipeline.generate_script("A 30-second intro to Rust").await?;
//! pipeline.generate_image("A presenter facing the camera").await?;
//! pipeline.generate_audio().await?;
//! let video = pipeline.generate_video().await?;
//! println!("Stored {}", video.id);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod generators;
mod handles;
mod pipeline;
mod selection;
mod stage;

pub use config::{PipelineConfig, StageKeys, StageModels};
pub use generators::Generators;
pub use handles::{DisplayHandle, DisplayHandles, HANDLE_PREFIX};
pub use pipeline::{GalleryItem, Pipeline, UPLOAD_MODEL, newest_first};
pub use selection::SelectionState;
pub use stage::Stage;
