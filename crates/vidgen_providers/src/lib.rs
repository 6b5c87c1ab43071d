//! Generation collaborators for vidgen.
//!
//! Each pipeline stage depends on one narrow trait:
//!
//! - [`TextGenerator`]: prompt → script text
//! - [`ImageGenerator`]: prompt (plus optional context image) → image bytes
//! - [`AudioGenerator`]: script → speech audio bytes
//! - [`VideoGenerator`]: image + audio → talking-head video bytes
//!
//! [`GenerationClient`] implements all four against the generation service's
//! `/api/generate/*` routes. Tests substitute their own implementations.
//!
//! # Example
//!
//! ```rust,no_run
//! use vidgen_providers::{AudioGenerator, AudioRequest, GenerationClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GenerationClient::new("http://localhost:3000");
//! let request = AudioRequest::new("eleven_multilingual_v2", "Hello world");
//! let audio = client.generate_audio(&request).await?;
//! println!("{} bytes of {:?}", audio.bytes.len(), audio.content_type);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod generator;
mod models;
mod request;

pub use client::GenerationClient;
pub use generator::{AudioGenerator, ImageGenerator, TextGenerator, VideoGenerator};
pub use models::{
    DEFAULT_AUDIO_MODEL, DEFAULT_IMAGE_MODEL, DEFAULT_TEXT_MODEL, DEFAULT_VIDEO_MODEL,
    accepts_input_image, uses_multipart_image,
};
pub use request::{AudioRequest, GeneratedMedia, ImageRequest, TextRequest, VideoRequest};
pub use vidgen_error::{ProviderError, ProviderErrorKind};
