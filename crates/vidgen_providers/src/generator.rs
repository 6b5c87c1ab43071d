//! Collaborator traits, one per pipeline stage.

use crate::{AudioRequest, GeneratedMedia, ImageRequest, TextRequest, VideoRequest};
use async_trait::async_trait;
use vidgen_error::VidgenResult;

/// Produces script text from a prompt.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate the full text, consuming any streamed response to completion.
    async fn generate_text(&self, request: &TextRequest) -> VidgenResult<String>;

    /// Provider name for logging.
    fn provider_name(&self) -> &'static str;
}

/// Produces a still image from a prompt.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Generate image bytes.
    async fn generate_image(&self, request: &ImageRequest) -> VidgenResult<GeneratedMedia>;

    /// Provider name for logging.
    fn provider_name(&self) -> &'static str;
}

/// Produces speech audio from text.
#[async_trait]
pub trait AudioGenerator: Send + Sync {
    /// Generate audio bytes.
    async fn generate_audio(&self, request: &AudioRequest) -> VidgenResult<GeneratedMedia>;

    /// Provider name for logging.
    fn provider_name(&self) -> &'static str;
}

/// Produces a talking-head video from a face image and speech audio.
#[async_trait]
pub trait VideoGenerator: Send + Sync {
    /// Generate video bytes.
    async fn generate_video(&self, request: &VideoRequest) -> VidgenResult<GeneratedMedia>;

    /// Provider name for logging.
    fn provider_name(&self) -> &'static str;
}
