//! Collaborator bundle.

use std::sync::Arc;
use vidgen_providers::{
    AudioGenerator, GenerationClient, ImageGenerator, TextGenerator, VideoGenerator,
};

/// The four generation collaborators a pipeline calls.
#[derive(Clone)]
pub struct Generators {
    /// Script collaborator
    pub text: Arc<dyn TextGenerator>,
    /// Image collaborator
    pub image: Arc<dyn ImageGenerator>,
    /// Speech collaborator
    pub audio: Arc<dyn AudioGenerator>,
    /// Talking-head collaborator
    pub video: Arc<dyn VideoGenerator>,
}

impl Generators {
    /// Use one generation service client for every stage.
    pub fn from_client(client: GenerationClient) -> Self {
        let client = Arc::new(client);
        Self {
            text: client.clone(),
            image: client.clone(),
            audio: client.clone(),
            video: client,
        }
    }
}

impl std::fmt::Debug for Generators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Generators")
            .field("text", &self.text.provider_name())
            .field("image", &self.image.provider_name())
            .field("audio", &self.audio.provider_name())
            .field("video", &self.video.provider_name())
            .finish()
    }
}
