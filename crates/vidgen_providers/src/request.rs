//! Collaborator request and response types.

use derive_setters::Setters;

/// Request for script text.
#[derive(Debug, Clone, PartialEq, Eq, Setters)]
#[setters(prefix = "with_", into, strip_option)]
pub struct TextRequest {
    /// Model identifier
    pub model: String,
    /// Prompt describing the script
    pub prompt: String,
    /// User-supplied provider key
    pub key: Option<String>,
}

impl TextRequest {
    /// Create a request without a user key.
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            key: None,
        }
    }
}

/// Request for a still image.
#[derive(Debug, Clone, PartialEq, Eq, Setters)]
#[setters(prefix = "with_", into, strip_option)]
pub struct ImageRequest {
    /// Model identifier
    pub model: String,
    /// Prompt describing the image
    pub prompt: String,
    /// Context image for models that accept one
    pub input_image: Option<Vec<u8>>,
    /// User-supplied provider key
    pub key: Option<String>,
}

impl ImageRequest {
    /// Create a request with no context image and no user key.
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            input_image: None,
            key: None,
        }
    }
}

/// Request for speech audio.
#[derive(Debug, Clone, PartialEq, Eq, Setters)]
#[setters(prefix = "with_", into, strip_option)]
pub struct AudioRequest {
    /// Model identifier
    pub model: String,
    /// Text to speak
    pub text: String,
    /// User-supplied provider key
    pub key: Option<String>,
}

impl AudioRequest {
    /// Create a request without a user key.
    pub fn new(model: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            text: text.into(),
            key: None,
        }
    }
}

/// Request for a talking-head video.
#[derive(Clone, PartialEq, Eq, Setters)]
#[setters(prefix = "with_", into, strip_option)]
pub struct VideoRequest {
    /// Model identifier
    pub model: String,
    /// Face image bytes
    pub image: Vec<u8>,
    /// Speech audio bytes
    pub audio: Vec<u8>,
    /// User-supplied provider key
    pub key: Option<String>,
}

impl VideoRequest {
    /// Create a request without a user key.
    pub fn new(model: impl Into<String>, image: Vec<u8>, audio: Vec<u8>) -> Self {
        Self {
            model: model.into(),
            image,
            audio,
            key: None,
        }
    }
}

impl std::fmt::Debug for VideoRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoRequest")
            .field("model", &self.model)
            .field("image_len", &self.image.len())
            .field("audio_len", &self.audio.len())
            .field("key", &self.key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Binary output of a media collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedMedia {
    /// Raw content
    pub bytes: Vec<u8>,
    /// MIME type reported by the service, if any
    pub content_type: Option<String>,
}

impl GeneratedMedia {
    /// Wrap bytes with an optional content type.
    pub fn new(bytes: Vec<u8>, content_type: Option<String>) -> Self {
        Self {
            bytes,
            content_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setters_wrap_options() {
        let request = ImageRequest::new("black-forest-labs/flux-kontext-pro", "A cat")
            .with_input_image(vec![1u8, 2, 3])
            .with_key("r8_test");
        assert_eq!(request.input_image.as_deref(), Some(&[1u8, 2, 3][..]));
        assert_eq!(request.key.as_deref(), Some("r8_test"));
    }

    #[test]
    fn test_video_request_debug_hides_payload() {
        let request = VideoRequest::new("sonic", vec![0; 1024], vec![0; 2048]).with_key("secret");
        let debug = format!("{:?}", request);
        assert!(debug.contains("image_len: 1024"));
        assert!(!debug.contains("secret"));
    }
}
