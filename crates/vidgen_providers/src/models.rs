//! Model identifiers and model-dependent request rules.

/// Text model used when none is configured.
pub const DEFAULT_TEXT_MODEL: &str = "gpt-4o";

/// Image model used when none is configured.
pub const DEFAULT_IMAGE_MODEL: &str = "dall-e-3";

/// Speech model used when none is configured.
pub const DEFAULT_AUDIO_MODEL: &str = "eleven_multilingual_v2";

/// Talking-head video model used when none is configured.
pub const DEFAULT_VIDEO_MODEL: &str =
    "zsxkib/sonic:a2aad29ea95f19747a5ea22ab14fc6594654506e5815f7f5ba4293e888d3e20f";

/// Whether an image model takes the current image as context (Flux Kontext family).
pub fn accepts_input_image(model: &str) -> bool {
    model.contains("flux-kontext")
}

/// Whether image requests for this model are sent as multipart form data.
pub fn uses_multipart_image(model: &str) -> bool {
    model.contains("black-forest-labs")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kontext_models_accept_input_image() {
        assert!(accepts_input_image("black-forest-labs/flux-kontext-pro"));
        assert!(accepts_input_image("black-forest-labs/flux-kontext-max"));
        assert!(!accepts_input_image("black-forest-labs/flux-1.1-pro"));
        assert!(!accepts_input_image(DEFAULT_IMAGE_MODEL));
    }

    #[test]
    fn test_replicate_image_models_use_multipart() {
        assert!(uses_multipart_image("black-forest-labs/flux-1.1-pro"));
        assert!(!uses_multipart_image("dall-e-2"));
    }
}
