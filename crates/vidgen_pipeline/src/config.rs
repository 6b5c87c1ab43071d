//! Per-stage model and key selection.

use serde::{Deserialize, Serialize};
use vidgen_providers::{
    DEFAULT_AUDIO_MODEL, DEFAULT_IMAGE_MODEL, DEFAULT_TEXT_MODEL, DEFAULT_VIDEO_MODEL,
};

/// Model used by each stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageModels {
    /// Script model
    pub text: String,
    /// Image model
    pub image: String,
    /// Speech model
    pub audio: String,
    /// Talking-head model
    pub video: String,
}

impl Default for StageModels {
    fn default() -> Self {
        Self {
            text: DEFAULT_TEXT_MODEL.to_string(),
            image: DEFAULT_IMAGE_MODEL.to_string(),
            audio: DEFAULT_AUDIO_MODEL.to_string(),
            video: DEFAULT_VIDEO_MODEL.to_string(),
        }
    }
}

/// Optional user-supplied provider keys, passed through to the service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageKeys {
    /// Key for the script model
    pub text: Option<String>,
    /// Key for the image model
    pub image: Option<String>,
    /// Key for the speech model
    pub audio: Option<String>,
    /// Key for the talking-head model
    pub video: Option<String>,
}

/// Models and keys for a pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Model per stage
    pub models: StageModels,
    /// User key per stage
    pub keys: StageKeys,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_models_keep_defaults() {
        let config: PipelineConfig = serde_json::from_value(serde_json::json!({
            "models": {"image": "black-forest-labs/flux-kontext-pro"},
            "keys": {"audio": "el-key"}
        }))
        .unwrap();
        assert_eq!(config.models.image, "black-forest-labs/flux-kontext-pro");
        assert_eq!(config.models.text, DEFAULT_TEXT_MODEL);
        assert_eq!(config.keys.audio.as_deref(), Some("el-key"));
        assert_eq!(config.keys.text, None);
    }
}
