//! Asset type enumeration.

use serde::{Deserialize, Serialize};

/// Kind of content an asset holds.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumIter,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum AssetType {
    /// Still image (PNG, JPEG, WebP)
    #[display("image")]
    Image,
    /// Speech audio (MP3, WAV)
    #[display("audio")]
    Audio,
    /// Talking-head video (MP4)
    #[display("video")]
    Video,
    /// Generated script text
    #[display("script")]
    Script,
}

impl AssetType {
    /// Types that can be selected as a stage input, in pipeline order.
    pub const SELECTABLE: [AssetType; 3] = [AssetType::Image, AssetType::Audio, AssetType::Video];

    /// Convert to string representation for ids and manifests.
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetType::Image => "image",
            AssetType::Audio => "audio",
            AssetType::Video => "video",
            AssetType::Script => "script",
        }
    }

    /// Whether assets of this type can be selected as a stage input.
    pub fn is_selectable(&self) -> bool {
        !matches!(self, AssetType::Script)
    }

    /// MIME prefix an uploaded file of this type must carry.
    pub fn mime_prefix(&self) -> &'static str {
        match self {
            AssetType::Image => "image/",
            AssetType::Audio => "audio/",
            AssetType::Video => "video/",
            AssetType::Script => "text/",
        }
    }
}

impl std::str::FromStr for AssetType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image" => Ok(AssetType::Image),
            "audio" => Ok(AssetType::Audio),
            "video" => Ok(AssetType::Video),
            "script" => Ok(AssetType::Script),
            _ => Err(format!("Unknown asset type: {}", s)),
        }
    }
}
