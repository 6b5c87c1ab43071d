//! Asset identifier scheme.
//!
//! Ids look like `{type}_{timestamp}_{promptHash}_{random}`:
//!
//! - `type` is the [`AssetType`] tag
//! - `timestamp` is epoch milliseconds at generation time
//! - `promptHash` is the first 8 characters of the URL-safe base64 encoding
//!   of the prompt, empty when there is no prompt
//! - `random` is 8 hex characters taken from a v4 UUID
//!
//! Only `[A-Za-z0-9_-]` is accepted, so every id is usable as a file name.

use crate::{AssetType, now_millis};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use vidgen_error::{StorageError, StorageErrorKind};

const PROMPT_HASH_LEN: usize = 8;
const RANDOM_SUFFIX_LEN: usize = 8;
const MAX_ID_LEN: usize = 200;

/// Primary key tying a blob, its metadata and selection state together.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(try_from = "String", into = "String")]
#[display("{}", _0)]
pub struct AssetId(String);

impl AssetId {
    /// Generate a fresh id for an asset of `asset_type` created from `prompt`.
    ///
    /// # Examples
    ///
    /// ```
    /// use vidgen_storage::{AssetId, AssetType};
    ///
    /// let id = AssetId::generate(AssetType::Audio, Some("Hello world"));
    /// assert!(id.as_str().starts_with("audio_"));
    /// assert_eq!(id.asset_type(), Some(AssetType::Audio));
    /// ```
    pub fn generate(asset_type: AssetType, prompt: Option<&str>) -> Self {
        Self::generate_at(asset_type, prompt, now_millis())
    }

    /// Generate an id with an explicit timestamp.
    pub fn generate_at(asset_type: AssetType, prompt: Option<&str>, timestamp_ms: i64) -> Self {
        let prompt_hash = prompt
            .filter(|p| !p.is_empty())
            .map(|p| {
                URL_SAFE_NO_PAD
                    .encode(p.as_bytes())
                    .chars()
                    .take(PROMPT_HASH_LEN)
                    .collect::<String>()
            })
            .unwrap_or_default();
        let random = Uuid::new_v4().simple().to_string();

        Self(format!(
            "{}_{}_{}_{}",
            asset_type.as_str(),
            timestamp_ms,
            prompt_hash,
            &random[..RANDOM_SUFFIX_LEN]
        ))
    }

    /// Validate an existing id string.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAssetId` if the string is empty, too long, or
    /// contains characters outside `[A-Za-z0-9_-]`.
    pub fn parse(value: impl Into<String>) -> Result<Self, StorageError> {
        let value = value.into();
        if value.is_empty() || value.len() > MAX_ID_LEN {
            return Err(StorageError::new(StorageErrorKind::InvalidAssetId(value)));
        }
        if !value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(StorageError::new(StorageErrorKind::InvalidAssetId(value)));
        }
        Ok(Self(value))
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Type tag encoded in the id, if it follows the generation scheme.
    pub fn asset_type(&self) -> Option<AssetType> {
        self.0.split('_').next()?.parse().ok()
    }

    /// Timestamp encoded in the id, if it follows the generation scheme.
    pub fn timestamp_ms(&self) -> Option<i64> {
        self.0.splitn(3, '_').nth(1)?.parse().ok()
    }
}

impl AsRef<str> for AssetId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for AssetId {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for AssetId {
    type Error = StorageError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<AssetId> for String {
    fn from(id: AssetId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_id_layout() {
        let id = AssetId::generate_at(AssetType::Image, Some("A portrait"), 1_700_000_000_000);
        let parts: Vec<&str> = id.as_str().splitn(3, '_').collect();

        assert_eq!(parts[0], "image");
        assert_eq!(parts[1], "1700000000000");
        // "A portrait" encodes to "QSBwb3J0cmFpdA"
        assert!(parts[2].starts_with("QSBwb3J0_"));
        assert_eq!(id.timestamp_ms(), Some(1_700_000_000_000));
        assert_eq!(id.asset_type(), Some(AssetType::Image));
    }

    #[test]
    fn test_no_prompt_leaves_hash_empty() {
        let id = AssetId::generate_at(AssetType::Video, None, 42);
        assert!(id.as_str().starts_with("video_42__"));
        assert_eq!(id.as_str().len(), "video_42__".len() + RANDOM_SUFFIX_LEN);

        let empty = AssetId::generate_at(AssetType::Video, Some(""), 42);
        assert!(empty.as_str().starts_with("video_42__"));
    }

    #[test]
    fn test_generated_ids_are_parseable_and_distinct() {
        let a = AssetId::generate(AssetType::Audio, Some("same prompt / with ? symbols"));
        let b = AssetId::generate(AssetType::Audio, Some("same prompt / with ? symbols"));

        assert_ne!(a, b);
        assert_eq!(AssetId::parse(a.as_str()).unwrap(), a);
    }

    #[test]
    fn test_parse_rejects_unsafe_ids() {
        assert!(AssetId::parse("").is_err());
        assert!(AssetId::parse("../etc/passwd").is_err());
        assert!(AssetId::parse("image_1_a/b_c").is_err());
        assert!(AssetId::parse("image_1_ab.cd_ef").is_err());
        assert!(AssetId::parse("x".repeat(MAX_ID_LEN + 1)).is_err());
        assert!(AssetId::parse("image_1_-_Zz09").is_ok());
    }

    #[test]
    fn test_serde_validates() {
        let id: AssetId = serde_json::from_str("\"audio_1_abc_def\"").unwrap();
        assert_eq!(id.as_str(), "audio_1_abc_def");
        assert!(serde_json::from_str::<AssetId>("\"a/b\"").is_err());
    }
}
