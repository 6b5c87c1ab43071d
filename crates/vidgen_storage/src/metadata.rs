//! Asset metadata types.

use crate::{AssetId, AssetType};
use serde::{Deserialize, Serialize};

/// Metadata record for a stored asset.
///
/// `size` and `created_at` are derived by the store at write time and are
/// never supplied by callers (see [`NewAsset`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetMetadata {
    /// Primary key
    pub id: AssetId,
    /// Kind of content
    #[serde(rename = "type")]
    pub asset_type: AssetType,
    /// Human-readable label
    pub name: String,
    /// Prompt or description the asset was generated from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    /// Model that produced the asset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Creation time in epoch milliseconds
    pub created_at: i64,
    /// Blob length in bytes
    pub size: u64,
}

impl AssetMetadata {
    pub(crate) fn from_new(id: AssetId, asset: NewAsset, size: u64, created_at: i64) -> Self {
        Self {
            id,
            asset_type: asset.asset_type,
            name: asset.name,
            prompt: asset.prompt,
            model: asset.model,
            created_at,
            size,
        }
    }
}

/// Caller-supplied part of an asset's metadata.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NewAsset {
    /// Kind of content
    pub asset_type: AssetType,
    /// Human-readable label
    pub name: String,
    /// Prompt or description
    pub prompt: Option<String>,
    /// Producing model
    pub model: Option<String>,
}

impl NewAsset {
    /// Describe a new asset with no prompt or model.
    pub fn new(asset_type: AssetType, name: impl Into<String>) -> Self {
        Self {
            asset_type,
            name: name.into(),
            prompt: None,
            model: None,
        }
    }

    /// Set the prompt.
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    /// Set the producing model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// Blob and metadata returned together by `get_asset`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAsset {
    /// Raw content
    pub blob: Vec<u8>,
    /// Metadata record
    pub metadata: AssetMetadata,
}
