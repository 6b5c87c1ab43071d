//! The manifest index over all stored assets.

use crate::{AssetId, AssetMetadata, AssetType, now_millis};
use serde::{Deserialize, Serialize};

/// Current manifest schema version.
pub const MANIFEST_VERSION: u32 = 1;

/// Denormalized listing of every asset's metadata.
///
/// Entries keep insertion order. Replacing an entry keeps its position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Schema version
    pub version: u32,
    /// Asset metadata in insertion order
    pub assets: Vec<AssetMetadata>,
    /// Last mutation time in epoch milliseconds
    pub last_updated: i64,
}

impl Manifest {
    /// An empty manifest at the current schema version.
    pub fn empty() -> Self {
        Self {
            version: MANIFEST_VERSION,
            assets: Vec::new(),
            last_updated: now_millis(),
        }
    }

    /// Insert or replace an entry. Returns `true` if an entry was replaced.
    pub fn upsert(&mut self, metadata: AssetMetadata) -> bool {
        let replaced = match self.assets.iter_mut().find(|a| a.id == metadata.id) {
            Some(existing) => {
                *existing = metadata;
                true
            }
            None => {
                self.assets.push(metadata);
                false
            }
        };
        self.touch();
        replaced
    }

    /// Remove an entry, returning it if present.
    pub fn remove(&mut self, id: &AssetId) -> Option<AssetMetadata> {
        let position = self.assets.iter().position(|a| &a.id == id)?;
        let removed = self.assets.remove(position);
        self.touch();
        Some(removed)
    }

    /// Look up an entry.
    pub fn get(&self, id: &AssetId) -> Option<&AssetMetadata> {
        self.assets.iter().find(|a| &a.id == id)
    }

    /// Whether an entry exists.
    pub fn contains(&self, id: &AssetId) -> bool {
        self.get(id).is_some()
    }

    /// Entries of one type, in insertion order.
    pub fn of_type(&self, asset_type: AssetType) -> impl Iterator<Item = &AssetMetadata> {
        self.assets.iter().filter(move |a| a.asset_type == asset_type)
    }

    /// Entry of one type with the greatest `created_at`.
    ///
    /// On equal timestamps the later-inserted entry wins.
    pub fn newest_of_type(&self, asset_type: AssetType) -> Option<&AssetMetadata> {
        self.of_type(asset_type).max_by_key(|a| a.created_at)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// Whether the manifest has no entries.
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    fn touch(&mut self) {
        self.last_updated = now_millis();
    }
}

impl Default for Manifest {
    fn default() -> Self {
        Self::empty()
    }
}
