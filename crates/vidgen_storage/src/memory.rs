//! In-memory asset store.
//!
//! HashMap-backed store for tests and throwaway sessions. Data survives
//! `close`/`init` cycles but is lost when the last clone is dropped.

use crate::{AssetId, AssetMetadata, AssetStore, Manifest, NewAsset, StoredAsset, now_millis};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use vidgen_error::{StorageError, StorageErrorKind, VidgenResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Uninitialized,
    Open,
    Closed,
}

#[derive(Debug)]
struct MemoryState {
    lifecycle: Lifecycle,
    blobs: HashMap<AssetId, Vec<u8>>,
    manifest: Manifest,
}

impl MemoryState {
    fn check_open(&self) -> Result<(), StorageError> {
        match self.lifecycle {
            Lifecycle::Open => Ok(()),
            Lifecycle::Uninitialized => Err(StorageError::new(StorageErrorKind::NotInitialized)),
            Lifecycle::Closed => Err(StorageError::new(StorageErrorKind::Closed)),
        }
    }

    fn used_bytes(&self) -> u64 {
        self.blobs.values().map(|b| b.len() as u64).sum()
    }
}

/// In-memory asset store.
///
/// Clones share the same underlying state.
///
/// # Example
///
/// ```
/// use vidgen_storage::{AssetId, AssetStore, AssetType, InMemoryAssetStore, NewAsset};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let store = InMemoryAssetStore::new();
/// store.init().await?;
///
/// let id = AssetId::generate(AssetType::Audio, None);
/// store.store_asset(&id, b"mp3", NewAsset::new(AssetType::Audio, "clip")).await?;
/// assert_eq!(store.get_all_assets().await?.len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct InMemoryAssetStore {
    state: Arc<RwLock<MemoryState>>,
    quota: Option<u64>,
}

impl InMemoryAssetStore {
    /// Create an empty, uninitialized store with no size limit.
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(MemoryState {
                lifecycle: Lifecycle::Uninitialized,
                blobs: HashMap::new(),
                manifest: Manifest::empty(),
            })),
            quota: None,
        }
    }

    /// Limit the total blob bytes the store accepts.
    pub fn with_quota(mut self, bytes: u64) -> Self {
        self.quota = Some(bytes);
        self
    }

    /// Total bytes currently held.
    pub async fn used_bytes(&self) -> u64 {
        self.state.read().await.used_bytes()
    }

    /// Number of blobs held, independent of the manifest.
    pub async fn blob_count(&self) -> usize {
        self.state.read().await.blobs.len()
    }
}

impl Default for InMemoryAssetStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl AssetStore for InMemoryAssetStore {
    async fn init(&self) -> VidgenResult<()> {
        let mut state = self.state.write().await;
        if state.lifecycle != Lifecycle::Open {
            state.lifecycle = Lifecycle::Open;
            tracing::debug!("Opened in-memory asset store");
        }
        Ok(())
    }

    async fn close(&self) -> VidgenResult<()> {
        self.state.write().await.lifecycle = Lifecycle::Closed;
        Ok(())
    }

    #[tracing::instrument(skip(self, blob, asset), fields(id = %id, size = blob.len()))]
    async fn store_asset(
        &self,
        id: &AssetId,
        blob: &[u8],
        asset: NewAsset,
    ) -> VidgenResult<AssetMetadata> {
        let mut state = self.state.write().await;
        state.check_open()?;

        if let Some(quota) = self.quota {
            let replaced = state.blobs.get(id).map(|b| b.len() as u64).unwrap_or(0);
            let available = quota.saturating_sub(state.used_bytes() - replaced);
            let requested = blob.len() as u64;
            if requested > available {
                tracing::warn!(requested, available, "Quota exceeded");
                return Err(StorageError::new(StorageErrorKind::QuotaExceeded {
                    requested,
                    available,
                })
                .into());
            }
        }

        let metadata = AssetMetadata::from_new(id.clone(), asset, blob.len() as u64, now_millis());
        state.blobs.insert(id.clone(), blob.to_vec());
        state.manifest.upsert(metadata.clone());

        tracing::debug!("Stored asset in memory");
        Ok(metadata)
    }

    async fn get_asset(&self, id: &AssetId) -> VidgenResult<Option<StoredAsset>> {
        let state = self.state.read().await;
        state.check_open()?;

        let asset = state
            .manifest
            .get(id)
            .cloned()
            .zip(state.blobs.get(id).cloned())
            .map(|(metadata, blob)| StoredAsset { blob, metadata });
        Ok(asset)
    }

    async fn delete_asset(&self, id: &AssetId) -> VidgenResult<()> {
        let mut state = self.state.write().await;
        state.check_open()?;

        state.blobs.remove(id);
        state.manifest.remove(id);
        Ok(())
    }

    async fn get_all_assets(&self) -> VidgenResult<Vec<AssetMetadata>> {
        let state = self.state.read().await;
        state.check_open()?;
        Ok(state.manifest.assets.clone())
    }

    async fn clear_all(&self) -> VidgenResult<()> {
        let mut state = self.state.write().await;
        state.check_open()?;

        state.blobs.clear();
        state.manifest = Manifest::empty();
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
