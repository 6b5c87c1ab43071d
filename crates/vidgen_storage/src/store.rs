//! Storage trait definition.

use crate::{AssetId, AssetMetadata, AssetType, NewAsset, StoredAsset};
use vidgen_error::VidgenResult;

/// Trait for pluggable asset store backends.
///
/// A store holds two keyspaces: blobs keyed by [`AssetId`], and a single
/// [`Manifest`](crate::Manifest) record indexing every blob's metadata.
/// Every asset in the manifest has a blob and vice versa.
///
/// Stores have an explicit lifecycle. Operations fail with
/// `NotInitialized` before [`init`](AssetStore::init) and with `Closed`
/// after [`close`](AssetStore::close).
#[async_trait::async_trait]
pub trait AssetStore: Send + Sync {
    /// Prepare both keyspaces.
    ///
    /// Idempotent. Concurrent callers converge on one initialized store.
    async fn init(&self) -> VidgenResult<()>;

    /// End the store's lifecycle. A later `init` reopens it.
    async fn close(&self) -> VidgenResult<()>;

    /// Write `blob` under `id`, then upsert its metadata into the manifest.
    ///
    /// `size` and `created_at` are derived here. An existing entry with the
    /// same id keeps its manifest position and is replaced.
    ///
    /// # Errors
    ///
    /// A storage write error if the backend rejects either step.
    async fn store_asset(
        &self,
        id: &AssetId,
        blob: &[u8],
        asset: NewAsset,
    ) -> VidgenResult<AssetMetadata>;

    /// Blob and metadata for `id`, or `None` if absent.
    async fn get_asset(&self, id: &AssetId) -> VidgenResult<Option<StoredAsset>>;

    /// Remove the blob, then the manifest entry.
    ///
    /// The manifest is only updated once the blob is gone. Unknown ids
    /// succeed without changes.
    async fn delete_asset(&self, id: &AssetId) -> VidgenResult<()>;

    /// Every asset's metadata in manifest order. Never reads blobs.
    async fn get_all_assets(&self) -> VidgenResult<Vec<AssetMetadata>>;

    /// Empty both keyspaces.
    async fn clear_all(&self) -> VidgenResult<()>;

    /// Backend name (e.g., "filesystem", "memory").
    fn backend_name(&self) -> &'static str;

    /// Metadata of every asset with the given type, in manifest order.
    async fn assets_of_type(&self, asset_type: AssetType) -> VidgenResult<Vec<AssetMetadata>> {
        Ok(self
            .get_all_assets()
            .await?
            .into_iter()
            .filter(|a| a.asset_type == asset_type)
            .collect())
    }

    /// The asset of the given type with the greatest `created_at`.
    async fn newest_of_type(&self, asset_type: AssetType) -> VidgenResult<Option<AssetMetadata>> {
        Ok(self
            .assets_of_type(asset_type)
            .await?
            .into_iter()
            .max_by_key(|a| a.created_at))
    }
}
