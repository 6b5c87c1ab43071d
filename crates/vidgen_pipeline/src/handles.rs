//! Reference-counted display handles.
//!
//! A display handle is a `blob:vidgen/<uuid>` URL that resolves to an asset's
//! bytes for as long as someone holds it. Each asset has at most one live URL;
//! acquiring it again bumps a reference count, and the URL is revoked when the
//! count drops to zero.

use derive_getters::Getters;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use vidgen_storage::AssetId;

/// URL scheme prefix for display handles.
pub const HANDLE_PREFIX: &str = "blob:vidgen/";

/// A locally dereferenceable reference to an asset's bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Getters)]
pub struct DisplayHandle {
    /// `blob:vidgen/<uuid>` URL
    url: String,
    /// Asset the URL resolves to
    asset_id: AssetId,
}

#[derive(Debug)]
struct Entry {
    url: String,
    blob: Arc<Vec<u8>>,
    refs: usize,
}

#[derive(Debug, Default)]
struct Registry {
    by_asset: HashMap<AssetId, Entry>,
    by_url: HashMap<String, AssetId>,
}

/// Registry of live display handles. Clones share the same registry.
#[derive(Debug, Clone, Default)]
pub struct DisplayHandles {
    inner: Arc<Mutex<Registry>>,
}

impl DisplayHandles {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        // No update panics midway, so a poisoned registry is still consistent
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Take a reference to the asset's URL, minting one if none is live.
    ///
    /// The registry keeps the most recent bytes passed for the asset.
    pub fn acquire(&self, asset_id: &AssetId, blob: impl Into<Arc<Vec<u8>>>) -> DisplayHandle {
        let blob = blob.into();
        let mut registry = self.lock();

        if let Some(entry) = registry.by_asset.get_mut(asset_id) {
            entry.refs += 1;
            entry.blob = blob;
            tracing::trace!(asset_id = %asset_id, refs = entry.refs, "Reused display handle");
            return DisplayHandle {
                url: entry.url.clone(),
                asset_id: asset_id.clone(),
            };
        }

        let url = format!("{}{}", HANDLE_PREFIX, uuid::Uuid::new_v4());
        registry.by_url.insert(url.clone(), asset_id.clone());
        registry.by_asset.insert(
            asset_id.clone(),
            Entry {
                url: url.clone(),
                blob,
                refs: 1,
            },
        );
        tracing::debug!(asset_id = %asset_id, url = %url, "Minted display handle");

        DisplayHandle {
            url,
            asset_id: asset_id.clone(),
        }
    }

    /// Drop one reference. Returns `true` if the URL was revoked.
    pub fn release(&self, handle: &DisplayHandle) -> bool {
        let mut registry = self.lock();
        let Some(entry) = registry.by_asset.get_mut(&handle.asset_id) else {
            return false;
        };
        if entry.url != handle.url {
            return false;
        }

        entry.refs = entry.refs.saturating_sub(1);
        if entry.refs > 0 {
            return false;
        }

        registry.by_asset.remove(&handle.asset_id);
        registry.by_url.remove(&handle.url);
        tracing::debug!(asset_id = %handle.asset_id, "Revoked display handle");
        true
    }

    /// Revoke the asset's URL regardless of outstanding references.
    pub fn revoke_asset(&self, asset_id: &AssetId) -> bool {
        let mut registry = self.lock();
        match registry.by_asset.remove(asset_id) {
            Some(entry) => {
                registry.by_url.remove(&entry.url);
                tracing::debug!(asset_id = %asset_id, refs = entry.refs, "Revoked display handle");
                true
            }
            None => false,
        }
    }

    /// Bytes behind a live URL.
    pub fn resolve(&self, url: &str) -> Option<Arc<Vec<u8>>> {
        let registry = self.lock();
        let asset_id = registry.by_url.get(url)?;
        registry.by_asset.get(asset_id).map(|e| Arc::clone(&e.blob))
    }

    /// Outstanding references to the asset's URL.
    pub fn ref_count(&self, asset_id: &AssetId) -> usize {
        self.lock().by_asset.get(asset_id).map_or(0, |e| e.refs)
    }

    /// Number of live URLs.
    pub fn live_count(&self) -> usize {
        self.lock().by_url.len()
    }

    /// Revoke every URL.
    pub fn clear(&self) {
        let mut registry = self.lock();
        let revoked = registry.by_url.len();
        registry.by_asset.clear();
        registry.by_url.clear();
        if revoked > 0 {
            tracing::debug!(revoked, "Revoked all display handles");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vidgen_storage::AssetType;

    #[test]
    fn test_reference_counting() {
        let handles = DisplayHandles::new();
        let id = AssetId::generate(AssetType::Image, None);

        let first = handles.acquire(&id, b"v1".to_vec());
        let second = handles.acquire(&id, b"v1".to_vec());
        assert_eq!(first, second);
        assert!(first.url().starts_with(HANDLE_PREFIX));
        assert_eq!(handles.ref_count(&id), 2);

        assert!(!handles.release(&first));
        assert_eq!(handles.resolve(second.url()).unwrap().as_slice(), b"v1");
        assert!(handles.release(&second));
        assert!(handles.resolve(second.url()).is_none());
        assert_eq!(handles.live_count(), 0);
    }

    #[test]
    fn test_stale_handle_does_not_release_new_url() {
        let handles = DisplayHandles::new();
        let id = AssetId::generate(AssetType::Audio, None);

        let stale = handles.acquire(&id, b"a".to_vec());
        assert!(handles.revoke_asset(&id));
        let fresh = handles.acquire(&id, b"a".to_vec());
        assert_ne!(stale.url(), fresh.url());

        assert!(!handles.release(&stale));
        assert_eq!(handles.ref_count(&id), 1);
    }

    #[test]
    fn test_clear_revokes_everything() {
        let handles = DisplayHandles::new();
        for asset_type in AssetType::SELECTABLE {
            handles.acquire(&AssetId::generate(asset_type, None), vec![0u8]);
        }
        assert_eq!(handles.live_count(), 3);
        handles.clear();
        assert_eq!(handles.live_count(), 0);
    }
}
