//! Filesystem-based asset store.
//!
//! Layout under the store root:
//!
//! ```text
//! {root}/
//! ├── manifest.json            (manifest keyspace, single record)
//! └── assets/                  (blob keyspace)
//!     ├── {id}.blob            (raw content)
//!     └── {id}.json            (metadata sidecar, used by the repair pass)
//! ```
//!
//! Every file is written to `{name}.tmp` and renamed into place. All
//! operations run under one lock with exclusive writers, so readers never
//! observe a new blob with old metadata or the reverse.

use crate::{
    AssetId, AssetMetadata, AssetStore, MANIFEST_VERSION, Manifest, NewAsset, StoredAsset,
    now_millis,
};
use std::collections::{HashMap, HashSet};
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use vidgen_error::{StorageError, StorageErrorKind, VidgenResult};

const ASSETS_DIR: &str = "assets";
const MANIFEST_FILE: &str = "manifest.json";
const BLOB_EXT: &str = "blob";
const SIDECAR_EXT: &str = "json";
const TEMP_EXT: &str = "tmp";

/// What the repair pass changed while opening a store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairReport {
    /// Manifest entries dropped because their blob was missing
    pub dangling_entries: Vec<AssetId>,
    /// Blobs re-added to the manifest from their sidecar
    pub reindexed: Vec<AssetId>,
    /// Blobs or sidecars deleted because they could not be indexed
    pub orphans_removed: Vec<AssetId>,
    /// Interrupted writes cleaned up
    pub temp_files_removed: usize,
    /// Whether the manifest file was unreadable and rebuilt from sidecars
    pub manifest_rebuilt: bool,
}

impl RepairReport {
    /// Whether the store was already consistent.
    pub fn is_clean(&self) -> bool {
        self.dangling_entries.is_empty()
            && self.reindexed.is_empty()
            && self.orphans_removed.is_empty()
            && self.temp_files_removed == 0
            && !self.manifest_rebuilt
    }
}

#[derive(Debug)]
enum StoreState {
    Uninitialized,
    Open {
        manifest: Manifest,
        repair: RepairReport,
    },
    Closed,
}

impl StoreState {
    fn manifest(&self) -> Result<&Manifest, StorageError> {
        match self {
            StoreState::Open { manifest, .. } => Ok(manifest),
            StoreState::Uninitialized => Err(StorageError::new(StorageErrorKind::NotInitialized)),
            StoreState::Closed => Err(StorageError::new(StorageErrorKind::Closed)),
        }
    }

    fn manifest_mut(&mut self) -> Result<&mut Manifest, StorageError> {
        match self {
            StoreState::Open { manifest, .. } => Ok(manifest),
            StoreState::Uninitialized => Err(StorageError::new(StorageErrorKind::NotInitialized)),
            StoreState::Closed => Err(StorageError::new(StorageErrorKind::Closed)),
        }
    }
}

/// Asset store backed by a local directory.
///
/// Construction does not touch the disk; call [`AssetStore::init`] first.
#[derive(Debug)]
pub struct FileSystemAssetStore {
    root: PathBuf,
    state: RwLock<StoreState>,
}

impl FileSystemAssetStore {
    /// Create a store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            state: RwLock::new(StoreState::Uninitialized),
        }
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Outcome of the repair pass run by the most recent `init`.
    pub async fn repair_report(&self) -> Option<RepairReport> {
        match &*self.state.read().await {
            StoreState::Open { repair, .. } => Some(repair.clone()),
            _ => None,
        }
    }

    /// Path of the blob for `id`.
    ///
    /// Exposed so callers can hand the file to an external player.
    pub fn blob_path(&self, id: &AssetId) -> PathBuf {
        self.assets_dir().join(format!("{}.{}", id.as_str(), BLOB_EXT))
    }

    fn assets_dir(&self) -> PathBuf {
        self.root.join(ASSETS_DIR)
    }

    fn manifest_path(&self) -> PathBuf {
        self.root.join(MANIFEST_FILE)
    }

    fn sidecar_path(&self, id: &AssetId) -> PathBuf {
        self.assets_dir().join(format!("{}.{}", id.as_str(), SIDECAR_EXT))
    }

    /// Write via `{path}.tmp` and rename for atomicity.
    async fn write_atomic(path: &Path, data: &[u8]) -> Result<(), StorageError> {
        let mut temp: OsString = path.as_os_str().to_owned();
        temp.push(".");
        temp.push(TEMP_EXT);
        let temp_path = PathBuf::from(temp);

        tokio::fs::write(&temp_path, data).await.map_err(|e| {
            StorageError::new(StorageErrorKind::Write(format!(
                "{}: {}",
                temp_path.display(),
                e
            )))
        })?;

        tokio::fs::rename(&temp_path, path).await.map_err(|e| {
            StorageError::new(StorageErrorKind::Write(format!(
                "rename {} to {}: {}",
                temp_path.display(),
                path.display(),
                e
            )))
        })
    }

    /// Remove a file, treating "already gone" as success.
    async fn remove_if_exists(path: &Path) -> Result<bool, StorageError> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::new(StorageErrorKind::Write(format!(
                "delete {}: {}",
                path.display(),
                e
            )))),
        }
    }

    async fn persist_manifest(&self, manifest: &Manifest) -> Result<(), StorageError> {
        let json = serde_json::to_vec_pretty(manifest)
            .map_err(|e| StorageError::new(StorageErrorKind::Manifest(e.to_string())))?;
        Self::write_atomic(&self.manifest_path(), &json).await
    }

    /// Read the manifest file. `Ok(None)` means it exists but is unreadable.
    async fn load_manifest(&self) -> Result<Option<Manifest>, StorageError> {
        let path = self.manifest_path();
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No manifest yet, starting empty");
                return Ok(Some(Manifest::empty()));
            }
            Err(e) => {
                return Err(StorageError::new(StorageErrorKind::Read(format!(
                    "{}: {}",
                    path.display(),
                    e
                ))));
            }
        };

        let manifest: Manifest = match serde_json::from_slice(&bytes) {
            Ok(manifest) => manifest,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Manifest unreadable, rebuilding from sidecars");
                return Ok(None);
            }
        };

        if manifest.version > MANIFEST_VERSION {
            return Err(StorageError::new(StorageErrorKind::Manifest(format!(
                "schema version {} is newer than supported version {}",
                manifest.version, MANIFEST_VERSION
            ))));
        }

        Ok(Some(manifest))
    }

    /// Reconcile the manifest with the blob keyspace.
    async fn repair(
        &self,
        mut manifest: Manifest,
        report: &mut RepairReport,
    ) -> Result<Manifest, StorageError> {
        let dir = self.assets_dir();
        let mut entries = tokio::fs::read_dir(&dir).await.map_err(|e| {
            StorageError::new(StorageErrorKind::Read(format!("{}: {}", dir.display(), e)))
        })?;

        let mut blobs = HashSet::new();
        let mut sidecars = HashSet::new();

        while let Some(entry) = entries.next_entry().await.map_err(|e| {
            StorageError::new(StorageErrorKind::Read(format!("{}: {}", dir.display(), e)))
        })? {
            let path = entry.path();
            let extension = path.extension().and_then(|e| e.to_str()).unwrap_or_default();

            if extension == TEMP_EXT {
                Self::remove_if_exists(&path).await?;
                report.temp_files_removed += 1;
                continue;
            }

            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let Ok(id) = AssetId::parse(stem) else {
                tracing::warn!(path = %path.display(), "Ignoring unrecognized file in blob directory");
                continue;
            };

            match extension {
                BLOB_EXT => {
                    blobs.insert(id);
                }
                SIDECAR_EXT => {
                    sidecars.insert(id);
                }
                _ => {}
            }
        }

        // Manifest entries whose blob is gone
        let dangling: Vec<AssetId> = manifest
            .assets
            .iter()
            .filter(|a| !blobs.contains(&a.id))
            .map(|a| a.id.clone())
            .collect();
        for id in dangling {
            manifest.remove(&id);
            if sidecars.remove(&id) {
                Self::remove_if_exists(&self.sidecar_path(&id)).await?;
            }
            report.dangling_entries.push(id);
        }

        // Blobs missing from the manifest
        let mut recovered: Vec<AssetMetadata> = Vec::new();
        let unindexed: Vec<AssetId> = blobs
            .iter()
            .filter(|id| !manifest.contains(id))
            .cloned()
            .collect();
        for id in unindexed {
            match self.read_sidecar(&id, sidecars.contains(&id)).await {
                Some(mut metadata) => {
                    if let Ok(file) = tokio::fs::metadata(self.blob_path(&id)).await {
                        metadata.size = file.len();
                    }
                    recovered.push(metadata);
                }
                None => {
                    Self::remove_if_exists(&self.blob_path(&id)).await?;
                    Self::remove_if_exists(&self.sidecar_path(&id)).await?;
                    report.orphans_removed.push(id);
                }
            }
        }
        recovered.sort_by_key(|a| a.created_at);
        for metadata in recovered {
            report.reindexed.push(metadata.id.clone());
            manifest.upsert(metadata);
        }

        // Sidecars with no blob
        for id in sidecars.difference(&blobs) {
            Self::remove_if_exists(&self.sidecar_path(id)).await?;
            report.orphans_removed.push(id.clone());
        }

        Ok(manifest)
    }

    async fn read_sidecar(&self, id: &AssetId, exists: bool) -> Option<AssetMetadata> {
        if !exists {
            return None;
        }
        let bytes = tokio::fs::read(self.sidecar_path(id)).await.ok()?;
        let metadata: AssetMetadata = serde_json::from_slice(&bytes).ok()?;
        (&metadata.id == id).then_some(metadata)
    }
}

#[async_trait::async_trait]
impl AssetStore for FileSystemAssetStore {
    #[tracing::instrument(skip(self), fields(root = %self.root.display()))]
    async fn init(&self) -> VidgenResult<()> {
        let mut state = self.state.write().await;
        if matches!(*state, StoreState::Open { .. }) {
            tracing::debug!("Store already initialized");
            return Ok(());
        }

        let dir = self.assets_dir();
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                dir.display(),
                e
            )))
        })?;

        let mut report = RepairReport::default();
        let mut manifest_temp: OsString = self.manifest_path().into_os_string();
        manifest_temp.push(".");
        manifest_temp.push(TEMP_EXT);
        if Self::remove_if_exists(Path::new(&manifest_temp)).await? {
            report.temp_files_removed += 1;
        }

        let loaded = match self.load_manifest().await? {
            Some(manifest) => manifest,
            None => {
                report.manifest_rebuilt = true;
                Manifest::empty()
            }
        };
        let mut manifest = self.repair(loaded, &mut report).await?;
        manifest.version = MANIFEST_VERSION;

        if !report.is_clean() {
            self.persist_manifest(&manifest).await?;
            tracing::warn!(
                dangling = report.dangling_entries.len(),
                reindexed = report.reindexed.len(),
                orphans = report.orphans_removed.len(),
                temp_files = report.temp_files_removed,
                rebuilt = report.manifest_rebuilt,
                "Repaired asset store"
            );
        }

        tracing::info!(assets = manifest.len(), "Opened filesystem asset store");
        *state = StoreState::Open {
            manifest,
            repair: report,
        };
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(root = %self.root.display()))]
    async fn close(&self) -> VidgenResult<()> {
        let mut state = self.state.write().await;
        *state = StoreState::Closed;
        tracing::info!("Closed filesystem asset store");
        Ok(())
    }

    #[tracing::instrument(skip(self, blob, asset), fields(id = %id, size = blob.len(), asset_type = %asset.asset_type))]
    async fn store_asset(
        &self,
        id: &AssetId,
        blob: &[u8],
        asset: NewAsset,
    ) -> VidgenResult<AssetMetadata> {
        let mut state = self.state.write().await;
        let manifest = state.manifest_mut()?;

        let metadata = AssetMetadata::from_new(id.clone(), asset, blob.len() as u64, now_millis());
        let sidecar = serde_json::to_vec(&metadata)
            .map_err(|e| StorageError::new(StorageErrorKind::Manifest(e.to_string())))?;

        Self::write_atomic(&self.blob_path(id), blob).await?;
        Self::write_atomic(&self.sidecar_path(id), &sidecar).await?;

        let mut updated = manifest.clone();
        let replaced = updated.upsert(metadata.clone());
        self.persist_manifest(&updated).await?;
        *manifest = updated;

        tracing::info!(replaced, created_at = metadata.created_at, "Stored asset");
        Ok(metadata)
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn get_asset(&self, id: &AssetId) -> VidgenResult<Option<StoredAsset>> {
        let state = self.state.read().await;
        let manifest = state.manifest()?;

        let Some(metadata) = manifest.get(id).cloned() else {
            tracing::debug!("Asset not in manifest");
            return Ok(None);
        };

        let path = self.blob_path(id);
        match tokio::fs::read(&path).await {
            Ok(blob) => {
                tracing::debug!(size = blob.len(), "Retrieved asset");
                Ok(Some(StoredAsset { blob, metadata }))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "Manifest entry has no blob");
                Ok(None)
            }
            Err(e) => Err(StorageError::new(StorageErrorKind::Read(format!(
                "{}: {}",
                path.display(),
                e
            )))
            .into()),
        }
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn delete_asset(&self, id: &AssetId) -> VidgenResult<()> {
        let mut state = self.state.write().await;
        let manifest = state.manifest_mut()?;

        let removed_blob = Self::remove_if_exists(&self.blob_path(id)).await?;
        Self::remove_if_exists(&self.sidecar_path(id)).await?;

        if manifest.contains(id) {
            let mut updated = manifest.clone();
            updated.remove(id);
            self.persist_manifest(&updated).await?;
            *manifest = updated;
            tracing::info!(removed_blob, "Deleted asset");
        } else {
            tracing::debug!(removed_blob, "Asset not in manifest, nothing to delete");
        }
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn get_all_assets(&self) -> VidgenResult<Vec<AssetMetadata>> {
        let state = self.state.read().await;
        Ok(state.manifest()?.assets.clone())
    }

    #[tracing::instrument(skip(self), fields(root = %self.root.display()))]
    async fn clear_all(&self) -> VidgenResult<()> {
        let mut state = self.state.write().await;
        let manifest = state.manifest_mut()?;

        let dir = self.assets_dir();
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                return Err(StorageError::new(StorageErrorKind::Write(format!(
                    "clear {}: {}",
                    dir.display(),
                    e
                )))
                .into());
            }
        }
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                dir.display(),
                e
            )))
        })?;

        let empty = Manifest::empty();
        self.persist_manifest(&empty).await?;
        let cleared = manifest.len();
        *manifest = empty;

        tracing::info!(cleared, "Cleared asset store");
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "filesystem"
    }
}

impl FileSystemAssetStore {
    /// Total bytes of all blobs, according to the manifest.
    pub async fn total_size(&self) -> VidgenResult<u64> {
        let state = self.state.read().await;
        Ok(state.manifest()?.assets.iter().map(|a| a.size).sum())
    }

    /// Count of assets per type, according to the manifest.
    pub async fn counts(&self) -> VidgenResult<HashMap<crate::AssetType, usize>> {
        let state = self.state.read().await;
        let mut counts = HashMap::new();
        for asset in &state.manifest()?.assets {
            *counts.entry(asset.asset_type).or_insert(0) += 1;
        }
        Ok(counts)
    }
}
