//! Local asset storage for vidgen.
//!
//! This crate persists generated artifacts (images, audio, video) as blobs
//! keyed by [`AssetId`], alongside a [`Manifest`] that indexes their metadata
//! so listings never scan the blob keyspace.
//!
//! # Features
//!
//! - **Explicit lifecycle**: stores are constructed, `init`ed and `close`d by
//!   their owner
//! - **Pluggable backends**: [`AssetStore`] trait with filesystem and
//!   in-memory implementations
//! - **Repair on open**: the filesystem backend reconciles manifest and blobs
//!   at `init`
//!
//! # Example
//!
//! ```rust
//! use vidgen_storage::{AssetId, AssetStore, AssetType, FileSystemAssetStore, NewAsset};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = FileSystemAssetStore::new("/tmp/vidgen");
//! store.init().await?;
//!
//! let id = AssetId::generate(AssetType::Image, Some("A portrait"));
//! let asset = NewAsset::new(AssetType::Image, "Portrait").with_prompt("A portrait");
//! let metadata = store.store_asset(&id, b"png bytes", asset).await?;
//! assert_eq!(metadata.size, 9);
//!
//! let stored = store.get_asset(&id).await?.expect("just stored");
//! assert_eq!(stored.blob, b"png bytes");
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod asset_type;
mod filesystem;
mod id;
mod manifest;
mod memory;
mod metadata;
mod store;

pub use asset_type::AssetType;
pub use filesystem::{FileSystemAssetStore, RepairReport};
pub use id::AssetId;
pub use manifest::{MANIFEST_VERSION, Manifest};
pub use memory::InMemoryAssetStore;
pub use metadata::{AssetMetadata, NewAsset, StoredAsset};
pub use store::AssetStore;
pub use vidgen_error::{StorageError, StorageErrorKind};

/// Current time in epoch milliseconds.
pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
