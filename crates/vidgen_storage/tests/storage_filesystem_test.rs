//! Tests for the filesystem asset store.

use std::collections::HashSet;
use std::sync::Arc;
use tempfile::TempDir;
use vidgen_error::{StorageErrorKind, VidgenErrorKind};
use vidgen_storage::{
    AssetId, AssetMetadata, AssetStore, AssetType, FileSystemAssetStore, NewAsset,
};

async fn open_store(temp_dir: &TempDir) -> FileSystemAssetStore {
    let store = FileSystemAssetStore::new(temp_dir.path());
    store.init().await.unwrap();
    store
}

async fn put(
    store: &FileSystemAssetStore,
    asset_type: AssetType,
    data: &[u8],
) -> AssetMetadata {
    let id = AssetId::generate(asset_type, Some("prompt"));
    store
        .store_asset(&id, data, NewAsset::new(asset_type, "test").with_model("m"))
        .await
        .unwrap()
}

fn storage_kind(err: &vidgen_error::VidgenError) -> StorageErrorKind {
    match err.kind() {
        VidgenErrorKind::Storage(e) => e.kind.clone(),
        other => panic!("expected storage error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_store_and_get() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir).await;

    let data = b"Hello, world!";
    let id = AssetId::generate(AssetType::Image, Some("A portrait"));
    let before = chrono::Utc::now().timestamp_millis();
    let metadata = store
        .store_asset(
            &id,
            data,
            NewAsset::new(AssetType::Image, "Portrait")
                .with_prompt("A portrait")
                .with_model("dall-e-3"),
        )
        .await
        .unwrap();
    let after = chrono::Utc::now().timestamp_millis();

    assert_eq!(metadata.id, id);
    assert_eq!(metadata.size, data.len() as u64);
    assert!(metadata.created_at >= before && metadata.created_at <= after);

    let stored = store.get_asset(&id).await.unwrap().unwrap();
    assert_eq!(stored.blob, data);
    assert_eq!(stored.metadata, metadata);
    assert_eq!(stored.metadata.prompt.as_deref(), Some("A portrait"));
}

#[tokio::test]
async fn test_get_unknown_returns_none() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir).await;

    let id = AssetId::generate(AssetType::Video, None);
    assert!(store.get_asset(&id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_delete_removes_blob_and_entry() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir).await;

    let kept = put(&store, AssetType::Audio, b"keep").await;
    let doomed = put(&store, AssetType::Audio, b"delete me").await;

    store.delete_asset(&doomed.id).await.unwrap();

    assert!(store.get_asset(&doomed.id).await.unwrap().is_none());
    assert!(!store.blob_path(&doomed.id).exists());
    let ids: Vec<AssetId> = store
        .get_all_assets()
        .await
        .unwrap()
        .into_iter()
        .map(|a| a.id)
        .collect();
    assert_eq!(ids, vec![kept.id]);
}

#[tokio::test]
async fn test_delete_unknown_is_noop() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir).await;
    put(&store, AssetType::Image, b"x").await;

    let unknown = AssetId::generate(AssetType::Image, None);
    store.delete_asset(&unknown).await.unwrap();
    assert_eq!(store.get_all_assets().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_filter_by_type() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir).await;

    let mut images = HashSet::new();
    images.insert(put(&store, AssetType::Image, b"i1").await.id);
    put(&store, AssetType::Audio, b"a1").await;
    images.insert(put(&store, AssetType::Image, b"i2").await.id);
    put(&store, AssetType::Video, b"v1").await;
    images.insert(put(&store, AssetType::Image, b"i3").await.id);

    let filtered: HashSet<AssetId> = store
        .assets_of_type(AssetType::Image)
        .await
        .unwrap()
        .into_iter()
        .map(|a| a.id)
        .collect();
    assert_eq!(filtered, images);
    assert!(store.assets_of_type(AssetType::Script).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_restore_same_id_replaces() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir).await;

    let first = put(&store, AssetType::Image, b"first").await;
    put(&store, AssetType::Audio, b"other").await;

    let replacement = store
        .store_asset(&first.id, b"second version", NewAsset::new(AssetType::Image, "v2"))
        .await
        .unwrap();

    let stored = store.get_asset(&first.id).await.unwrap().unwrap();
    assert_eq!(stored.blob, b"second version");
    assert_eq!(stored.metadata, replacement);
    assert_eq!(stored.metadata.name, "v2");
    assert_eq!(stored.metadata.size, 14);

    let all = store.get_all_assets().await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].id, first.id);
}

#[tokio::test]
async fn test_concurrent_readers_see_consistent_replacement() {
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(open_store(&temp_dir).await);
    let id = AssetId::generate(AssetType::Image, None);
    store
        .store_asset(&id, b"aaaa", NewAsset::new(AssetType::Image, "a"))
        .await
        .unwrap();

    let writer = {
        let store = Arc::clone(&store);
        let id = id.clone();
        tokio::spawn(async move {
            for round in 0..20 {
                let (data, name): (&[u8], &str) = if round % 2 == 0 {
                    (b"bbbbbbbb", "b")
                } else {
                    (b"aaaa", "a")
                };
                store
                    .store_asset(&id, data, NewAsset::new(AssetType::Image, name))
                    .await
                    .unwrap();
            }
        })
    };

    for _ in 0..50 {
        let stored = store.get_asset(&id).await.unwrap().unwrap();
        assert_eq!(stored.metadata.size, stored.blob.len() as u64);
        let expected: &[u8] = if stored.metadata.name == "a" { b"aaaa" } else { b"bbbbbbbb" };
        assert_eq!(stored.blob, expected);
    }
    writer.await.unwrap();
}

#[tokio::test]
async fn test_clear_all() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir).await;

    let image = put(&store, AssetType::Image, b"i").await;
    put(&store, AssetType::Audio, b"a").await;

    store.clear_all().await.unwrap();

    assert!(store.get_all_assets().await.unwrap().is_empty());
    assert!(store.get_asset(&image.id).await.unwrap().is_none());
    assert!(!store.blob_path(&image.id).exists());
}

#[tokio::test]
async fn test_persists_across_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let stored = {
        let store = open_store(&temp_dir).await;
        let stored = put(&store, AssetType::Video, b"mp4 bytes").await;
        store.close().await.unwrap();
        stored
    };

    let reopened = open_store(&temp_dir).await;
    let asset = reopened.get_asset(&stored.id).await.unwrap().unwrap();
    assert_eq!(asset.blob, b"mp4 bytes");
    assert_eq!(asset.metadata, stored);
    assert!(reopened.repair_report().await.unwrap().is_clean());
}

#[tokio::test]
async fn test_lifecycle_errors() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileSystemAssetStore::new(temp_dir.path());

    let err = store.get_all_assets().await.unwrap_err();
    assert_eq!(storage_kind(&err), StorageErrorKind::NotInitialized);

    store.init().await.unwrap();
    store.close().await.unwrap();

    let id = AssetId::generate(AssetType::Image, None);
    let err = store
        .store_asset(&id, b"x", NewAsset::new(AssetType::Image, "x"))
        .await
        .unwrap_err();
    assert_eq!(storage_kind(&err), StorageErrorKind::Closed);

    store.init().await.unwrap();
    assert!(store.get_all_assets().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_concurrent_init_converges() {
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(FileSystemAssetStore::new(temp_dir.path()));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.init().await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let metadata = put(&store, AssetType::Image, b"after init").await;
    store.init().await.unwrap();
    assert_eq!(store.get_all_assets().await.unwrap(), vec![metadata]);
}

#[tokio::test]
async fn test_repair_drops_dangling_entries() {
    let temp_dir = TempDir::new().unwrap();
    let (kept, lost) = {
        let store = open_store(&temp_dir).await;
        let kept = put(&store, AssetType::Image, b"kept").await;
        let lost = put(&store, AssetType::Audio, b"lost").await;
        tokio::fs::remove_file(store.blob_path(&lost.id)).await.unwrap();
        (kept, lost)
    };

    let store = open_store(&temp_dir).await;
    let report = store.repair_report().await.unwrap();
    assert_eq!(report.dangling_entries, vec![lost.id.clone()]);
    assert_eq!(store.get_all_assets().await.unwrap(), vec![kept]);
}

#[tokio::test]
async fn test_repair_reindexes_and_removes_orphans() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir).await;
    let indexed = put(&store, AssetType::Image, b"indexed").await;
    let unindexed = put(&store, AssetType::Audio, b"unindexed").await;
    store.close().await.unwrap();

    // Simulate a crash between blob write and manifest update
    let manifest_path = temp_dir.path().join("manifest.json");
    let mut manifest: serde_json::Value =
        serde_json::from_slice(&tokio::fs::read(&manifest_path).await.unwrap()).unwrap();
    manifest["assets"].as_array_mut().unwrap().retain(|a| a["id"] == indexed.id.as_str());
    tokio::fs::write(&manifest_path, serde_json::to_vec(&manifest).unwrap())
        .await
        .unwrap();

    // A blob with no sidecar and a half-written temp file
    let orphan = AssetId::generate(AssetType::Video, None);
    let assets_dir = temp_dir.path().join("assets");
    tokio::fs::write(assets_dir.join(format!("{}.blob", orphan)), b"orphan")
        .await
        .unwrap();
    tokio::fs::write(assets_dir.join("video_1__abcd.blob.tmp"), b"partial")
        .await
        .unwrap();

    store.init().await.unwrap();
    let report = store.repair_report().await.unwrap();

    assert_eq!(report.reindexed, vec![unindexed.id.clone()]);
    assert_eq!(report.orphans_removed, vec![orphan.clone()]);
    assert_eq!(report.temp_files_removed, 1);
    assert_eq!(store.get_all_assets().await.unwrap(), vec![indexed, unindexed]);
    assert!(!assets_dir.join(format!("{}.blob", orphan)).exists());
}

#[tokio::test]
async fn test_corrupt_manifest_rebuilt_from_sidecars() {
    let temp_dir = TempDir::new().unwrap();
    let stored = {
        let store = open_store(&temp_dir).await;
        put(&store, AssetType::Image, b"survivor").await
    };
    tokio::fs::write(temp_dir.path().join("manifest.json"), b"{ not json")
        .await
        .unwrap();

    let store = open_store(&temp_dir).await;
    let report = store.repair_report().await.unwrap();
    assert!(report.manifest_rebuilt);
    assert_eq!(store.get_all_assets().await.unwrap(), vec![stored]);
}

#[tokio::test]
async fn test_newer_manifest_version_rejected() {
    let temp_dir = TempDir::new().unwrap();
    tokio::fs::write(
        temp_dir.path().join("manifest.json"),
        br#"{"version": 99, "assets": [], "lastUpdated": 0}"#,
    )
    .await
    .unwrap();

    let store = FileSystemAssetStore::new(temp_dir.path());
    let err = store.init().await.unwrap_err();
    let kind = storage_kind(&err);
    assert!(matches!(kind, StorageErrorKind::Manifest(_)));
    assert!(kind.is_read());
    assert!(!kind.is_write());
}

#[tokio::test]
async fn test_write_failure_is_write_error() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir).await;

    // Replace the blob directory with a plain file so writes fail
    let assets_dir = temp_dir.path().join("assets");
    tokio::fs::remove_dir_all(&assets_dir).await.unwrap();
    tokio::fs::write(&assets_dir, b"not a directory").await.unwrap();

    let id = AssetId::generate(AssetType::Image, None);
    let err = store
        .store_asset(&id, b"x", NewAsset::new(AssetType::Image, "x"))
        .await
        .unwrap_err();
    assert!(storage_kind(&err).is_write());
    assert!(store.get_all_assets().await.unwrap().is_empty());
}
