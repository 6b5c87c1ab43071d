//! Tests for the in-memory asset store.

use vidgen_error::StorageErrorKind;
use vidgen_storage::{AssetId, AssetStore, AssetType, InMemoryAssetStore, NewAsset};

async fn open_store() -> InMemoryAssetStore {
    let store = InMemoryAssetStore::new();
    store.init().await.unwrap();
    store
}

#[tokio::test]
async fn test_store_get_delete() {
    let store = open_store().await;
    let id = AssetId::generate(AssetType::Script, Some("Hello"));

    let metadata = store
        .store_asset(&id, b"Hello there", NewAsset::new(AssetType::Script, "Script"))
        .await
        .unwrap();
    assert_eq!(metadata.size, 11);

    let stored = store.get_asset(&id).await.unwrap().unwrap();
    assert_eq!(stored.blob, b"Hello there");

    store.delete_asset(&id).await.unwrap();
    assert!(store.get_asset(&id).await.unwrap().is_none());
    assert_eq!(store.blob_count().await, 0);

    // Second delete of the same id is a no-op
    store.delete_asset(&id).await.unwrap();
}

#[tokio::test]
async fn test_clones_share_state() {
    let store = open_store().await;
    let clone = store.clone();

    let id = AssetId::generate(AssetType::Image, None);
    clone
        .store_asset(&id, b"png", NewAsset::new(AssetType::Image, "img"))
        .await
        .unwrap();

    assert_eq!(store.get_all_assets().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_quota_exceeded_is_write_error() {
    let store = InMemoryAssetStore::new().with_quota(10);
    store.init().await.unwrap();

    let small = AssetId::generate(AssetType::Audio, None);
    store
        .store_asset(&small, b"123456", NewAsset::new(AssetType::Audio, "small"))
        .await
        .unwrap();

    let big = AssetId::generate(AssetType::Audio, None);
    let err = store
        .store_asset(&big, b"123456", NewAsset::new(AssetType::Audio, "big"))
        .await
        .unwrap_err();
    let kind = &err.as_storage().unwrap().kind;
    assert!(kind.is_write());
    assert_eq!(
        *kind,
        StorageErrorKind::QuotaExceeded {
            requested: 6,
            available: 4
        }
    );

    // Nothing from the rejected write is visible
    assert_eq!(store.get_all_assets().await.unwrap().len(), 1);
    assert_eq!(store.used_bytes().await, 6);
}

#[tokio::test]
async fn test_quota_counts_replaced_blob() {
    let store = InMemoryAssetStore::new().with_quota(10);
    store.init().await.unwrap();

    let id = AssetId::generate(AssetType::Video, None);
    store
        .store_asset(&id, b"12345678", NewAsset::new(AssetType::Video, "v1"))
        .await
        .unwrap();
    store
        .store_asset(&id, b"1234567890", NewAsset::new(AssetType::Video, "v2"))
        .await
        .unwrap();

    assert_eq!(store.used_bytes().await, 10);
    let all = store.get_all_assets().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].name, "v2");
}

#[tokio::test]
async fn test_newest_of_type() {
    let store = open_store().await;

    for n in 0..3 {
        let id = AssetId::generate(AssetType::Image, None);
        store
            .store_asset(&id, b"i", NewAsset::new(AssetType::Image, format!("image {n}")))
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }
    let id = AssetId::generate(AssetType::Audio, None);
    store
        .store_asset(&id, b"a", NewAsset::new(AssetType::Audio, "audio"))
        .await
        .unwrap();

    let newest = store.newest_of_type(AssetType::Image).await.unwrap().unwrap();
    assert_eq!(newest.name, "image 2");
    assert!(store.newest_of_type(AssetType::Video).await.unwrap().is_none());
}

#[tokio::test]
async fn test_lifecycle() {
    let store = InMemoryAssetStore::new();
    let err = store.get_all_assets().await.unwrap_err();
    assert_eq!(err.as_storage().unwrap().kind, StorageErrorKind::NotInitialized);

    store.init().await.unwrap();
    let id = AssetId::generate(AssetType::Image, None);
    store
        .store_asset(&id, b"x", NewAsset::new(AssetType::Image, "x"))
        .await
        .unwrap();
    store.close().await.unwrap();

    let err = store.get_asset(&id).await.unwrap_err();
    assert_eq!(err.as_storage().unwrap().kind, StorageErrorKind::Closed);

    store.init().await.unwrap();
    assert!(store.get_asset(&id).await.unwrap().is_some());
    assert_eq!(store.backend_name(), "memory");
}

#[tokio::test]
async fn test_clear_all() {
    let store = open_store().await;
    for asset_type in AssetType::SELECTABLE {
        let id = AssetId::generate(asset_type, None);
        store
            .store_asset(&id, b"data", NewAsset::new(asset_type, "x"))
            .await
            .unwrap();
    }

    store.clear_all().await.unwrap();
    assert!(store.get_all_assets().await.unwrap().is_empty());
    assert_eq!(store.used_bytes().await, 0);
}
