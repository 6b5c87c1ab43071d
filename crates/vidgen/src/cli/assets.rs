//! Asset management command handlers.

use super::commands::OutputFormat;
use super::generate::write_file;
use std::path::Path;
use vidgen::{
    AssetId, AssetMetadata, AssetStore, AssetType, FileSystemAssetStore, Pipeline, PipelineError,
    PipelineErrorKind, SelectionState, StorageError, StorageErrorKind, VidgenResult, newest_first,
};

fn format_created(created_at: i64) -> String {
    chrono::DateTime::from_timestamp_millis(created_at)
        .map(|t| {
            t.with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        })
        .unwrap_or_else(|| created_at.to_string())
}

fn print_human(assets: &[AssetMetadata], selection: &SelectionState) {
    println!("{:-<100}", "");
    for asset in assets {
        let marker = if selection.is_selected(&asset.id) { "*" } else { " " };
        println!(
            "{} {:<6} {:<48} {:>10}  {}",
            marker,
            asset.asset_type.as_str(),
            asset.id.as_str(),
            asset.size,
            format_created(asset.created_at)
        );
        println!("         {}", asset.name);
        if let Some(prompt) = &asset.prompt {
            let preview: String = prompt.chars().take(60).collect();
            let ellipsis = if prompt.chars().count() > 60 { "..." } else { "" };
            println!("         {}{}", preview, ellipsis);
        }
    }
    println!("{:-<100}", "");
}

/// List assets, newest first.
pub async fn list(
    pipeline: &Pipeline,
    store: &FileSystemAssetStore,
    asset_type: Option<AssetType>,
    format: OutputFormat,
) -> VidgenResult<()> {
    let assets = match asset_type {
        Some(asset_type) => pipeline.store().assets_of_type(asset_type).await?,
        None => pipeline.store().get_all_assets().await?,
    };
    let assets = newest_first(assets);

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&assets).map_err(|e| {
                StorageError::new(StorageErrorKind::Manifest(format!(
                    "Failed to encode listing: {}",
                    e
                )))
            })?;
            println!("{}", json);
        }
        OutputFormat::Human => {
            let selection = pipeline.selection().await;
            print_human(&assets, &selection);

            let counts = store.counts().await?;
            let summary: Vec<String> = AssetType::SELECTABLE
                .iter()
                .map(|t| format!("{} {}", counts.get(t).copied().unwrap_or(0), t))
                .collect();
            println!(
                "Total: {} assets ({}), {} bytes in {}",
                assets.len(),
                summary.join(", "),
                store.total_size().await?,
                store.root().display()
            );
        }
    }
    Ok(())
}

/// Write an asset's bytes to `path`.
pub async fn export(pipeline: &Pipeline, id: &AssetId, path: &Path) -> VidgenResult<()> {
    let Some(asset) = pipeline.store().get_asset(id).await? else {
        return Err(PipelineError::new(PipelineErrorKind::AssetMissing(id.to_string())).into());
    };
    write_file(path, &asset.blob).await?;
    println!("Exported {} to {} ({} bytes)", id, path.display(), asset.blob.len());
    Ok(())
}

/// Delete one asset.
pub async fn delete(pipeline: &Pipeline, id: &AssetId) -> VidgenResult<()> {
    pipeline.delete_asset(id).await?;
    println!("Deleted {}", id);
    Ok(())
}

/// Delete every asset, if confirmed.
pub async fn clear(pipeline: &Pipeline, yes: bool) -> VidgenResult<()> {
    if !yes {
        eprintln!("Refusing to delete all assets without --yes");
        return Ok(());
    }
    pipeline.clear_all().await?;
    println!("Deleted all assets");
    Ok(())
}
