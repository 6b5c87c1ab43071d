//! Generation and upload command handlers.

use std::path::Path;
use vidgen::{
    AssetId, AssetMetadata, AssetType, Pipeline, StorageError, StorageErrorKind, VidgenConfig,
    VidgenResult,
};

/// Read a file, mapping I/O failures into the storage read class.
pub(crate) async fn read_file(path: &Path) -> VidgenResult<Vec<u8>> {
    tokio::fs::read(path).await.map_err(|e| {
        StorageError::new(StorageErrorKind::Read(format!("{}: {}", path.display(), e))).into()
    })
}

/// Write a file, mapping I/O failures into the storage write class.
pub(crate) async fn write_file(path: &Path, data: &[u8]) -> VidgenResult<()> {
    tokio::fs::write(path, data).await.map_err(|e| {
        StorageError::new(StorageErrorKind::Write(format!("{}: {}", path.display(), e))).into()
    })
}

fn print_asset(label: &str, metadata: &AssetMetadata) {
    println!("{} {} ({} bytes)", label, metadata.id, metadata.size);
}

/// Generate a script and print it.
pub async fn script(
    pipeline: &Pipeline,
    config: &VidgenConfig,
    prompt: Option<String>,
    out: Option<&Path>,
) -> VidgenResult<()> {
    let prompt = prompt.unwrap_or_else(|| config.prompts.script.clone());
    let script = pipeline.generate_script(&prompt).await?;

    if let Some(path) = out {
        write_file(path, script.as_bytes()).await?;
        tracing::info!(path = %path.display(), "Wrote script");
    }
    println!("{}", script);
    Ok(())
}

/// Generate an image and select it.
pub async fn image(
    pipeline: &Pipeline,
    config: &VidgenConfig,
    prompt: Option<String>,
) -> VidgenResult<()> {
    let prompt = prompt.unwrap_or_else(|| config.prompts.image.clone());
    let metadata = pipeline.generate_image(&prompt).await?;
    print_asset("Image", &metadata);
    Ok(())
}

/// Speak the given script and select the audio.
pub async fn audio(
    pipeline: &Pipeline,
    text: Option<String>,
    script_file: Option<&Path>,
) -> VidgenResult<()> {
    let script = match (text, script_file) {
        (Some(text), _) => text,
        (None, Some(path)) => String::from_utf8_lossy(&read_file(path).await?).into_owned(),
        (None, None) => String::new(),
    };
    pipeline.set_script(script).await;

    let metadata = pipeline.generate_audio().await?;
    print_asset("Audio", &metadata);
    Ok(())
}

/// Make `id` the selection for its type without toggling it off.
async fn ensure_selected(pipeline: &Pipeline, id: &AssetId) -> VidgenResult<()> {
    if !pipeline.selection().await.is_selected(id) {
        pipeline.select(id).await?;
    }
    Ok(())
}

/// Animate the selected (or given) image with the selected (or given) audio.
pub async fn video(
    pipeline: &Pipeline,
    image: Option<AssetId>,
    audio: Option<AssetId>,
) -> VidgenResult<()> {
    for id in image.iter().chain(audio.iter()) {
        ensure_selected(pipeline, id).await?;
    }

    let metadata = pipeline.generate_video().await?;
    print_asset("Video", &metadata);
    Ok(())
}

/// Run script, image, audio and video in order.
pub async fn run(
    pipeline: &Pipeline,
    config: &VidgenConfig,
    script_prompt: Option<String>,
    image_prompt: Option<String>,
) -> VidgenResult<()> {
    let script_prompt = script_prompt.unwrap_or_else(|| config.prompts.script.clone());
    let image_prompt = image_prompt.unwrap_or_else(|| config.prompts.image.clone());

    let script = pipeline.generate_script(&script_prompt).await?;
    println!("Script:\n{}\n", script);

    print_asset("Image", &pipeline.generate_image(&image_prompt).await?);
    print_asset("Audio", &pipeline.generate_audio().await?);
    print_asset("Video", &pipeline.generate_video().await?);
    Ok(())
}

/// MIME type implied by a file extension.
pub(crate) fn content_type_for(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    let content_type = match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "m4a" => "audio/mp4",
        "ogg" => "audio/ogg",
        "mp4" => "video/mp4",
        _ => return None,
    };
    Some(content_type)
}

/// Store a local file as an asset and select it.
pub async fn upload(pipeline: &Pipeline, asset_type: AssetType, path: &Path) -> VidgenResult<()> {
    let bytes = read_file(path).await?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let metadata = pipeline
        .upload_asset(asset_type, &file_name, content_type_for(path), bytes)
        .await?;
    print_asset("Uploaded", &metadata);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_from_extension() {
        assert_eq!(content_type_for(Path::new("face.PNG")), Some("image/png"));
        assert_eq!(content_type_for(Path::new("voice.mp3")), Some("audio/mpeg"));
        assert_eq!(content_type_for(Path::new("notes.txt")), None);
        assert_eq!(content_type_for(Path::new("no_extension")), None);
    }
}
