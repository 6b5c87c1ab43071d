//! Stage orchestration.

use crate::{DisplayHandle, DisplayHandles, Generators, PipelineConfig, SelectionState, Stage};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use vidgen_error::{PipelineError, PipelineErrorKind, VidgenResult};
use vidgen_providers::{AudioRequest, ImageRequest, TextRequest, VideoRequest, accepts_input_image};
use vidgen_storage::{AssetId, AssetMetadata, AssetStore, AssetType, NewAsset, StoredAsset};

/// Characters of the script kept in an audio asset's prompt.
const AUDIO_PROMPT_CHARS: usize = 100;

/// Model recorded on user-uploaded assets.
pub const UPLOAD_MODEL: &str = "user-upload";

/// An asset in a gallery listing, with a live display handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryItem {
    /// Asset metadata
    pub metadata: AssetMetadata,
    /// Handle resolving to the asset's bytes
    pub handle: DisplayHandle,
}

#[derive(Debug, Default)]
struct Session {
    selection: SelectionState,
    selected: HashMap<AssetType, DisplayHandle>,
    galleries: HashMap<AssetType, Vec<DisplayHandle>>,
}

/// Clears the busy slot when a stage finishes, however it finishes.
struct BusyGuard<'a> {
    slot: &'a Mutex<Option<Stage>>,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        *lock_slot(self.slot) = None;
    }
}

fn lock_slot(slot: &Mutex<Option<Stage>>) -> MutexGuard<'_, Option<Stage>> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn prerequisite(stage: Stage, missing: &str) -> PipelineError {
    PipelineError::new(PipelineErrorKind::PrerequisiteMissing {
        stage: stage.to_string(),
        missing: missing.to_string(),
    })
}

fn timestamp_label() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Orchestrates the script → image → audio → video stages.
///
/// The pipeline owns the session's selection state and display handles. The
/// store is shared and remains the source of truth for asset content: the
/// video stage always reads its inputs back from it.
///
/// Only one stage runs at a time. Triggering a stage while another is in
/// flight fails with `Busy`; selection, deletion and gallery loads stay
/// available throughout.
///
/// Every stage logs its failure, returns it, and leaves the selection as it
/// was.
pub struct Pipeline {
    store: Arc<dyn AssetStore>,
    generators: Generators,
    config: PipelineConfig,
    handles: DisplayHandles,
    busy: Mutex<Option<Stage>>,
    session: tokio::sync::Mutex<Session>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("store", &self.store.backend_name())
            .field("generators", &self.generators)
            .field("config", &self.config)
            .field("busy", &self.running_stage())
            .finish()
    }
}

impl Pipeline {
    /// Create a pipeline. Call [`recover`](Pipeline::recover) before use.
    pub fn new(store: Arc<dyn AssetStore>, generators: Generators, config: PipelineConfig) -> Self {
        Self {
            store,
            generators,
            config,
            handles: DisplayHandles::new(),
            busy: Mutex::new(None),
            session: tokio::sync::Mutex::new(Session::default()),
        }
    }

    /// Shared asset store.
    pub fn store(&self) -> &Arc<dyn AssetStore> {
        &self.store
    }

    /// Models and keys in use.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Display handle registry.
    pub fn handles(&self) -> &DisplayHandles {
        &self.handles
    }

    /// Stage currently generating, if any.
    pub fn running_stage(&self) -> Option<Stage> {
        *lock_slot(&self.busy)
    }

    /// Snapshot of the selection state.
    pub async fn selection(&self) -> SelectionState {
        self.session.lock().await.selection.clone()
    }

    /// Handle for the selected asset of a type.
    pub async fn display_handle(&self, asset_type: AssetType) -> Option<DisplayHandle> {
        self.session.lock().await.selected.get(&asset_type).cloned()
    }

    /// Current script text.
    pub async fn script(&self) -> String {
        self.session.lock().await.selection.script.clone()
    }

    /// Replace the script text, e.g. after the user edits it.
    pub async fn set_script(&self, script: impl Into<String>) {
        self.session.lock().await.selection.script = script.into();
    }

    fn begin(&self, stage: Stage) -> Result<BusyGuard<'_>, PipelineError> {
        let mut slot = lock_slot(&self.busy);
        if let Some(running) = *slot {
            tracing::warn!(requested = %stage, running = %running, "Stage rejected while busy");
            return Err(PipelineError::new(PipelineErrorKind::Busy {
                requested: stage.to_string(),
                running: running.to_string(),
            }));
        }
        *slot = Some(stage);
        Ok(BusyGuard { slot: &self.busy })
    }

    fn finish<T>(stage: Stage, result: VidgenResult<T>) -> VidgenResult<T> {
        match &result {
            Ok(_) => tracing::info!(stage = %stage, "Stage complete"),
            Err(e) => tracing::error!(stage = %stage, error = %e, "Stage failed"),
        }
        result
    }

    // Stages

    /// Generate a script from `prompt` and make it the current script.
    #[tracing::instrument(skip(self, prompt), fields(prompt_len = prompt.len()))]
    pub async fn generate_script(&self, prompt: &str) -> VidgenResult<String> {
        let _busy = self.begin(Stage::Script)?;
        let result = self.run_script(prompt).await;
        Self::finish(Stage::Script, result)
    }

    async fn run_script(&self, prompt: &str) -> VidgenResult<String> {
        let mut request = TextRequest::new(&self.config.models.text, prompt);
        request.key = self.config.keys.text.clone();

        let script = self.generators.text.generate_text(&request).await?;
        self.session.lock().await.selection.script = script.clone();
        Ok(script)
    }

    /// Generate an image from `prompt`, store it and select it.
    ///
    /// Models that accept a context image receive the selected image, when
    /// one is selected and still loadable.
    #[tracing::instrument(skip(self, prompt), fields(prompt_len = prompt.len()))]
    pub async fn generate_image(&self, prompt: &str) -> VidgenResult<AssetMetadata> {
        let _busy = self.begin(Stage::Image)?;
        let result = self.run_image(prompt).await;
        Self::finish(Stage::Image, result)
    }

    async fn run_image(&self, prompt: &str) -> VidgenResult<AssetMetadata> {
        let model = &self.config.models.image;
        let mut request = ImageRequest::new(model, prompt);
        request.key = self.config.keys.image.clone();

        if accepts_input_image(model) {
            let current = self.session.lock().await.selection.image.clone();
            if let Some(id) = current {
                match self.store.get_asset(&id).await {
                    Ok(Some(asset)) => request.input_image = Some(asset.blob),
                    Ok(None) => tracing::warn!(id = %id, "Context image missing, skipping"),
                    Err(e) => tracing::warn!(id = %id, error = %e, "Context image unreadable"),
                }
            }
        }

        let media = self.generators.image.generate_image(&request).await?;
        let name = format!("Generated Image - {}", timestamp_label());
        let asset = NewAsset::new(AssetType::Image, name)
            .with_prompt(prompt)
            .with_model(model);
        let id = AssetId::generate(AssetType::Image, Some(prompt));
        self.persist_and_select(id, media.bytes, asset).await
    }

    /// Speak the current script, store the audio and select it.
    #[tracing::instrument(skip(self))]
    pub async fn generate_audio(&self) -> VidgenResult<AssetMetadata> {
        let _busy = self.begin(Stage::Audio)?;
        let result = self.run_audio().await;
        Self::finish(Stage::Audio, result)
    }

    async fn run_audio(&self) -> VidgenResult<AssetMetadata> {
        let script = self.script().await;
        if script.trim().is_empty() {
            return Err(prerequisite(Stage::Audio, "script").into());
        }

        let model = &self.config.models.audio;
        let mut request = AudioRequest::new(model, script.as_str());
        request.key = self.config.keys.audio.clone();

        let media = self.generators.audio.generate_audio(&request).await?;
        let prompt = audio_prompt(&script);
        let name = format!("Generated Audio - {}", timestamp_label());
        let asset = NewAsset::new(AssetType::Audio, name)
            .with_prompt(prompt.as_str())
            .with_model(model);
        let id = AssetId::generate(AssetType::Audio, Some(&prompt));
        self.persist_and_select(id, media.bytes, asset).await
    }

    /// Animate the selected image with the selected audio, store the video
    /// and select it.
    ///
    /// Both inputs are read back from the store; a selection that no longer
    /// resolves fails the stage.
    #[tracing::instrument(skip(self))]
    pub async fn generate_video(&self) -> VidgenResult<AssetMetadata> {
        let _busy = self.begin(Stage::Video)?;
        let result = self.run_video().await;
        Self::finish(Stage::Video, result)
    }

    async fn run_video(&self) -> VidgenResult<AssetMetadata> {
        let selection = self.selection().await;
        let image_id = selection.image.ok_or_else(|| prerequisite(Stage::Video, "image"))?;
        let audio_id = selection.audio.ok_or_else(|| prerequisite(Stage::Video, "audio"))?;

        let image = self.load_required(&image_id).await?;
        let audio = self.load_required(&audio_id).await?;

        let model = &self.config.models.video;
        let mut request = VideoRequest::new(model, image.blob, audio.blob);
        request.key = self.config.keys.video.clone();

        let media = self.generators.video.generate_video(&request).await?;
        let prompt = format!("Image: {}, Audio: {}", image_id, audio_id);
        let name = format!("Generated Video - {}", timestamp_label());
        let asset = NewAsset::new(AssetType::Video, name)
            .with_prompt(prompt.as_str())
            .with_model(model);
        let id = AssetId::generate(AssetType::Video, Some(&prompt));
        self.persist_and_select(id, media.bytes, asset).await
    }

    /// Store a user-supplied image or audio file and select it.
    ///
    /// `content_type`, when known, must match the asset type's MIME family.
    #[tracing::instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn upload_asset(
        &self,
        asset_type: AssetType,
        file_name: &str,
        content_type: Option<&str>,
        bytes: Vec<u8>,
    ) -> VidgenResult<AssetMetadata> {
        let result = self
            .run_upload(asset_type, file_name, content_type, bytes)
            .await;
        if let Err(e) = &result {
            tracing::error!(asset_type = %asset_type, file_name, error = %e, "Upload failed");
        }
        result
    }

    async fn run_upload(
        &self,
        asset_type: AssetType,
        file_name: &str,
        content_type: Option<&str>,
        bytes: Vec<u8>,
    ) -> VidgenResult<AssetMetadata> {
        if !matches!(asset_type, AssetType::Image | AssetType::Audio) {
            return Err(PipelineError::new(PipelineErrorKind::InvalidUpload(format!(
                "{} files cannot be uploaded",
                asset_type
            )))
            .into());
        }
        if let Some(content_type) = content_type
            && !content_type.starts_with(asset_type.mime_prefix())
        {
            return Err(PipelineError::new(PipelineErrorKind::InvalidUpload(format!(
                "{} is not an {} file",
                content_type, asset_type
            )))
            .into());
        }
        if bytes.is_empty() {
            return Err(PipelineError::new(PipelineErrorKind::InvalidUpload(format!(
                "{} is empty",
                file_name
            )))
            .into());
        }

        let asset = NewAsset::new(asset_type, format!("Uploaded {} - {}", asset_type, file_name))
            .with_prompt(format!("User uploaded: {}", file_name))
            .with_model(UPLOAD_MODEL);
        self.persist_and_select(AssetId::generate(asset_type, Some(file_name)), bytes, asset)
            .await
    }

    async fn load_required(&self, id: &AssetId) -> VidgenResult<StoredAsset> {
        self.store
            .get_asset(id)
            .await?
            .ok_or_else(|| {
                PipelineError::new(PipelineErrorKind::AssetMissing(id.to_string())).into()
            })
    }

    /// Store, then select, then refresh a loaded gallery of the same type.
    async fn persist_and_select(
        &self,
        id: AssetId,
        bytes: Vec<u8>,
        asset: NewAsset,
    ) -> VidgenResult<AssetMetadata> {
        let asset_type = asset.asset_type;
        let metadata = self.store.store_asset(&id, &bytes, asset).await?;
        tracing::info!(id = %metadata.id, size = metadata.size, "Stored generated asset");

        let reload_gallery = {
            let mut session = self.session.lock().await;
            self.set_selected(&mut session, asset_type, &metadata.id, bytes);
            session.galleries.contains_key(&asset_type)
        };
        if reload_gallery && let Err(e) = self.gallery(asset_type).await {
            tracing::warn!(asset_type = %asset_type, error = %e, "Gallery refresh failed");
        }
        Ok(metadata)
    }

    fn set_selected(
        &self,
        session: &mut Session,
        asset_type: AssetType,
        id: &AssetId,
        blob: Vec<u8>,
    ) {
        let handle = self.handles.acquire(id, blob);
        if let Some(previous) = session.selected.insert(asset_type, handle) {
            self.handles.release(&previous);
        }
        if let Some(slot) = session.selection.slot_mut(asset_type) {
            *slot = Some(id.clone());
        }
    }

    fn clear_selected(&self, session: &mut Session, asset_type: AssetType) {
        if let Some(previous) = session.selected.remove(&asset_type) {
            self.handles.release(&previous);
        }
        if let Some(slot) = session.selection.slot_mut(asset_type) {
            *slot = None;
        }
    }

    // Selection

    /// Select an asset as its type's active input.
    ///
    /// Selecting the already-selected asset deselects it. Returns the new
    /// display handle, or `None` when the call deselected.
    #[tracing::instrument(skip(self), fields(id = %id))]
    pub async fn select(&self, id: &AssetId) -> VidgenResult<Option<DisplayHandle>> {
        {
            let mut session = self.session.lock().await;
            if let Some(asset_type) = session.selection.slot_of(id) {
                self.clear_selected(&mut session, asset_type);
                tracing::info!("Deselected asset");
                return Ok(None);
            }
        }

        let asset = self.load_required(id).await?;
        let asset_type = asset.metadata.asset_type;
        if !asset_type.is_selectable() {
            let kind = PipelineErrorKind::NotSelectable(asset_type.to_string());
            return Err(PipelineError::new(kind).into());
        }

        let mut session = self.session.lock().await;
        self.set_selected(&mut session, asset_type, id, asset.blob);
        tracing::info!("Selected asset");
        Ok(session.selected.get(&asset_type).cloned())
    }

    /// Clear the selection for a type.
    pub async fn deselect(&self, asset_type: AssetType) {
        let mut session = self.session.lock().await;
        self.clear_selected(&mut session, asset_type);
    }

    // Store operations

    /// Delete an asset, clearing its selection and handles.
    #[tracing::instrument(skip(self), fields(id = %id))]
    pub async fn delete_asset(&self, id: &AssetId) -> VidgenResult<()> {
        self.store.delete_asset(id).await.inspect_err(|e| {
            tracing::error!(error = %e, "Delete failed");
        })?;

        let mut session = self.session.lock().await;
        if let Some(asset_type) = session.selection.slot_of(id) {
            self.clear_selected(&mut session, asset_type);
        }
        for items in session.galleries.values_mut() {
            items.retain(|h| h.asset_id() != id);
        }
        self.handles.revoke_asset(id);
        tracing::info!("Deleted asset");
        Ok(())
    }

    /// Initialize the store and select the newest asset of each type.
    ///
    /// A failure for one type is logged and does not affect the others.
    #[tracing::instrument(skip(self))]
    pub async fn recover(&self) -> VidgenResult<SelectionState> {
        self.store.init().await?;

        for asset_type in AssetType::SELECTABLE {
            match self.recover_type(asset_type).await {
                Ok(Some(id)) => tracing::info!(asset_type = %asset_type, id = %id, "Recovered"),
                Ok(None) => tracing::debug!(asset_type = %asset_type, "Nothing to recover"),
                Err(e) => tracing::warn!(asset_type = %asset_type, error = %e, "Recovery failed"),
            }
        }
        Ok(self.selection().await)
    }

    async fn recover_type(&self, asset_type: AssetType) -> VidgenResult<Option<AssetId>> {
        let Some(newest) = self.store.newest_of_type(asset_type).await? else {
            return Ok(None);
        };
        let asset = self.load_required(&newest.id).await?;
        let mut session = self.session.lock().await;
        self.set_selected(&mut session, asset_type, &newest.id, asset.blob);
        Ok(Some(newest.id))
    }

    /// Load the gallery for a type, newest first, with a handle per asset.
    ///
    /// Handles from the previous load of the same gallery are released.
    #[tracing::instrument(skip(self))]
    pub async fn gallery(&self, asset_type: AssetType) -> VidgenResult<Vec<GalleryItem>> {
        let assets = newest_first(self.store.assets_of_type(asset_type).await?);

        let mut items = Vec::with_capacity(assets.len());
        for metadata in assets {
            match self.store.get_asset(&metadata.id).await? {
                Some(stored) => {
                    let handle = self.handles.acquire(&metadata.id, stored.blob);
                    items.push(GalleryItem { metadata, handle });
                }
                None => tracing::warn!(id = %metadata.id, "Skipping gallery entry without blob"),
            }
        }

        let fresh = items.iter().map(|i| i.handle.clone()).collect();
        let previous = self.session.lock().await.galleries.insert(asset_type, fresh);
        for handle in previous.into_iter().flatten() {
            self.handles.release(&handle);
        }

        tracing::debug!(count = items.len(), "Loaded gallery");
        Ok(items)
    }

    /// Drop a loaded gallery and release its handles.
    pub async fn close_gallery(&self, asset_type: AssetType) {
        let previous = self.session.lock().await.galleries.remove(&asset_type);
        for handle in previous.into_iter().flatten() {
            self.handles.release(&handle);
        }
    }

    /// Empty the store and reset selections. The script is kept.
    #[tracing::instrument(skip(self))]
    pub async fn clear_all(&self) -> VidgenResult<()> {
        self.store.clear_all().await?;

        let mut session = self.session.lock().await;
        session.selected.clear();
        session.galleries.clear();
        let script = std::mem::take(&mut session.selection.script);
        session.selection = SelectionState {
            script,
            ..Default::default()
        };
        self.handles.clear();
        tracing::info!("Cleared all assets");
        Ok(())
    }

    /// Release every handle and close the store.
    #[tracing::instrument(skip(self))]
    pub async fn shutdown(&self) -> VidgenResult<()> {
        {
            let mut session = self.session.lock().await;
            session.selected.clear();
            session.galleries.clear();
        }
        self.handles.clear();
        self.store.close().await
    }
}

/// Order assets newest first. Later manifest entries win timestamp ties.
pub fn newest_first(mut assets: Vec<AssetMetadata>) -> Vec<AssetMetadata> {
    assets.reverse();
    assets.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    assets
}

/// Prompt recorded for an audio asset: the script's opening followed by `...`.
fn audio_prompt(script: &str) -> String {
    let opening: String = script.chars().take(AUDIO_PROMPT_CHARS).collect();
    format!("{}...", opening)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(id: &str, created_at: i64) -> AssetMetadata {
        AssetMetadata {
            id: AssetId::parse(id).unwrap(),
            asset_type: AssetType::Image,
            name: "test".to_string(),
            prompt: None,
            model: None,
            created_at,
            size: 1,
        }
    }

    #[test]
    fn test_newest_first_prefers_later_entries_on_ties() {
        let sorted = newest_first(vec![
            metadata("image_1__a", 1),
            metadata("image_2__b", 2),
            metadata("image_2__c", 2),
        ]);
        let ids: Vec<&str> = sorted.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, ["image_2__c", "image_2__b", "image_1__a"]);
    }

    #[test]
    fn test_audio_prompt_truncates_by_chars() {
        assert_eq!(audio_prompt("Hello world"), "Hello world...");
        let long = "é".repeat(150);
        let prompt = audio_prompt(&long);
        assert_eq!(prompt.chars().count(), AUDIO_PROMPT_CHARS + 3);
    }
}
