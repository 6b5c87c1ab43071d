//! Per-session selection state.

use vidgen_storage::{AssetId, AssetType};

/// Active input per stage plus the live script.
///
/// Lives in memory only. [`Pipeline::recover`](crate::Pipeline::recover)
/// rebuilds it from the newest asset of each type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    /// Selected image
    pub image: Option<AssetId>,
    /// Selected audio
    pub audio: Option<AssetId>,
    /// Selected video
    pub video: Option<AssetId>,
    /// Current script text
    pub script: String,
}

impl SelectionState {
    /// Selected asset for a type. Always `None` for scripts.
    pub fn get(&self, asset_type: AssetType) -> Option<&AssetId> {
        match asset_type {
            AssetType::Image => self.image.as_ref(),
            AssetType::Audio => self.audio.as_ref(),
            AssetType::Video => self.video.as_ref(),
            AssetType::Script => None,
        }
    }

    /// Slot currently holding `id`, if any.
    pub fn slot_of(&self, id: &AssetId) -> Option<AssetType> {
        AssetType::SELECTABLE
            .into_iter()
            .find(|t| self.get(*t) == Some(id))
    }

    /// Whether `id` is selected in any slot.
    pub fn is_selected(&self, id: &AssetId) -> bool {
        self.slot_of(id).is_some()
    }

    pub(crate) fn slot_mut(&mut self, asset_type: AssetType) -> Option<&mut Option<AssetId>> {
        match asset_type {
            AssetType::Image => Some(&mut self.image),
            AssetType::Audio => Some(&mut self.audio),
            AssetType::Video => Some(&mut self.video),
            AssetType::Script => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_selected_checks_every_slot() {
        let image = AssetId::generate(AssetType::Image, None);
        let other = AssetId::generate(AssetType::Image, None);
        let untagged = AssetId::parse("portrait-upload").unwrap();
        let state = SelectionState {
            image: Some(image.clone()),
            audio: Some(untagged.clone()),
            ..Default::default()
        };
        assert!(state.is_selected(&image));
        assert!(!state.is_selected(&other));
        assert_eq!(state.slot_of(&untagged), Some(AssetType::Audio));
        assert_eq!(state.get(AssetType::Script), None);
    }
}
