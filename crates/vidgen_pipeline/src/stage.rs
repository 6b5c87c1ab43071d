//! Pipeline stages.

/// One step of the script → image → audio → video pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Stage {
    /// Prompt → script text
    Script,
    /// Prompt → image asset
    Image,
    /// Script → audio asset
    Audio,
    /// Image + audio → video asset
    Video,
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_stage_order_and_names() {
        let names: Vec<String> = Stage::iter().map(|s| s.to_string()).collect();
        assert_eq!(names, ["script", "image", "audio", "video"]);
    }
}
