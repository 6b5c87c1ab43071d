//! Pipeline orchestration error types.

/// Kinds of pipeline errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum PipelineErrorKind {
    /// Stage triggered without its upstream input
    #[display("Prerequisite missing for {} stage: {}", stage, missing)]
    PrerequisiteMissing {
        /// Stage that refused to run
        stage: String,
        /// What the stage needed
        missing: String,
    },
    /// A referenced asset is not in the store
    #[display("Asset not found in storage: {}", _0)]
    AssetMissing(String),
    /// Another stage is already in flight
    #[display("Cannot start {} while {} is generating", requested, running)]
    Busy {
        /// Stage that was requested
        requested: String,
        /// Stage currently running
        running: String,
    },
    /// Uploaded file does not match the gallery type
    #[display("Invalid upload: {}", _0)]
    InvalidUpload(String),
    /// Asset type cannot be selected as a stage input
    #[display("Assets of type {} cannot be selected", _0)]
    NotSelectable(String),
}

/// Pipeline error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Pipeline Error: {} at line {} in {}", kind, line, file)]
pub struct PipelineError {
    /// The kind of error that occurred
    pub kind: PipelineErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl PipelineError {
    /// Create a new pipeline error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: PipelineErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
