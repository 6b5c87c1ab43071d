//! Top-level error wrapper types.

use crate::{ConfigError, PipelineError, ProviderError, StorageError};

/// Every error a vidgen operation can surface.
///
/// # Examples
///
/// ```
/// use vidgen_error::{VidgenError, VidgenErrorKind, ConfigError};
///
/// let err: VidgenError = ConfigError::new("bad base_url").into();
/// assert!(matches!(err.kind(), VidgenErrorKind::Config(_)));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum VidgenErrorKind {
    /// Local persistence failure
    #[from(StorageError)]
    Storage(StorageError),
    /// Generation collaborator failure
    #[from(ProviderError)]
    Provider(ProviderError),
    /// Orchestration rule violation
    #[from(PipelineError)]
    Pipeline(PipelineError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
}

/// vidgen error with kind discrimination.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("vidgen Error: {}", _0)]
pub struct VidgenError(Box<VidgenErrorKind>);

impl VidgenError {
    /// Create a new error from a kind.
    pub fn new(kind: VidgenErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &VidgenErrorKind {
        &self.0
    }

    /// The storage error, if this is one.
    pub fn as_storage(&self) -> Option<&StorageError> {
        match self.kind() {
            VidgenErrorKind::Storage(e) => Some(e),
            _ => None,
        }
    }

    /// The provider error, if this is one.
    pub fn as_provider(&self) -> Option<&ProviderError> {
        match self.kind() {
            VidgenErrorKind::Provider(e) => Some(e),
            _ => None,
        }
    }

    /// The pipeline error, if this is one.
    pub fn as_pipeline(&self) -> Option<&PipelineError> {
        match self.kind() {
            VidgenErrorKind::Pipeline(e) => Some(e),
            _ => None,
        }
    }
}

// Generic From implementation for any type that converts to VidgenErrorKind
impl<T> From<T> for VidgenError
where
    T: Into<VidgenErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for vidgen operations.
pub type VidgenResult<T> = std::result::Result<T, VidgenError>;
