//! Generation collaborator error types.

/// Kinds of failures reported by a generation collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ProviderErrorKind {
    /// Request never produced a response (connection, TLS, body stream)
    #[display("Transport error: {}", _0)]
    Transport(String),
    /// Service answered with a non-success status
    #[display("API error (status {}): {}", status, message)]
    Api {
        /// HTTP status code
        status: u16,
        /// Response text, or the status line when the body was empty
        message: String,
    },
    /// Service succeeded but returned nothing usable
    #[display("Empty result from {} generation", _0)]
    EmptyResult(String),
    /// Service output could not be interpreted
    #[display("Malformed response: {}", _0)]
    Malformed(String),
}

/// Provider error with location tracking.
///
/// # Examples
///
/// ```
/// use vidgen_error::{ProviderError, ProviderErrorKind};
///
/// let err = ProviderError::new(ProviderErrorKind::Api {
///     status: 401,
///     message: "invalid key".to_string(),
/// });
/// assert!(err.to_string().contains("status 401"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Provider Error: {} at line {} in {}", kind, line, file)]
pub struct ProviderError {
    /// The kind of error that occurred
    pub kind: ProviderErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl ProviderError {
    /// Create a new provider error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ProviderErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
