//! Storage error types.

/// Kinds of storage errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum StorageErrorKind {
    /// Failed to create a storage directory
    #[display("Failed to create storage directory: {}", _0)]
    DirectoryCreation(String),
    /// The persistence layer rejected a write
    #[display("Failed to write: {}", _0)]
    Write(String),
    /// Write rejected because the store is out of space
    #[display("Quota exceeded: {} bytes requested, {} bytes available", requested, available)]
    QuotaExceeded {
        /// Bytes the write needed
        requested: u64,
        /// Bytes left in the store
        available: u64,
    },
    /// The persistence layer rejected a read
    #[display("Failed to read: {}", _0)]
    Read(String),
    /// Manifest could not be encoded or decoded
    #[display("Manifest error: {}", _0)]
    Manifest(String),
    /// Asset identifier is malformed or unsafe as a storage key
    #[display("Invalid asset id: {}", _0)]
    InvalidAssetId(String),
    /// Operation issued before `init`
    #[display("Store not initialized")]
    NotInitialized,
    /// Operation issued after `close`
    #[display("Store closed")]
    Closed,
}

impl StorageErrorKind {
    /// Whether this kind belongs to the write failure class.
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            StorageErrorKind::Write(_)
                | StorageErrorKind::QuotaExceeded { .. }
                | StorageErrorKind::DirectoryCreation(_)
        )
    }

    /// Whether this kind belongs to the read failure class.
    pub fn is_read(&self) -> bool {
        matches!(
            self,
            StorageErrorKind::Read(_) | StorageErrorKind::Manifest(_)
        )
    }
}

/// Storage error with location tracking.
///
/// # Examples
///
/// ```
/// use vidgen_error::{StorageError, StorageErrorKind};
///
/// let err = StorageError::new(StorageErrorKind::QuotaExceeded { requested: 10, available: 4 });
/// assert!(err.kind.is_write());
/// assert!(format!("{}", err).contains("Quota exceeded"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Storage Error: {} at line {} in {}", kind, line, file)]
pub struct StorageError {
    /// The kind of error that occurred
    pub kind: StorageErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl StorageError {
    /// Create a new storage error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StorageErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
