//! Error types for the vidgen pipeline.
//!
//! This crate provides the error types shared by the storage, provider and
//! pipeline crates.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - Constructors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use vidgen_error::{StorageError, StorageErrorKind, VidgenResult};
//!
//! fn write_blob() -> VidgenResult<()> {
//!     Err(StorageError::new(StorageErrorKind::Write("disk full".to_string())))?
//! }
//!
//! let err = write_blob().unwrap_err();
//! assert!(err.to_string().contains("disk full"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod pipeline;
mod provider;
mod storage;

pub use config::ConfigError;
pub use error::{VidgenError, VidgenErrorKind, VidgenResult};
pub use pipeline::{PipelineError, PipelineErrorKind};
pub use provider::{ProviderError, ProviderErrorKind};
pub use storage::{StorageError, StorageErrorKind};
