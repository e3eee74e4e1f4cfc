//! # Blob Source Error Types
//!
//! One error enum covers both halves of the source lifecycle. Every variant
//! maps onto the two-code taxonomy ([`SourceErrorCode::Open`] = 0,
//! [`SourceErrorCode::Read`] = 1) that callers switch on; the variants
//! themselves carry the finer-grained reason.

use std::time::Duration;
use thiserror::Error;

/// Error domain reported alongside [`SourceErrorCode`].
///
/// Kept verbatim for callers that match on the domain string.
pub const SOURCE_ERROR_DOMAIN: &str = "AssetDataSource";

/// The persisted two-code error taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SourceErrorCode {
    /// The source could not be opened.
    Open = 0,
    /// The source could not be read.
    Read = 1,
}

/// Errors produced by blob data sources.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    // ========================================================================
    // Open Errors
    // ========================================================================
    /// The backing store does not exist.
    #[error("source not found: {path}")]
    NotFound { path: String },

    /// The backing store exists but access was refused.
    #[error("permission denied: {path}")]
    PermissionDenied { path: String },

    /// A synchronous open did not complete within the configured ceiling.
    ///
    /// Distinct from a platform-reported failure: the caller may retry by
    /// constructing a new handle.
    #[error("open timed out after {0:?}")]
    OpenTimeout(Duration),

    /// The platform reported a failure while opening the source.
    #[error("failed to open source: {0}")]
    OpenFailed(String),

    // ========================================================================
    // Read Errors
    // ========================================================================
    /// A read was attempted before the source finished opening.
    #[error("source is not ready")]
    NotReady,

    /// A read or open was attempted on a closed source.
    #[error("source is closed")]
    Closed,

    /// The platform reported a failure while reading from the source.
    #[error("failed to read from source: {0}")]
    ReadFailed(String),
}

impl SourceError {
    /// Maps this error onto the two-code taxonomy.
    pub fn code(&self) -> SourceErrorCode {
        match self {
            SourceError::NotFound { .. }
            | SourceError::PermissionDenied { .. }
            | SourceError::OpenTimeout(_)
            | SourceError::OpenFailed(_) => SourceErrorCode::Open,
            SourceError::NotReady | SourceError::Closed | SourceError::ReadFailed(_) => {
                SourceErrorCode::Read
            }
        }
    }

    /// Returns `true` if the open timed out rather than definitively failing.
    pub fn is_timeout(&self) -> bool {
        matches!(self, SourceError::OpenTimeout(_))
    }

    /// Returns `true` if the operation can be retried on a fresh handle.
    ///
    /// A timed-out open may succeed next time; a platform-reported open
    /// failure is treated as permanent for this backing store.
    pub fn is_transient(&self) -> bool {
        matches!(self, SourceError::OpenTimeout(_) | SourceError::NotReady)
    }
}

/// Result type for blob source operations.
pub type Result<T> = std::result::Result<T, SourceError>;
