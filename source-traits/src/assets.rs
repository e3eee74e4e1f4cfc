//! Asset-Library Service Boundary
//!
//! Platform media libraries resolve an asset URI into a readable handle
//! asynchronously: the lookup, permission check, and length query happen on
//! an executor the core does not control, and the result arrives through a
//! completion callback. [`AssetLibrary`] captures exactly that calling
//! convention; byte-range reads against a resolved handle are plain calls.

use bytes::Bytes;
use std::fmt;
use std::ops::Range;
use thiserror::Error;

/// Identifies one asset within a media library.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetUri(String);

impl AssetUri {
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AssetUri {
    fn from(uri: &str) -> Self {
        Self(uri.to_string())
    }
}

impl From<String> for AssetUri {
    fn from(uri: String) -> Self {
        Self(uri)
    }
}

/// A resolved, readable asset.
///
/// Produced by a successful [`AssetLibrary::resolve`]; passed back to the
/// library for every byte-range read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetHandle {
    /// Library-scoped identity of the resolved asset.
    pub id: String,
    /// Total asset length in bytes.
    pub byte_length: u64,
}

/// Errors reported by the platform media library.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssetError {
    /// No asset exists for the requested URI.
    #[error("asset not found: {0}")]
    NotFound(String),

    /// The library refused access to the asset.
    #[error("asset access denied: {0}")]
    AccessDenied(String),

    /// The library failed internally.
    #[error("asset library failure: {0}")]
    Library(String),
}

/// Completion callback for [`AssetLibrary::resolve`].
///
/// Invoked exactly once, from a thread of the library's choosing.
pub type ResolveCompletion = Box<dyn FnOnce(Result<AssetHandle, AssetError>) + Send + 'static>;

/// A platform media library.
///
/// `resolve` is inherently asynchronous: it returns immediately and the
/// outcome is delivered later via `completion` on an arbitrary thread. Once
/// issued, a resolution runs to completion or failure regardless of whether
/// the caller still wants the result; callers that give up early must be
/// prepared to discard a late completion.
pub trait AssetLibrary: Send + Sync {
    /// Starts resolving `uri`, delivering the outcome through `completion`.
    fn resolve(&self, uri: &AssetUri, completion: ResolveCompletion);

    /// Reads `range` from a resolved asset.
    ///
    /// Returns fewer bytes than requested only when `range` extends past the
    /// end of the asset.
    fn read_bytes(&self, handle: &AssetHandle, range: Range<u64>) -> Result<Bytes, AssetError>;
}
