//! # Blob Source Traits
//!
//! Contracts shared by every blob data-source adapter, plus the boundary
//! traits for the external services the adapters pull from.
//!
//! ## Overview
//!
//! A blob data source exposes one pull-based byte-stream interface,
//! [`BlobDataSource`], over heterogeneous backing stores. The contract hides
//! whether opening a given store is immediate or must happen off the calling
//! thread; the adapters bridge the difference with the locking primitives
//! from `core-locking`.
//!
//! ## Traits
//!
//! ### The consumer-facing contract
//! - [`BlobDataSource`] - open/read/length/close over one backing store
//!
//! ### External collaborators
//! - [`FileSystem`](fs::FileSystem) / [`FileHandle`](fs::FileHandle) -
//!   the local filesystem service
//! - [`AssetLibrary`](assets::AssetLibrary) - the platform media library,
//!   with its callback-based asynchronous resolution
//! - [`TaskSpawner`](executor::TaskSpawner) - background dispatch for
//!   deferred opens ([`TokioSpawner`](executor::TokioSpawner) and
//!   [`ThreadSpawner`](executor::ThreadSpawner) provided)
//!
//! ## Error Handling
//!
//! All source operations report [`SourceError`]. Every variant maps onto the
//! stable two-code taxonomy ([`SourceErrorCode`]) under
//! [`SOURCE_ERROR_DOMAIN`]; callers that switch on the code keep working
//! across adapters.

pub mod assets;
pub mod error;
pub mod executor;
pub mod fs;
pub mod source;

pub use error::{Result, SourceError, SourceErrorCode, SOURCE_ERROR_DOMAIN};
pub use source::{BlobDataSource, DEFAULT_OPEN_TIMEOUT};

// Re-export commonly used boundary types
pub use assets::{AssetError, AssetHandle, AssetLibrary, AssetUri, ResolveCompletion};
pub use executor::{TaskSpawner, ThreadSpawner, TokioSpawner};
pub use fs::{FileHandle, FileSystem};
