//! # File Provider
//!
//! Implements `BlobDataSource` over the local filesystem.
//!
//! ## Overview
//!
//! This crate provides:
//! - [`FileDataSource`] - the adapter, with synchronous or deferred open
//! - [`StdFileSystem`] - the default `FileSystem` service over `std::fs`
//!
//! A synchronous open runs on the calling thread. A deferred open is
//! submitted to a background spawner and the first `read()` blocks on a
//! bounded wait until the open lands, so consumers keep a plain pull loop
//! either way.

mod fs;
mod source;

pub use fs::StdFileSystem;
pub use source::FileDataSource;
