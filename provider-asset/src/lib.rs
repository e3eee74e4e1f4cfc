//! # Asset Provider
//!
//! Implements `BlobDataSource` over a platform media library.
//!
//! ## Overview
//!
//! This crate provides:
//! - [`AssetDataSource`] - the adapter bridging the library's callback-based
//!   asynchronous resolution into the synchronous pull contract
//! - [`MemoryAssetLibrary`] - an in-process `AssetLibrary` with foreign-thread
//!   completion delivery, for tests and demos
//!
//! The resolution primitive is always asynchronous underneath. With
//! `open_synchronously` set, `open()` blocks the calling thread on a bounded
//! wait until the completion callback lands (or the ceiling expires); without
//! it, `open()` returns immediately and reads report not-ready until the
//! handle resolves.

mod library;
mod source;

pub use library::MemoryAssetLibrary;
pub use source::AssetDataSource;
