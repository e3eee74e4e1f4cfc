//! # The Blob Data Source Contract
//!
//! Every backing-store adapter implements [`BlobDataSource`]: a classic
//! blocking pull API (open, read, length, close) over a store whose open may
//! be synchronous or asynchronous underneath.
//!
//! ## Lifecycle
//!
//! A handle moves `Unopened → Opening → {Open | Failed}` exactly once and is
//! explicitly closed by the consumer. `Open`, `Failed`, and `Closed` are
//! terminal for the open attempt: a completion callback that arrives after
//! the handle terminalized must discard its result.
//!
//! ## Consumer contract
//!
//! The consumer calls `open()` once, then `read()` repeatedly until it
//! returns `Ok(0)` or an error, then `close()` exactly once. Calls may come
//! from any thread, but must not overlap concurrently on the same handle.

use crate::error::Result;
use std::time::Duration;

/// Ceiling applied to a blocking open when none is configured.
pub const DEFAULT_OPEN_TIMEOUT: Duration = Duration::from_secs(30);

/// A pull-based byte stream over one backing store.
pub trait BlobDataSource: Send {
    /// Whether `open()` blocks until the store is ready or has definitively
    /// failed.
    fn open_synchronously(&self) -> bool;

    /// Sets the open policy. Must be called before the first `open()`;
    /// changing it afterwards has no effect on an open already in flight.
    fn set_open_synchronously(&mut self, open_synchronously: bool);

    /// Opens the backing store.
    ///
    /// With `open_synchronously() == true` this returns only once the store
    /// is ready or has definitively failed. Otherwise it returns immediately
    /// and readiness is determined later.
    ///
    /// Calling `open()` again after a failure resurfaces the recorded error
    /// without re-attempting the underlying resolution; calling it while
    /// opening or already open is a no-op returning `Ok(())`.
    fn open(&mut self) -> Result<()>;

    /// Reads up to `buf.len()` bytes into `buf`, returning the number of
    /// bytes read. `Ok(0)` signals end of stream.
    ///
    /// Fails with [`SourceError::NotReady`](crate::SourceError::NotReady)
    /// before a successful open, and with
    /// [`SourceError::Closed`](crate::SourceError::Closed) after `close()`.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Total length of the blob in bytes, once known.
    ///
    /// `None` until the open completes successfully.
    fn length(&self) -> Option<u64>;

    /// Closes the source, releasing the backing handle.
    ///
    /// Safe to call multiple times; only the first call releases resources.
    fn close(&mut self);

    /// Returns `true` once the open has completed successfully.
    fn is_open_completed(&self) -> bool;

    /// Returns `true` if the source is open and bytes remain before the end
    /// of the stream.
    fn has_bytes_available(&self) -> bool;

    /// Returns `true` if the source is open and the cursor has reached the
    /// end of the stream.
    fn is_at_end(&self) -> bool;
}
