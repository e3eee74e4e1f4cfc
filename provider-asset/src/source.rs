//! # Asset Data Source
//!
//! Resolves a media-library asset URI to a byte stream. The platform's
//! resolution primitive is always asynchronous: the outcome arrives through a
//! completion callback on a thread the library controls. In synchronous-open
//! mode this adapter blocks the calling thread on a [`BoundedWaitLock`] until
//! that callback terminalizes the state; in asynchronous mode it never
//! blocks and reads report not-ready until resolution completes.

use core_locking::{BoundedWaitLock, Locking, NullLock};
use source_traits::assets::{AssetError, AssetHandle, AssetLibrary, AssetUri};
use source_traits::{BlobDataSource, Result, SourceError, DEFAULT_OPEN_TIMEOUT};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

enum AssetState {
    Unopened,
    Opening,
    Open { handle: AssetHandle, cursor: u64 },
    Failed(SourceError),
    Closed,
}

impl AssetState {
    /// Terminal states must never be overwritten by a late completion.
    fn is_terminal(&self) -> bool {
        matches!(
            self,
            AssetState::Open { .. } | AssetState::Failed(_) | AssetState::Closed
        )
    }
}

/// Byte stream over a media-library asset.
///
/// # Examples
///
/// ```
/// use provider_asset::{AssetDataSource, MemoryAssetLibrary};
/// use source_traits::BlobDataSource;
/// use std::sync::Arc;
///
/// let library = Arc::new(MemoryAssetLibrary::new().with_asset("asset://song", &b"pcm"[..]));
/// let mut source = AssetDataSource::new(library, "asset://song");
/// source.set_open_synchronously(true);
/// source.open()?;
/// assert_eq!(source.length(), Some(3));
///
/// let mut buf = [0u8; 8];
/// assert_eq!(source.read(&mut buf)?, 3);
/// source.close();
/// # Ok::<(), source_traits::SourceError>(())
/// ```
pub struct AssetDataSource {
    uri: AssetUri,
    library: Arc<dyn AssetLibrary>,
    open_synchronously: bool,
    open_timeout: Duration,
    // Swapped at open() for the lock matching who waits: BoundedWaitLock
    // when the opener blocks on the completion, NullLock when nobody does.
    // One lock per handle; never shared across instances.
    shared: Arc<dyn Locking<AssetState>>,
}

impl AssetDataSource {
    /// Creates a source for `uri` backed by `library`. Opens asynchronously
    /// unless configured otherwise.
    pub fn new(library: Arc<dyn AssetLibrary>, uri: impl Into<AssetUri>) -> Self {
        Self {
            uri: uri.into(),
            library,
            open_synchronously: false,
            open_timeout: DEFAULT_OPEN_TIMEOUT,
            shared: Arc::new(NullLock::new(AssetState::Unopened)),
        }
    }

    /// Ceiling on how long a synchronous `open()` may block. Past the
    /// ceiling the handle fails with a timeout, distinct from a
    /// platform-reported failure.
    pub fn with_open_timeout(mut self, open_timeout: Duration) -> Self {
        self.open_timeout = open_timeout;
        self
    }

    pub fn uri(&self) -> &AssetUri {
        &self.uri
    }
}

impl BlobDataSource for AssetDataSource {
    fn open_synchronously(&self) -> bool {
        self.open_synchronously
    }

    fn set_open_synchronously(&mut self, open_synchronously: bool) {
        self.open_synchronously = open_synchronously;
    }

    fn open(&mut self) -> Result<()> {
        {
            let guard = self.shared.lock();
            match &*guard {
                AssetState::Unopened => {}
                AssetState::Opening | AssetState::Open { .. } => return Ok(()),
                AssetState::Failed(err) => return Err(err.clone()),
                AssetState::Closed => return Err(SourceError::Closed),
            }
        }

        // Lock choice mirrors who waits: the synchronous opener blocks on
        // the completion; in asynchronous mode nobody ever waits.
        let shared: Arc<dyn Locking<AssetState>> = if self.open_synchronously {
            Arc::new(BoundedWaitLock::new(AssetState::Opening))
        } else {
            Arc::new(NullLock::new(AssetState::Opening))
        };
        self.shared = shared.clone();

        debug!(uri = %self.uri, "requesting asset resolution");
        let completion_shared = shared.clone();
        let uri = self.uri.clone();
        self.library.resolve(
            &self.uri,
            Box::new(move |result| {
                let mut guard = completion_shared.lock();
                if guard.is_terminal() {
                    // The opener gave up (timeout) or the source was closed.
                    debug!(uri = %uri, "discarding late asset resolution");
                    return;
                }
                *guard = match result {
                    Ok(handle) => {
                        debug!(uri = %uri, length = handle.byte_length, "asset resolved");
                        AssetState::Open { handle, cursor: 0 }
                    }
                    Err(err) => {
                        warn!(uri = %uri, error = %err, "asset resolution failed");
                        AssetState::Failed(open_error(err))
                    }
                };
                drop(guard);
                completion_shared.signal();
            }),
        );

        if !self.open_synchronously {
            return Ok(());
        }

        let mut guard = shared.lock();
        while matches!(&*guard, AssetState::Opening) {
            if !shared.wait_with_timeout(&mut guard, self.open_timeout) {
                let err = SourceError::OpenTimeout(self.open_timeout);
                warn!(uri = %self.uri, timeout = ?self.open_timeout, "synchronous asset open timed out");
                *guard = AssetState::Failed(err.clone());
                return Err(err);
            }
        }
        match &*guard {
            AssetState::Open { .. } => Ok(()),
            AssetState::Failed(err) => Err(err.clone()),
            // The completion only ever terminalizes to Open or Failed.
            _ => Err(SourceError::NotReady),
        }
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut guard = self.shared.lock();
        match &mut *guard {
            // Asynchronous mode never blocks the caller; readiness is the
            // caller's to poll.
            AssetState::Unopened | AssetState::Opening => Err(SourceError::NotReady),
            AssetState::Open { handle, cursor } => {
                if buf.is_empty() {
                    return Ok(0);
                }
                let remaining = handle.byte_length.saturating_sub(*cursor);
                if remaining == 0 {
                    return Ok(0);
                }
                let want = remaining.min(buf.len() as u64);
                let bytes = self
                    .library
                    .read_bytes(handle, *cursor..*cursor + want)
                    .map_err(|err| SourceError::ReadFailed(err.to_string()))?;
                let n = bytes.len().min(buf.len());
                buf[..n].copy_from_slice(&bytes[..n]);
                *cursor += n as u64;
                Ok(n)
            }
            AssetState::Failed(err) => Err(err.clone()),
            AssetState::Closed => Err(SourceError::Closed),
        }
    }

    fn length(&self) -> Option<u64> {
        match &*self.shared.lock() {
            AssetState::Open { handle, .. } => Some(handle.byte_length),
            _ => None,
        }
    }

    fn close(&mut self) {
        let mut guard = self.shared.lock();
        if matches!(&*guard, AssetState::Closed) {
            return;
        }
        debug!(uri = %self.uri, "closing asset source");
        *guard = AssetState::Closed;
    }

    fn is_open_completed(&self) -> bool {
        matches!(&*self.shared.lock(), AssetState::Open { .. })
    }

    fn has_bytes_available(&self) -> bool {
        match &*self.shared.lock() {
            AssetState::Open { handle, cursor } => *cursor < handle.byte_length,
            _ => false,
        }
    }

    fn is_at_end(&self) -> bool {
        match &*self.shared.lock() {
            AssetState::Open { handle, cursor } => *cursor >= handle.byte_length,
            _ => false,
        }
    }
}

fn open_error(err: AssetError) -> SourceError {
    match err {
        AssetError::NotFound(uri) => SourceError::NotFound { path: uri },
        AssetError::AccessDenied(uri) => SourceError::PermissionDenied { path: uri },
        AssetError::Library(message) => SourceError::OpenFailed(message),
    }
}
