//! # File Data Source
//!
//! Resolves a local file path to a byte stream. The filesystem open either
//! runs on the calling thread (`open_synchronously = true`) or is submitted
//! to a background spawner, in which case the first `read()` blocks on a
//! [`BoundedWaitLock`] until the background open terminalizes the state.

use crate::fs::StdFileSystem;
use core_locking::{BoundedWaitLock, Locking, NullLock};
use source_traits::fs::{FileHandle, FileSystem};
use source_traits::{
    BlobDataSource, Result, SourceError, TaskSpawner, ThreadSpawner, DEFAULT_OPEN_TIMEOUT,
};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

enum FileState {
    Unopened,
    Opening,
    Open(OpenFile),
    Failed(SourceError),
    Closed,
}

impl FileState {
    /// Terminal states must never be overwritten by a late open result.
    fn is_terminal(&self) -> bool {
        matches!(
            self,
            FileState::Open(_) | FileState::Failed(_) | FileState::Closed
        )
    }
}

struct OpenFile {
    handle: Box<dyn FileHandle>,
    length: u64,
    position: u64,
}

/// Byte stream over a local file.
///
/// # Examples
///
/// ```no_run
/// use provider_file::FileDataSource;
/// use source_traits::BlobDataSource;
///
/// let mut source = FileDataSource::new("/music/track.flac");
/// source.set_open_synchronously(true);
/// source.open()?;
///
/// let mut buf = [0u8; 4096];
/// while source.read(&mut buf)? > 0 {
///     // consume bytes
/// }
/// source.close();
/// # Ok::<(), source_traits::SourceError>(())
/// ```
pub struct FileDataSource {
    path: PathBuf,
    file_system: Arc<dyn FileSystem>,
    spawner: Arc<dyn TaskSpawner>,
    open_synchronously: bool,
    open_timeout: Duration,
    // Starts as a NullLock; a deferred open swaps in a BoundedWaitLock so
    // the first read can rendezvous with the background task. One lock per
    // handle; never shared across instances.
    shared: Arc<dyn Locking<FileState>>,
}

impl FileDataSource {
    /// Creates a source for `path` with the default filesystem, spawner, and
    /// open timeout. Opens asynchronously unless configured otherwise.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file_system: Arc::new(StdFileSystem),
            spawner: Arc::new(ThreadSpawner),
            open_synchronously: false,
            open_timeout: DEFAULT_OPEN_TIMEOUT,
            shared: Arc::new(NullLock::new(FileState::Unopened)),
        }
    }

    /// Replaces the filesystem service (injection point for tests and
    /// sandboxed hosts).
    pub fn with_file_system(mut self, file_system: Arc<dyn FileSystem>) -> Self {
        self.file_system = file_system;
        self
    }

    /// Replaces the background spawner used by deferred opens.
    pub fn with_spawner(mut self, spawner: Arc<dyn TaskSpawner>) -> Self {
        self.spawner = spawner;
        self
    }

    /// Ceiling on how long the first `read()` may block on a deferred open.
    pub fn with_open_timeout(mut self, open_timeout: Duration) -> Self {
        self.open_timeout = open_timeout;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BlobDataSource for FileDataSource {
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
                FileState::Unopened => {}
                FileState::Opening | FileState::Open(_) => return Ok(()),
                FileState::Failed(err) => return Err(err.clone()),
                FileState::Closed => return Err(SourceError::Closed),
            }
        }

        if self.open_synchronously {
            // No cross-thread handoff on this path; the initial NullLock
            // stays in place.
            let result = open_file(self.file_system.as_ref(), &self.path);
            let mut guard = self.shared.lock();
            match result {
                Ok(open) => {
                    debug!(path = %self.path.display(), length = open.length, "file opened");
                    *guard = FileState::Open(open);
                    Ok(())
                }
                Err(err) => {
                    warn!(path = %self.path.display(), error = %err, "file open failed");
                    *guard = FileState::Failed(err.clone());
                    Err(err)
                }
            }
        } else {
            let shared: Arc<dyn Locking<FileState>> =
                Arc::new(BoundedWaitLock::new(FileState::Opening));
            self.shared = shared.clone();

            let file_system = self.file_system.clone();
            let path = self.path.clone();
            debug!(path = %self.path.display(), "deferring file open to background");
            self.spawner.spawn_blocking(Box::new(move || {
                let result = open_file(file_system.as_ref(), &path);
                let mut guard = shared.lock();
                if guard.is_terminal() {
                    // The reader gave up (timeout) or the source was closed.
                    debug!(path = %path.display(), "discarding late file open result");
                    return;
                }
                *guard = match result {
                    Ok(open) => FileState::Open(open),
                    Err(err) => {
                        warn!(path = %path.display(), error = %err, "deferred file open failed");
                        FileState::Failed(err)
                    }
                };
                drop(guard);
                shared.signal();
            }));
            Ok(())
        }
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut guard = self.shared.lock();
        loop {
            match &mut *guard {
                FileState::Unopened => return Err(SourceError::NotReady),
                FileState::Opening => {
                    if !self.shared.wait_with_timeout(&mut guard, self.open_timeout) {
                        let err = SourceError::OpenTimeout(self.open_timeout);
                        warn!(path = %self.path.display(), "deferred file open timed out");
                        *guard = FileState::Failed(err.clone());
                        return Err(err);
                    }
                    // Signaled (or spurious wakeup): re-check the state.
                }
                FileState::Open(open) => {
                    if buf.is_empty() {
                        return Ok(0);
                    }
                    let read = open.handle.read(buf).map_err(|err| {
                        SourceError::ReadFailed(format!("{}: {err}", self.path.display()))
                    })?;
                    open.position += read as u64;
                    return Ok(read);
                }
                FileState::Failed(err) => return Err(err.clone()),
                FileState::Closed => return Err(SourceError::Closed),
            }
        }
    }

    fn length(&self) -> Option<u64> {
        match &*self.shared.lock() {
            FileState::Open(open) => Some(open.length),
            _ => None,
        }
    }

    fn close(&mut self) {
        let mut guard = self.shared.lock();
        if matches!(&*guard, FileState::Closed) {
            return;
        }
        debug!(path = %self.path.display(), "closing file source");
        *guard = FileState::Closed;
    }

    fn is_open_completed(&self) -> bool {
        matches!(&*self.shared.lock(), FileState::Open(_))
    }

    fn has_bytes_available(&self) -> bool {
        match &*self.shared.lock() {
            FileState::Open(open) => open.position < open.length,
            _ => false,
        }
    }

    fn is_at_end(&self) -> bool {
        match &*self.shared.lock() {
            FileState::Open(open) => open.position >= open.length,
            _ => false,
        }
    }
}

fn open_file(file_system: &dyn FileSystem, path: &Path) -> Result<OpenFile> {
    match file_system.open_for_reading(path) {
        Ok(handle) => {
            let length = handle.len();
            Ok(OpenFile {
                handle,
                length,
                position: 0,
            })
        }
        Err(err) => Err(classify_open_error(path, err)),
    }
}

fn classify_open_error(path: &Path, err: io::Error) -> SourceError {
    let path = path.display().to_string();
    match err.kind() {
        io::ErrorKind::NotFound => SourceError::NotFound { path },
        io::ErrorKind::PermissionDenied => SourceError::PermissionDenied { path },
        _ => SourceError::OpenFailed(format!("{path}: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::mock;
    use std::io::Write;
    use std::time::Instant;

    mock! {
        Fs {}
        impl FileSystem for Fs {
            fn open_for_reading(&self, path: &Path) -> io::Result<Box<dyn FileHandle>>;
        }
    }

    struct MemoryFileHandle {
        data: Vec<u8>,
        pos: usize,
    }

    impl MemoryFileHandle {
        fn new(data: &[u8]) -> Box<dyn FileHandle> {
            Box::new(Self {
                data: data.to_vec(),
                pos: 0,
            })
        }
    }

    impl FileHandle for MemoryFileHandle {
        fn len(&self) -> u64 {
            self.data.len() as u64
        }

        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let remaining = &self.data[self.pos..];
            let n = remaining.len().min(buf.len());
            buf[..n].copy_from_slice(&remaining[..n]);
            self.pos += n;
            Ok(n)
        }
    }

    fn ten_byte_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"0123456789").unwrap();
        file
    }

    #[test]
    fn synchronous_open_reads_ten_bytes_in_chunks() {
        let file = ten_byte_file();
        let mut source = FileDataSource::new(file.path());
        source.set_open_synchronously(true);

        source.open().unwrap();
        assert_eq!(source.length(), Some(10));
        assert!(source.is_open_completed());
        assert!(source.has_bytes_available());

        let mut buf = [0u8; 4];
        assert_eq!(source.read(&mut buf).unwrap(), 4);
        assert_eq!(&buf, b"0123");
        assert_eq!(source.read(&mut buf).unwrap(), 4);
        assert_eq!(&buf, b"4567");
        assert_eq!(source.read(&mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], b"89");
        assert_eq!(source.read(&mut buf).unwrap(), 0);

        assert!(source.is_at_end());
        assert!(!source.has_bytes_available());
        source.close();
    }

    #[test]
    fn read_before_open_is_not_ready() {
        let file = ten_byte_file();
        let mut source = FileDataSource::new(file.path());

        let mut buf = [0u8; 4];
        assert_eq!(source.read(&mut buf), Err(SourceError::NotReady));
        assert_eq!(source.length(), None);
        assert!(!source.is_open_completed());
    }

    #[test]
    fn missing_path_reports_not_found() {
        let mut source = FileDataSource::new("/no/such/file");
        source.set_open_synchronously(true);

        match source.open() {
            Err(SourceError::NotFound { path }) => assert_eq!(path, "/no/such/file"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn failed_open_is_not_reattempted() {
        let mut fs = MockFs::new();
        fs.expect_open_for_reading()
            .times(1)
            .returning(|_| Err(io::Error::new(io::ErrorKind::NotFound, "gone")));

        let mut source = FileDataSource::new("/flaky/path").with_file_system(Arc::new(fs));
        source.set_open_synchronously(true);

        let first = source.open().unwrap_err();
        // A second open resurfaces the recorded error; the mock's call count
        // verifies the filesystem was not consulted again.
        let second = source.open().unwrap_err();
        assert_eq!(first, second);
        assert!(matches!(first, SourceError::NotFound { .. }));
    }

    #[test]
    fn deferred_open_returns_immediately_and_first_read_blocks() {
        let mut fs = MockFs::new();
        fs.expect_open_for_reading().times(1).returning(|_| {
            std::thread::sleep(Duration::from_millis(100));
            Ok(MemoryFileHandle::new(b"0123456789"))
        });

        let mut source = FileDataSource::new("/slow/file").with_file_system(Arc::new(fs));
        assert!(!source.open_synchronously());

        let started = Instant::now();
        source.open().unwrap();
        assert!(started.elapsed() < Duration::from_millis(50), "open must not block");
        assert_eq!(source.length(), None);

        let mut buf = [0u8; 10];
        assert_eq!(source.read(&mut buf).unwrap(), 10);
        assert_eq!(&buf, b"0123456789");
        assert_eq!(source.length(), Some(10));
        assert!(started.elapsed() >= Duration::from_millis(100));
    }

    #[test]
    fn deferred_open_matches_synchronous_open() {
        let file = ten_byte_file();

        let read_all = |mut source: FileDataSource| {
            source.open().unwrap();
            let mut collected = Vec::new();
            let mut buf = [0u8; 3];
            loop {
                let n = source.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                collected.extend_from_slice(&buf[..n]);
            }
            source.close();
            collected
        };

        let mut sync_source = FileDataSource::new(file.path());
        sync_source.set_open_synchronously(true);
        let sync_bytes = read_all(sync_source);

        let deferred_source = FileDataSource::new(file.path());
        let deferred_bytes = read_all(deferred_source);

        assert_eq!(sync_bytes, deferred_bytes);
        assert_eq!(sync_bytes, b"0123456789");
    }

    #[test]
    fn deferred_open_timeout_terminalizes_and_late_result_is_discarded() {
        let mut fs = MockFs::new();
        fs.expect_open_for_reading().times(1).returning(|_| {
            std::thread::sleep(Duration::from_millis(200));
            Ok(MemoryFileHandle::new(b"0123456789"))
        });

        let mut source = FileDataSource::new("/very/slow/file")
            .with_file_system(Arc::new(fs))
            .with_open_timeout(Duration::from_millis(40));

        source.open().unwrap();
        let mut buf = [0u8; 4];
        let err = source.read(&mut buf).unwrap_err();
        assert!(err.is_timeout());

        // Let the background open finish; its result must not overwrite the
        // terminal Failed state.
        std::thread::sleep(Duration::from_millis(250));
        assert_eq!(source.length(), None);
        assert_eq!(source.open().unwrap_err(), err);
    }

    #[test]
    fn close_is_idempotent_and_reads_fail_afterwards() {
        let file = ten_byte_file();
        let mut source = FileDataSource::new(file.path());
        source.set_open_synchronously(true);
        source.open().unwrap();

        source.close();
        source.close();

        let mut buf = [0u8; 4];
        assert_eq!(source.read(&mut buf), Err(SourceError::Closed));
        assert_eq!(source.length(), None);
    }

    #[test]
    fn open_after_close_fails_closed() {
        let file = ten_byte_file();
        let mut source = FileDataSource::new(file.path());
        source.set_open_synchronously(true);

        source.close();
        assert_eq!(source.open(), Err(SourceError::Closed));
    }
}
