//! In-process `AssetLibrary` implementation.
//!
//! Stands in for a platform media library in tests and demos: completions are
//! delivered from a spawned thread, so callers observe the same foreign-thread
//! callback behavior a real library exhibits, including configurable latency
//! and a stalled mode in which the completion never arrives.

use bytes::Bytes;
use parking_lot::Mutex;
use source_traits::assets::{AssetError, AssetHandle, AssetLibrary, AssetUri, ResolveCompletion};
use std::collections::HashMap;
use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::debug;

/// Asset library backed by registered in-memory blobs.
#[derive(Default)]
pub struct MemoryAssetLibrary {
    assets: Mutex<HashMap<String, Bytes>>,
    resolve_latency: Option<Duration>,
    stalled: bool,
    resolutions: AtomicUsize,
}

impl MemoryAssetLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a blob under `uri`.
    pub fn with_asset(self, uri: impl Into<String>, data: impl Into<Bytes>) -> Self {
        self.assets.lock().insert(uri.into(), data.into());
        self
    }

    /// Delays every completion by `latency`.
    pub fn with_resolve_latency(mut self, latency: Duration) -> Self {
        self.resolve_latency = Some(latency);
        self
    }

    /// Never delivers completions. Exercises the caller's timeout path.
    pub fn with_stalled_resolution(mut self) -> Self {
        self.stalled = true;
        self
    }

    /// Number of resolutions issued so far.
    pub fn resolution_count(&self) -> usize {
        self.resolutions.load(Ordering::Acquire)
    }
}

impl AssetLibrary for MemoryAssetLibrary {
    fn resolve(&self, uri: &AssetUri, completion: ResolveCompletion) {
        self.resolutions.fetch_add(1, Ordering::AcqRel);
        if self.stalled {
            debug!(uri = %uri, "stalled library swallowing resolution");
            return;
        }

        let result = {
            let assets = self.assets.lock();
            match assets.get(uri.as_str()) {
                Some(bytes) => Ok(AssetHandle {
                    id: uri.as_str().to_string(),
                    byte_length: bytes.len() as u64,
                }),
                None => Err(AssetError::NotFound(uri.to_string())),
            }
        };

        // Deliver from a thread the caller does not control, like a real
        // platform library would.
        let latency = self.resolve_latency;
        std::thread::spawn(move || {
            if let Some(latency) = latency {
                std::thread::sleep(latency);
            }
            completion(result);
        });
    }

    fn read_bytes(&self, handle: &AssetHandle, range: Range<u64>) -> Result<Bytes, AssetError> {
        let assets = self.assets.lock();
        let bytes = assets
            .get(&handle.id)
            .ok_or_else(|| AssetError::NotFound(handle.id.clone()))?;
        let start = range.start.min(bytes.len() as u64) as usize;
        let end = range.end.min(bytes.len() as u64) as usize;
        Ok(bytes.slice(start..end))
    }
}
