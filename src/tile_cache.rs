use std::fs;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Mutex;

use lru::LruCache;
use tracing::{debug, warn};

use crate::graphics::Bitmap;
use crate::renderer::RenderJob;

/// Job-keyed LRU of rendered tiles, stored as numbered PNG files in a
/// scratch directory. Shared between workers; all state sits behind one
/// lock. Cache trouble is never fatal: every error is logged and swallowed.
pub struct FileSystemTileCache {
    inner: Mutex<CacheState>,
    capacity: usize,
}

struct CacheState {
    map: LruCache<RenderJob, PathBuf>,
    cache_directory: PathBuf,
    file_counter: u64,
}

impl FileSystemTileCache {
    /// A `capacity` of zero disables writes; lookups then always miss.
    pub fn new(capacity: usize, cache_directory: PathBuf) -> Self {
        if let Err(err) = fs::create_dir_all(&cache_directory) {
            warn!(%err, directory = %cache_directory.display(), "could not create tile cache directory");
        }
        let size = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(CacheState {
                map: LruCache::new(size),
                cache_directory,
                file_counter: 0,
            }),
            capacity,
        }
    }

    pub fn contains_key(&self, job: &RenderJob) -> bool {
        match self.inner.lock() {
            Ok(state) => state.map.contains(job),
            Err(_) => false,
        }
    }

    /// Reads and decodes the cached tile for `job`. A tile that no longer
    /// decodes is evicted.
    pub fn get(&self, job: &RenderJob) -> Option<Bitmap> {
        let mut state = self.inner.lock().ok()?;
        let path = state.map.get(job)?.clone();

        let decoded = fs::read(&path)
            .map_err(crate::errors::MapRenderError::from)
            .and_then(|bytes| Bitmap::decode_png(&bytes));
        match decoded {
            Ok(bitmap) => Some(bitmap),
            Err(err) => {
                warn!(%err, path = %path.display(), "evicting corrupt cached tile");
                state.map.pop(job);
                let _ = fs::remove_file(&path);
                None
            }
        }
    }

    /// Writes `bitmap` under a fresh numbered file and records it for `job`.
    pub fn put(&self, job: &RenderJob, bitmap: &Bitmap) {
        if self.capacity == 0 {
            return;
        }
        let Ok(mut state) = self.inner.lock() else {
            return;
        };

        let bytes = match bitmap.encode_png() {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(%err, "could not encode tile for the cache");
                return;
            }
        };

        state.file_counter += 1;
        let path = state
            .cache_directory
            .join(format!("{}.png", state.file_counter));
        if let Err(err) = fs::write(&path, &bytes) {
            warn!(%err, path = %path.display(), "could not write cached tile");
            return;
        }

        if let Some((_, evicted)) = state.map.push(job.clone(), path) {
            debug!(path = %evicted.display(), "tile cache eviction");
            let _ = fs::remove_file(&evicted);
        }
    }

    /// Drops every entry and deletes the backing files.
    pub fn destroy(&self) {
        let Ok(mut state) = self.inner.lock() else {
            return;
        };
        while let Some((_, path)) = state.map.pop_lru() {
            let _ = fs::remove_file(&path);
        }
    }
}
