//! Explicit dataset caching.
//!
//! The source file is read once and the parsed dataset is shared from then
//! on; nothing reloads behind the caller's back. Picking up a changed file
//! takes an explicit [`DatasetCache::invalidate`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use absentia_core::config::ColumnMap;
use absentia_core::error::Result;
use absentia_core::models::Dataset;

use crate::reader;

/// Caches the parsed dataset for one source file.
pub struct DatasetCache {
    path: PathBuf,
    columns: ColumnMap,
    cached: Option<Arc<Dataset>>,
}

impl DatasetCache {
    pub fn new(path: impl Into<PathBuf>, columns: ColumnMap) -> Self {
        Self {
            path: path.into(),
            columns,
            cached: None,
        }
    }

    /// The source file this cache is bound to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `true` when a parsed dataset is held.
    pub fn is_loaded(&self) -> bool {
        self.cached.is_some()
    }

    /// The cached dataset, loading it from disk on the first call.
    ///
    /// A failed load leaves the cache empty, so the next call retries.
    pub fn get_or_load(&mut self) -> Result<Arc<Dataset>> {
        if let Some(dataset) = &self.cached {
            debug!(path = %self.path.display(), "dataset cache hit");
            return Ok(Arc::clone(dataset));
        }
        let dataset = Arc::new(reader::load_dataset(&self.path, &self.columns)?);
        self.cached = Some(Arc::clone(&dataset));
        Ok(dataset)
    }

    /// Drop the cached dataset; the next access reloads from disk.
    pub fn invalidate(&mut self) {
        debug!(path = %self.path.display(), "dataset cache invalidated");
        self.cached = None;
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
