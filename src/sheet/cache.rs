//! Read-through workbook cache keyed by path and modification time.
//!
//! The cache is owned by whoever drives the pipeline (the CLI for one command,
//! the server loop for its lifetime). Snapshots are immutable `Arc<Workbook>`s;
//! a changed mtime drops the entry and the next access reloads the file.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use crate::error::LookupError;
use crate::sheet::{load_workbook, Workbook};

#[derive(Debug)]
struct CachedWorkbook {
    modified: Option<SystemTime>,
    workbook: Arc<Workbook>,
}

#[derive(Debug, Default)]
pub struct WorkbookCache {
    entries: HashMap<PathBuf, CachedWorkbook>,
    loads: usize,
}

impl WorkbookCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached snapshot for `path`, loading it when absent or stale.
    pub fn get_or_load(&mut self, path: &Path) -> Result<Arc<Workbook>, LookupError> {
        let modified = match fs::metadata(path) {
            Ok(meta) => meta.modified().ok(),
            Err(_) => {
                self.entries.remove(path);
                return Err(LookupError::SourceMissing {
                    path: path.to_path_buf(),
                });
            }
        };

        if let Some(entry) = self.entries.get(path) {
            if entry.modified == modified {
                tracing::debug!(path = %path.display(), "workbook cache hit");
                return Ok(Arc::clone(&entry.workbook));
            }
            tracing::info!(path = %path.display(), "source modified; reloading workbook");
        }

        let workbook = Arc::new(load_workbook(path)?);
        self.loads += 1;
        self.entries.insert(
            path.to_path_buf(),
            CachedWorkbook {
                modified,
                workbook: Arc::clone(&workbook),
            },
        );
        Ok(workbook)
    }

    pub fn invalidate(&mut self, path: &Path) {
        self.entries.remove(path);
    }

    /// Number of times a workbook was parsed from disk.
    pub fn load_count(&self) -> usize {
        self.loads
    }
}
