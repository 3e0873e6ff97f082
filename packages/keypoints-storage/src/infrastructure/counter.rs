//! Counter stores
//!
//! `counter.log` holds the decimal text of the next identifier to allocate.
//! Absence means a first-ever run. Anything that is not a decimal counter is
//! fatal: resetting to zero would collide with ids already in the dictionary.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::domain::CounterStore;
use crate::{Result, StorageError};

/// Default counter state file name
pub const DEFAULT_COUNTER_FILE: &str = "counter.log";

/// Counter persisted as decimal text in a file
#[derive(Debug, Clone)]
pub struct FileCounterStore {
    path: PathBuf,
}

impl FileCounterStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory that holds the staging file; must share a filesystem with `path`
    fn staging_dir(&self) -> &Path {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        }
    }
}

impl CounterStore for FileCounterStore {
    fn load(&mut self) -> Result<u32> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("no counter state at {}, starting from 0", self.path.display());
                return Ok(0);
            }
            Err(err) => return Err(err.into()),
        };

        let next = content
            .trim()
            .parse::<u32>()
            .map_err(|err| StorageError::corrupt_counter(self.path.display(), &content).with_source(err))?;

        debug!("loaded counter {} from {}", next, self.path.display());
        Ok(next)
    }

    fn persist(&mut self, next: u32) -> Result<()> {
        // Each writer stages in its own file and renames it over the counter,
        // so readers only ever see a complete value. Concurrent writers race
        // on the rename alone: the last one wins.
        let mut staging = NamedTempFile::new_in(self.staging_dir())?;
        staging.write_all(next.to_string().as_bytes())?;
        staging.persist(&self.path).map_err(|err| err.error)?;

        debug!("persisted counter {} to {}", next, self.path.display());
        Ok(())
    }
}

/// Process-local counter store
#[derive(Debug, Clone, Default)]
pub struct MemoryCounterStore {
    next: Option<u32>,
}

impl MemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_next(next: u32) -> Self {
        Self { next: Some(next) }
    }

    /// Last persisted value, if any
    pub fn persisted(&self) -> Option<u32> {
        self.next
    }
}

impl CounterStore for MemoryCounterStore {
    fn load(&mut self) -> Result<u32> {
        Ok(self.next.unwrap_or(0))
    }

    fn persist(&mut self, next: u32) -> Result<()> {
        self.next = Some(next);
        Ok(())
    }
}
