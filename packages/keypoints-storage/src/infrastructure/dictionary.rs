//! Branch dictionary file
//!
//! Append-only text, one `BranchEntry` per line, accumulated across every
//! invocation that shares the file.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::domain::BranchEntry;
use crate::Result;

/// Default dictionary file name
pub const DEFAULT_DICTIONARY_FILE: &str = "branch_dictionary.txt";

/// Appends branch entries to the dictionary file
#[derive(Debug, Clone)]
pub struct DictionaryWriter {
    path: PathBuf,
}

impl DictionaryWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `entries` in order; returns the number of lines written
    ///
    /// Each record is formatted up front and written with a single call, so
    /// concurrent appenders interleave whole lines, never partial ones.
    pub fn append(&self, entries: &[BranchEntry]) -> Result<usize> {
        if entries.is_empty() {
            return Ok(0);
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        for entry in entries {
            let line = format!("{}\n", entry);
            file.write_all(line.as_bytes())?;
        }

        debug!("appended {} entries to {}", entries.len(), self.path.display());
        Ok(entries.len())
    }
}

/// Parse a dictionary file in append order; a missing file has no entries
pub fn read_dictionary(path: impl AsRef<Path>) -> Result<Vec<BranchEntry>> {
    let content = match fs::read_to_string(path.as_ref()) {
        Ok(content) => content,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err.into()),
    };

    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::parse)
        .collect()
}
