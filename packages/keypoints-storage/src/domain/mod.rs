//! Domain layer for branch identifier persistence
//!
//! # Domain Models
//!
//! - `BranchEntry`: one instrumented control-flow node, immutable once created
//! - `IdAllocator`: in-memory view of the counter for one compilation unit
//!
//! # Port Trait
//!
//! - `CounterStore`: where the counter lives between invocations

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Result, StorageError};

// ═══════════════════════════════════════════════════════════════════════════
// Domain Models
// ═══════════════════════════════════════════════════════════════════════════

/// Dictionary record for one tagged control-flow node
///
/// Serialized as `br_<id>: <source_file>, <condition_line>, <block_start_line>`.
/// A block without any located statement records `-1` as its start line.
///
/// # Examples
///
/// ```rust
/// use keypoints_storage::BranchEntry;
///
/// let entry = BranchEntry::new(7, "main.c", 12, Some(13));
/// assert_eq!(entry.to_string(), "br_7: main.c, 12, 13");
///
/// let synthetic = BranchEntry::new(8, "main.c", 12, None);
/// assert_eq!(synthetic.to_string(), "br_8: main.c, 12, -1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchEntry {
    /// Globally unique branch identifier
    pub id: u32,
    /// Compilation unit that produced the entry
    pub source_file: String,
    /// Line of the branching/switching statement
    pub condition_line: u32,
    /// Line of the first located statement in the target block
    pub block_start_line: Option<u32>,
}

impl BranchEntry {
    pub fn new(
        id: u32,
        source_file: impl Into<String>,
        condition_line: u32,
        block_start_line: Option<u32>,
    ) -> Self {
        Self {
            id,
            source_file: source_file.into(),
            condition_line,
            block_start_line,
        }
    }
}

impl fmt::Display for BranchEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "br_{}: {}, {}, ",
            self.id, self.source_file, self.condition_line
        )?;
        match self.block_start_line {
            Some(line) => write!(f, "{}", line),
            None => f.write_str("-1"),
        }
    }
}

impl FromStr for BranchEntry {
    type Err = StorageError;

    fn from_str(line: &str) -> Result<Self> {
        let malformed = || StorageError::dictionary(line);

        let rest = line.strip_prefix("br_").ok_or_else(malformed)?;
        let (id, rest) = rest.split_once(": ").ok_or_else(malformed)?;
        let id = id.parse::<u32>().map_err(|_| malformed())?;

        // Source file names may themselves contain ", " so split from the right.
        let mut fields = rest.rsplitn(3, ", ");
        let start = fields.next().ok_or_else(malformed)?;
        let condition = fields.next().ok_or_else(malformed)?;
        let source_file = fields.next().ok_or_else(malformed)?;

        let condition_line = condition.parse::<u32>().map_err(|_| malformed())?;
        let block_start_line = match start {
            "-1" => None,
            other => Some(other.parse::<u32>().map_err(|_| malformed())?),
        };

        Ok(Self {
            id,
            source_file: source_file.to_string(),
            condition_line,
            block_start_line,
        })
    }
}

/// Hands out consecutive identifiers starting from a persisted counter value
///
/// Allocation never reuses an id and never wraps: running out of the 32-bit
/// id space is reported instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    pub fn new(next: u32) -> Self {
        Self { next }
    }

    /// Return the current counter value and advance it by one
    pub fn allocate(&mut self) -> Result<u32> {
        self.allocate_range(1)
    }

    /// Reserve `n` contiguous ids and return the first one
    pub fn allocate_range(&mut self, n: u32) -> Result<u32> {
        let start = self.next;
        self.next = start
            .checked_add(n)
            .ok_or_else(|| StorageError::id_space_exhausted(start, n))?;
        Ok(start)
    }

    /// Next id that would be allocated (the value to persist)
    pub fn next(&self) -> u32 {
        self.next
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Port Trait: CounterStore
// ═══════════════════════════════════════════════════════════════════════════

/// Persistent home of the "next identifier" counter
///
/// # Implementations
///
/// - `FileCounterStore`: decimal text in `counter.log`
/// - `MemoryCounterStore`: process-local, for tests and embedding
pub trait CounterStore {
    /// Read the persisted counter
    ///
    /// # Errors
    ///
    /// Returns `ErrorKind::CorruptCounter` if state exists but is not a counter.
    /// A missing state means a first-ever run and yields `0`.
    fn load(&mut self) -> Result<u32>;

    /// Overwrite the persisted counter with `next`
    fn persist(&mut self, next: u32) -> Result<()>;
}

impl<S: CounterStore + ?Sized> CounterStore for &mut S {
    fn load(&mut self) -> Result<u32> {
        (**self).load()
    }

    fn persist(&mut self, next: u32) -> Result<()> {
        (**self).persist(next)
    }
}
