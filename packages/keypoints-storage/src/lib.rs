//! keypoints-storage - Cross-invocation identifier persistence
//!
//! Everything that must outlive a single compilation unit lives here:
//!
//! 1. **Counter**: the next branch identifier to allocate, persisted in `counter.log`
//! 2. **Branch dictionary**: append-only `branch_dictionary.txt`, one line per [`BranchEntry`]
//! 3. **Counter lock**: optional advisory lock around the read-allocate-write sequence
//!
//! ## Concurrency
//!
//! Without [`CounterLock`], two invocations running at the same time may read the same counter
//! value and hand out overlapping identifiers; the last writer wins. Dictionary appends stay
//! line-atomic regardless, since every record goes out in a single `write` on an `O_APPEND` file.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use keypoints_storage::{CounterStore, DictionaryWriter, FileCounterStore, IdAllocator};
//!
//! let mut store = FileCounterStore::new("counter.log");
//! let mut ids = IdAllocator::new(store.load()?);
//! let id = ids.allocate()?;
//! // ... tag blocks ...
//! DictionaryWriter::new("branch_dictionary.txt").append(&entries)?;
//! store.persist(ids.next())?;
//! ```

pub mod domain;
pub mod error;
pub mod infrastructure;

pub use error::{ErrorKind, Result, StorageError};

pub use domain::{BranchEntry, CounterStore, IdAllocator};
pub use infrastructure::{
    read_dictionary, CounterLock, DictionaryWriter, FileCounterStore, LockOptions,
    MemoryCounterStore, DEFAULT_COUNTER_FILE, DEFAULT_DICTIONARY_FILE,
};
