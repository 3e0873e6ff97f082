//! Infrastructure layer - file-backed adapters
//!
//! - `counter`: `counter.log` and in-memory counter stores
//! - `lock`: advisory lock file guarding the counter
//! - `dictionary`: append-only `branch_dictionary.txt`

pub mod counter;
pub mod dictionary;
pub mod lock;

pub use counter::{FileCounterStore, MemoryCounterStore, DEFAULT_COUNTER_FILE};
pub use dictionary::{read_dictionary, DictionaryWriter, DEFAULT_DICTIONARY_FILE};
pub use lock::{CounterLock, LockOptions};
