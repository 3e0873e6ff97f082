//! keypoints-runtime - trace logging for instrumented programs
//!
//! The instrumentation pass inserts calls to the two `extern "C"` entry points
//! below; an instrumented program links this library (as a `cdylib` or static
//! archive) to resolve them. Every call opens the trace file in append mode,
//! writes one line and closes it again, so the trace survives crashes of the
//! program under test.
//!
//! The trace file is `branch_trace.txt` in the working directory unless
//! `KEYPOINTS_TRACE_FILE` names another path.

use std::ffi::c_void;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::warn;

pub mod event;

pub use event::{read_trace, TraceError, TraceEvent};

/// Default trace file name
pub const DEFAULT_TRACE_FILE: &str = "branch_trace.txt";

/// Environment variable overriding the trace file location
pub const TRACE_FILE_ENV: &str = "KEYPOINTS_TRACE_FILE";

/// Symbol the pass calls at the entry of every tagged block
pub const LOG_BRANCH_SYMBOL: &str = "keypoints_log_branch";

/// Symbol the pass calls before every indirect call
pub const LOG_FUNCTION_POINTER_SYMBOL: &str = "keypoints_log_function_pointer";

/// Trace file currently in effect
pub fn trace_path() -> PathBuf {
    std::env::var_os(TRACE_FILE_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_TRACE_FILE))
}

/// Append one event to the trace at `path`
pub fn append_event(path: &Path, event: TraceEvent) -> io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let line = format!("{}\n", event);
    file.write_all(line.as_bytes())
}

fn record(event: TraceEvent) {
    let path = trace_path();
    // Errors cannot cross the C ABI; the program under test must keep running.
    if let Err(err) = append_event(&path, event) {
        warn!("dropped trace event {} ({}): {}", event, path.display(), err);
    }
}

/// Record that execution entered the block tagged `id`
#[no_mangle]
pub extern "C" fn keypoints_log_branch(id: u32) {
    record(TraceEvent::Branch(id));
}

/// Record the resolved target of an indirect call
#[no_mangle]
pub extern "C" fn keypoints_log_function_pointer(target: *const c_void) {
    record(TraceEvent::FunctionPointer(target as usize));
}
