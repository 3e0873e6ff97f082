//! Trace events
//!
//! One event per line in the trace file: `br_<id>` for a taken branch target,
//! `func_0x<hex>` for the resolved target of an indirect call.

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::str::FromStr;

use thiserror::Error;

/// Trace error type
#[derive(Debug, Error)]
pub enum TraceError {
    /// Line is neither a branch nor a function pointer event
    #[error("Malformed trace line {line_no}: {line:?}")]
    Malformed { line_no: usize, line: String },

    /// Text that is not a trace event
    #[error("Unrecognized trace event {0:?}")]
    UnknownEvent(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Single runtime event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraceEvent {
    /// Execution entered the block tagged with this id
    Branch(u32),
    /// An indirect call resolved to this address
    FunctionPointer(usize),
}

impl fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceEvent::Branch(id) => write!(f, "br_{}", id),
            TraceEvent::FunctionPointer(target) => write!(f, "func_0x{:x}", target),
        }
    }
}

impl FromStr for TraceEvent {
    type Err = TraceError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let unknown = || TraceError::UnknownEvent(line.to_string());

        if let Some(id) = line.strip_prefix("br_") {
            return id.parse().map(TraceEvent::Branch).map_err(|_| unknown());
        }
        if let Some(hex) = line.strip_prefix("func_0x") {
            return usize::from_str_radix(hex, 16)
                .map(TraceEvent::FunctionPointer)
                .map_err(|_| unknown());
        }
        Err(unknown())
    }
}

/// Parse a trace file in chronological order; a missing file has no events
pub fn read_trace(path: impl AsRef<Path>) -> Result<Vec<TraceEvent>, TraceError> {
    let content = match fs::read_to_string(path.as_ref()) {
        Ok(content) => content,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err.into()),
    };

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.is_empty())
        .map(|(idx, line)| match line.parse::<TraceEvent>() {
            Err(TraceError::UnknownEvent(line)) => Err(TraceError::Malformed {
                line_no: idx + 1,
                line,
            }),
            parsed => parsed,
        })
        .collect()
}
