//! Error types for the keypoints-ir crate
//!
//! One error type for the whole pass. Anything returned from here fails the
//! compilation unit as a whole; policy no-ops (missing metadata, unconditional
//! jumps) never surface as errors.

use std::fmt;

use keypoints_storage::StorageError;

use crate::config::ConfigError;

/// Error kind categorization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Inconsistent host CFG (dangling block reference, misplaced terminator)
    HostIr,
    /// Persisted counter is unreadable; nothing may be instrumented
    CounterState,
    /// Counter lock held by another invocation (retryable)
    LockContention,
    /// Dictionary or counter persistence failures
    Storage,
    /// Configuration errors
    Config,
    /// IO errors
    IO,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::HostIr => "host_ir",
            ErrorKind::CounterState => "counter_state",
            ErrorKind::LockContention => "lock_contention",
            ErrorKind::Storage => "storage",
            ErrorKind::Config => "config",
            ErrorKind::IO => "io",
        }
    }
}

/// Unified error type
#[derive(Debug)]
pub struct KeypointsError {
    pub kind: ErrorKind,
    pub message: String,
    pub file_path: Option<String>,
    pub line: Option<u32>,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl KeypointsError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            file_path: None,
            line: None,
            source: None,
        }
    }

    pub fn with_file(mut self, file_path: impl Into<String>) -> Self {
        self.file_path = Some(file_path.into());
        self
    }

    pub fn with_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }

    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    // Convenience constructors
    pub fn host_ir(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::HostIr, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    /// Whether re-running the same invocation later may succeed
    pub fn is_retryable(&self) -> bool {
        self.kind == ErrorKind::LockContention
    }
}

impl fmt::Display for KeypointsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind.as_str(), self.message)?;
        if let Some(ref file) = self.file_path {
            write!(f, " in {}", file)?;
            if let Some(line) = self.line {
                write!(f, ":{}", line)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for KeypointsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, KeypointsError>;

impl From<StorageError> for KeypointsError {
    fn from(err: StorageError) -> Self {
        use keypoints_storage::ErrorKind as StorageKind;

        let kind = match err.kind {
            StorageKind::CorruptCounter => ErrorKind::CounterState,
            StorageKind::LockContention => ErrorKind::LockContention,
            StorageKind::IO => ErrorKind::IO,
            StorageKind::IdSpaceExhausted | StorageKind::Dictionary => ErrorKind::Storage,
        };
        KeypointsError::new(kind, err.message.clone()).with_source(err)
    }
}

impl From<ConfigError> for KeypointsError {
    fn from(err: ConfigError) -> Self {
        KeypointsError::config(err.to_string()).with_source(err)
    }
}

impl From<std::io::Error> for KeypointsError {
    fn from(err: std::io::Error) -> Self {
        KeypointsError::new(ErrorKind::IO, format!("I/O error: {}", err)).with_source(err)
    }
}

impl From<serde_json::Error> for KeypointsError {
    fn from(err: serde_json::Error) -> Self {
        KeypointsError::host_ir(format!("JSON module error: {}", err)).with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_error_display() {
        let err = KeypointsError::host_ir("dangling block 9")
            .with_file("main.c")
            .with_line(12);
        assert_eq!(format!("{}", err), "[host_ir] dangling block 9 in main.c:12");
    }

    #[test]
    fn test_error_display_without_location() {
        let err = KeypointsError::config("bad lock section");
        assert_eq!(format!("{}", err), "[config] bad lock section");
    }

    #[test]
    fn test_corrupt_counter_maps_to_counter_state() {
        let err: KeypointsError = StorageError::corrupt_counter("counter.log", "x").into();
        assert_eq!(err.kind, ErrorKind::CounterState);
        assert!(!err.is_retryable());
        assert!(err.source().is_some());
    }

    #[test]
    fn test_lock_contention_stays_retryable() {
        let err: KeypointsError = StorageError::lock_contention("counter.log.lock", 5).into();
        assert_eq!(err.kind, ErrorKind::LockContention);
        assert!(err.is_retryable());
    }
}
