//! Error types for keypoints-storage

use std::fmt;
use thiserror::Error;

/// Storage error kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Counter state file exists but does not hold a decimal counter
    CorruptCounter,
    /// Another invocation holds the counter lock
    LockContention,
    /// No identifiers left in the 32-bit id space
    IdSpaceExhausted,
    /// Malformed branch dictionary line
    Dictionary,
    /// I/O errors
    IO,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::CorruptCounter => "corrupt_counter",
            ErrorKind::LockContention => "lock_contention",
            ErrorKind::IdSpaceExhausted => "id_space_exhausted",
            ErrorKind::Dictionary => "dictionary",
            ErrorKind::IO => "io",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Storage error type
#[derive(Debug, Error)]
#[error("[{kind}] {message}")]
pub struct StorageError {
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
    pub kind: ErrorKind,
    pub message: String,
}

impl StorageError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    // Convenience constructors
    pub fn corrupt_counter(path: impl fmt::Display, content: &str) -> Self {
        Self::new(
            ErrorKind::CorruptCounter,
            format!("counter state in {} is not a decimal counter: {:?}", path, content),
        )
    }

    pub fn lock_contention(path: impl fmt::Display, attempts: u32) -> Self {
        Self::new(
            ErrorKind::LockContention,
            format!("counter lock {} still held after {} attempts", path, attempts),
        )
    }

    pub fn id_space_exhausted(next: u32, requested: u32) -> Self {
        Self::new(
            ErrorKind::IdSpaceExhausted,
            format!("cannot allocate {} ids starting at {}", requested, next),
        )
    }

    pub fn dictionary(line: &str) -> Self {
        Self::new(
            ErrorKind::Dictionary,
            format!("malformed dictionary line: {:?}", line),
        )
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::IO, message)
    }

    /// Lock contention is transient; everything else needs operator attention.
    pub fn is_retryable(&self) -> bool {
        self.kind == ErrorKind::LockContention
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::io(format!("I/O error: {}", err)).with_source(err)
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, StorageError>;
