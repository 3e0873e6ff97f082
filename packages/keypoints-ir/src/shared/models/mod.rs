//! Shared models
//!
//! - `SourceLoc`: source-position metadata attached to IR statements
//! - `KeypointsError`: crate-wide error type

pub mod error;
pub mod span;

pub use error::{ErrorKind, KeypointsError, Result};
pub use span::SourceLoc;
