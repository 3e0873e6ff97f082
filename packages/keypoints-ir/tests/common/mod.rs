//! Common test utilities for keypoints-ir
//!
//! Builders for small host CFGs and helpers for inspecting instrumented IR.

#![allow(dead_code)]

mod builders;

pub use builders::*;
