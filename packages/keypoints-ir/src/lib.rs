/*
 * Keypoints IR - Branch Instrumentation Engine
 *
 * Feature-First Hexagonal Architecture:
 * - shared/      : Common models (SourceLoc, errors)
 * - features/    : Vertical slices (instrumentation)
 * - config/      : Paths and lock policy for cross-invocation state
 *
 * One pass per compilation unit: walk the CFG, tag every block reached
 * through a decision, append the branch dictionary, persist the counter,
 * then insert runtime logging calls.
 */

#![allow(clippy::upper_case_acronyms)] // CFG naming

/// Shared models and utilities
pub mod shared;

/// Feature modules
pub mod features;

/// Configuration system
pub mod config;

// ═══════════════════════════════════════════════════════════════════════════
// Re-exports for Public API
// ═══════════════════════════════════════════════════════════════════════════

pub use config::{ConfigError, InstrumentationConfig};
pub use features::instrumentation::{
    apply_plan, walk_module, InstrumentUnitUseCase, InstrumentationPlan, IrInserter, Module,
};
pub use shared::models::{ErrorKind, KeypointsError, Result, SourceLoc};

pub use keypoints_storage::BranchEntry;
