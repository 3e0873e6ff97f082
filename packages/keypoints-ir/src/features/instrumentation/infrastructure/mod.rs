//! Instrumentation infrastructure
//!
//! Decision phase: `walker` drives `branch_classifier`, `switch_classifier`
//! and `indirect_call`, all funnelling into `tagger`.
//! Injection phase: `injector`.

pub mod branch_classifier;
pub mod indirect_call;
pub mod injector;
pub mod switch_classifier;
pub mod tagger;
pub mod walker;

pub use branch_classifier::classify_branch;
pub use indirect_call::detect_indirect_call;
pub use injector::{apply_plan, insertion_order};
pub use switch_classifier::classify_switch;
pub use tagger::BlockTagger;
pub use walker::{walk_module, WalkStats};
