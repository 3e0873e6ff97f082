//! Branch instrumentation
//!
//! Tags every control-flow node reached through a decision with a globally
//! unique id, records it in the branch dictionary and asks the host to log
//! the id at run time. Indirect calls additionally log their resolved target.
//!
//! - `domain/`: host CFG model and the instrumentation plan
//! - `ports/`: IR insertion facility
//! - `application/`: the per-unit pass
//! - `infrastructure/`: walker, classifiers, tagger, injector

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use application::InstrumentUnitUseCase;
pub use domain::*;
pub use infrastructure::{apply_plan, walk_module, WalkStats};
pub use ports::IrInserter;
