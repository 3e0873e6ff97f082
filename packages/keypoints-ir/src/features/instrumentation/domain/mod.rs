//! Instrumentation domain model
mod cfg;
mod plan;

pub use cfg::{
    Block, BlockHandle, BlockId, Callee, Function, Module, Operand, Statement, StatementKind,
    StatementRef,
};
pub use plan::{Injection, InstrumentationPlan, RuntimeCall};
