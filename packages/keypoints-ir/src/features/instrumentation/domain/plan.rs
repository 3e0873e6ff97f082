//! Instrumentation plan
//!
//! Output of the decision phase: the dictionary entries created for the unit
//! and the runtime calls the host must insert. Nothing here touches the IR.

use keypoints_runtime::{LOG_BRANCH_SYMBOL, LOG_FUNCTION_POINTER_SYMBOL};
use keypoints_storage::BranchEntry;
use serde::{Deserialize, Serialize};

use super::cfg::{Callee, Operand, Statement, StatementKind, StatementRef};

/// Call into the runtime logging library
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum RuntimeCall {
    /// `keypoints_log_branch(id)` at the entry of a tagged block
    LogBranch { id: u32 },
    /// `keypoints_log_function_pointer(target)` before an indirect call
    LogFunctionPointer { target: Operand },
}

impl RuntimeCall {
    pub fn symbol(&self) -> &'static str {
        match self {
            RuntimeCall::LogBranch { .. } => LOG_BRANCH_SYMBOL,
            RuntimeCall::LogFunctionPointer { .. } => LOG_FUNCTION_POINTER_SYMBOL,
        }
    }

    /// Statement a host inserts for this call; it carries no source position
    pub fn to_statement(&self) -> Statement {
        let arg = match self {
            RuntimeCall::LogBranch { id } => Operand::Const(i64::from(*id)),
            RuntimeCall::LogFunctionPointer { target } => target.clone(),
        };
        Statement::new(StatementKind::Call {
            callee: Callee::Direct(self.symbol().to_string()),
            args: vec![arg],
        })
    }
}

/// Request to insert `call` immediately before the statement at `at`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Injection {
    pub at: StatementRef,
    pub call: RuntimeCall,
}

impl Injection {
    pub fn new(at: StatementRef, call: RuntimeCall) -> Self {
        Self { at, call }
    }
}

/// Everything the pass decided for one compilation unit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentationPlan {
    pub source_file: String,
    /// Dictionary entries in creation order
    pub entries: Vec<BranchEntry>,
    /// Insertions in decision order
    pub injections: Vec<Injection>,
    /// Counter value to persist once the unit is done
    pub next_id: u32,
}

impl InstrumentationPlan {
    pub fn new(source_file: impl Into<String>, next_id: u32) -> Self {
        Self {
            source_file: source_file.into(),
            next_id,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.injections.is_empty()
    }

    pub fn branch_injections(&self) -> impl Iterator<Item = &Injection> {
        self.injections
            .iter()
            .filter(|i| matches!(i.call, RuntimeCall::LogBranch { .. }))
    }

    pub fn function_pointer_injections(&self) -> impl Iterator<Item = &Injection> {
        self.injections
            .iter()
            .filter(|i| matches!(i.call, RuntimeCall::LogFunctionPointer { .. }))
    }
}
