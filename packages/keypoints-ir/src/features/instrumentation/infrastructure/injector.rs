//! Injection phase
//!
//! Applies a plan to a host through `IrInserter`. Requests are positioned
//! against the statement indices the walker saw, so they are applied from the
//! back of each block to the front. When a block-entry branch log and an
//! indirect-call log target the same statement, the branch log ends up first.

use std::cmp::Reverse;

use tracing::debug;

use crate::features::instrumentation::domain::{
    InstrumentationPlan, Injection, Module, RuntimeCall, StatementRef,
};
use crate::features::instrumentation::ports::IrInserter;
use crate::shared::models::{KeypointsError, Result};

/// Among requests before the same statement, lower ranks are inserted first
/// and therefore end up closest to that statement.
fn insertion_rank(call: &RuntimeCall) -> u8 {
    match call {
        RuntimeCall::LogFunctionPointer { .. } => 0,
        RuntimeCall::LogBranch { .. } => 1,
    }
}

/// Insertion order that keeps original positions valid
pub fn insertion_order(injections: &[Injection]) -> Vec<&Injection> {
    let mut ordered: Vec<&Injection> = injections.iter().collect();
    ordered.sort_by_key(|i| {
        (
            i.at.function,
            i.at.block,
            Reverse(i.at.index),
            insertion_rank(&i.call),
        )
    });
    ordered
}

/// Apply every injection of `plan`; returns the number of inserted calls
pub fn apply_plan<H: IrInserter + ?Sized>(host: &mut H, plan: &InstrumentationPlan) -> Result<usize> {
    let ordered = insertion_order(&plan.injections);
    for injection in &ordered {
        host.insert_call_before(injection.at, &injection.call)?;
    }

    debug!("{}: inserted {} runtime calls", plan.source_file, ordered.len());
    Ok(ordered.len())
}

impl IrInserter for Module {
    fn insert_call_before(&mut self, at: StatementRef, call: &RuntimeCall) -> Result<()> {
        let source_file = self.source_file.clone();
        let statements = self
            .functions
            .get_mut(at.function)
            .and_then(|f| f.blocks.get_mut(at.block))
            .map(|b| &mut b.statements)
            .filter(|statements| at.index < statements.len())
            .ok_or_else(|| {
                KeypointsError::host_ir(format!(
                    "cannot insert {} before missing statement {:?}",
                    call.symbol(),
                    at
                ))
                .with_file(source_file)
            })?;

        statements.insert(at.index, call.to_statement());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::instrumentation::domain::{
        Block, Callee, Function, Operand, Statement, StatementKind,
    };
    use crate::shared::models::ErrorKind;
    use pretty_assertions::assert_eq;

    fn fp_call(name: &str) -> Statement {
        Statement::new(StatementKind::Call {
            callee: Callee::Indirect(Operand::Local(name.to_string())),
            args: vec![],
        })
    }

    fn module() -> Module {
        Module {
            source_file: "i.c".to_string(),
            functions: vec![Function {
                name: "f".to_string(),
                blocks: vec![Block {
                    label: "bb".to_string(),
                    statements: vec![fp_call("%a"), fp_call("%b"), Statement::new(StatementKind::Return)],
                }],
            }],
        }
    }

    fn plan(injections: Vec<Injection>) -> InstrumentationPlan {
        InstrumentationPlan {
            source_file: "i.c".to_string(),
            injections,
            ..InstrumentationPlan::default()
        }
    }

    fn callee_name(stmt: &Statement) -> String {
        match &stmt.kind {
            StatementKind::Call {
                callee: Callee::Direct(name),
                args,
            } => format!("{}({:?})", name, args[0]),
            StatementKind::Call {
                callee: Callee::Indirect(Operand::Local(name)),
                ..
            } => format!("call {}", name),
            other => format!("{:?}", other),
        }
    }

    #[test]
    fn test_branch_log_precedes_call_log_on_same_statement() {
        let mut module = module();
        let plan = plan(vec![
            Injection::new(
                StatementRef::new(0, 0, 0),
                RuntimeCall::LogFunctionPointer {
                    target: Operand::Local("%a".to_string()),
                },
            ),
            Injection::new(
                StatementRef::new(0, 0, 1),
                RuntimeCall::LogFunctionPointer {
                    target: Operand::Local("%b".to_string()),
                },
            ),
            Injection::new(StatementRef::new(0, 0, 0), RuntimeCall::LogBranch { id: 3 }),
        ]);

        assert_eq!(apply_plan(&mut module, &plan).unwrap(), 3);

        let rendered: Vec<_> = module.functions[0].blocks[0]
            .statements
            .iter()
            .map(callee_name)
            .collect();
        assert_eq!(
            rendered,
            vec![
                "keypoints_log_branch(Const(3))".to_string(),
                "keypoints_log_function_pointer(Local(\"%a\"))".to_string(),
                "call %a".to_string(),
                "keypoints_log_function_pointer(Local(\"%b\"))".to_string(),
                "call %b".to_string(),
                "Return".to_string(),
            ]
        );
    }

    #[test]
    fn test_insert_before_missing_statement_fails() {
        let mut module = module();
        let err = module
            .insert_call_before(StatementRef::new(0, 0, 3), &RuntimeCall::LogBranch { id: 0 })
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::HostIr);
    }

    #[test]
    fn test_empty_plan_leaves_module_untouched() {
        let mut module = module();
        let before = module.clone();
        assert_eq!(apply_plan(&mut module, &plan(vec![])).unwrap(), 0);
        assert_eq!(module, before);
    }
}
