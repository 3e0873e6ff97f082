//! Indirect call detection
//!
//! A call whose target is a runtime value gets a `log_function_pointer` call
//! right before it, passing that same value. Direct calls are left alone.

use crate::features::instrumentation::domain::{
    Callee, Injection, RuntimeCall, Statement, StatementKind, StatementRef,
};

pub fn detect_indirect_call(stmt: &Statement, at: StatementRef) -> Option<Injection> {
    match &stmt.kind {
        StatementKind::Call {
            callee: Callee::Indirect(target),
            ..
        } => Some(Injection::new(
            at,
            RuntimeCall::LogFunctionPointer {
                target: target.clone(),
            },
        )),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::instrumentation::domain::Operand;

    #[test]
    fn test_indirect_call_logs_target_value() {
        let stmt = Statement::new(StatementKind::Call {
            callee: Callee::Indirect(Operand::Local("%handler".to_string())),
            args: vec![],
        });
        let at = StatementRef::new(0, 1, 2);

        let injection = detect_indirect_call(&stmt, at).unwrap();
        assert_eq!(injection.at, at);
        assert_eq!(
            injection.call,
            RuntimeCall::LogFunctionPointer {
                target: Operand::Local("%handler".to_string())
            }
        );
    }

    #[test]
    fn test_direct_call_is_ignored() {
        let stmt = Statement::new(StatementKind::Call {
            callee: Callee::Direct("printf".to_string()),
            args: vec![Operand::Const(1)],
        });
        assert!(detect_indirect_call(&stmt, StatementRef::new(0, 0, 0)).is_none());
    }

    #[test]
    fn test_non_call_is_ignored() {
        let stmt = Statement::new(StatementKind::Return);
        assert!(detect_indirect_call(&stmt, StatementRef::new(0, 0, 0)).is_none());
    }
}
