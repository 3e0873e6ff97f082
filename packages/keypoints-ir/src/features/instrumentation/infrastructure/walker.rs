//! CFG walker
//!
//! Visits every function, block and statement of a unit exactly once, in
//! program order, and dispatches terminators and calls to the classifiers.
//! The walk only reads the module: insertions are collected in the plan and
//! applied afterwards, so they can never be revisited or shift the walk.

use keypoints_storage::IdAllocator;
use tracing::{debug, info};

use crate::features::instrumentation::domain::{InstrumentationPlan, Module, StatementKind, StatementRef};
use crate::shared::models::Result;

use super::branch_classifier::classify_branch;
use super::indirect_call::detect_indirect_call;
use super::switch_classifier::classify_switch;
use super::tagger::BlockTagger;

/// Per-unit walk statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    pub functions: usize,
    pub blocks: usize,
    pub statements: usize,
    /// Two-way conditional branches; jumps are not counted
    pub branches: usize,
    pub switches: usize,
    pub indirect_calls: usize,
}

/// Decide the instrumentation of `module`, allocating ids from `ids`
pub fn walk_module(module: &Module, ids: IdAllocator) -> Result<(InstrumentationPlan, WalkStats)> {
    let mut tagger = BlockTagger::new(module, ids);
    let mut stats = WalkStats::default();

    for (function_idx, function) in module.functions.iter().enumerate() {
        stats.functions += 1;
        debug!("walking {} ({} blocks)", function.name, function.blocks.len());

        for (block_idx, block) in function.blocks.iter().enumerate() {
            stats.blocks += 1;

            for (stmt_idx, stmt) in block.statements.iter().enumerate() {
                stats.statements += 1;

                match &stmt.kind {
                    StatementKind::Switch { .. } => {
                        stats.switches += 1;
                        classify_switch(&mut tagger, function_idx, stmt)?;
                    }
                    StatementKind::Branch { .. } => {
                        stats.branches += 1;
                        classify_branch(&mut tagger, function_idx, stmt)?;
                    }
                    StatementKind::Call { .. } => {
                        let at = StatementRef::new(function_idx, block_idx, stmt_idx);
                        if let Some(injection) = detect_indirect_call(stmt, at) {
                            debug!(
                                "indirect call in {} at block {} position {}",
                                function.name, block_idx, stmt_idx
                            );
                            stats.indirect_calls += 1;
                            tagger.inject(injection);
                        }
                    }
                    // No decision is made here
                    StatementKind::Jump { .. } | StatementKind::Return | StatementKind::Other { .. } => {}
                }
            }
        }
    }

    let plan = tagger.finish();
    info!(
        "{}: {} branch entries, {} indirect calls, {} blocks walked",
        module.source_file,
        plan.entries.len(),
        stats.indirect_calls,
        stats.blocks
    );
    Ok((plan, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::instrumentation::domain::{
        Block, Callee, Function, Operand, RuntimeCall, Statement,
    };
    use crate::shared::models::SourceLoc;

    fn at(line: u32) -> SourceLoc {
        SourceLoc::new("w.c", line)
    }

    /// if (c) { a } else { b }; call through fp in the join block
    fn diamond() -> Module {
        Module {
            source_file: "w.c".to_string(),
            functions: vec![Function {
                name: "diamond".to_string(),
                blocks: vec![
                    Block {
                        label: "entry".to_string(),
                        statements: vec![Statement::new(StatementKind::Branch {
                            taken: 1,
                            not_taken: 2,
                        })
                        .at(at(3))],
                    },
                    Block {
                        label: "then".to_string(),
                        statements: vec![Statement::new(StatementKind::Jump { target: 3 }).at(at(4))],
                    },
                    Block {
                        label: "else".to_string(),
                        statements: vec![Statement::new(StatementKind::Jump { target: 3 }).at(at(6))],
                    },
                    Block {
                        label: "join".to_string(),
                        statements: vec![
                            Statement::new(StatementKind::Call {
                                callee: Callee::Indirect(Operand::Local("%fp".to_string())),
                                args: vec![],
                            })
                            .at(at(8)),
                            Statement::new(StatementKind::Return).at(at(9)),
                        ],
                    },
                ],
            }],
        }
    }

    #[test]
    fn test_diamond_plan() {
        let (plan, stats) = walk_module(&diamond(), IdAllocator::new(0)).unwrap();

        let summary: Vec<_> = plan.entries.iter().map(ToString::to_string).collect();
        assert_eq!(summary, vec!["br_0: w.c, 3, 4", "br_1: w.c, 3, 6"]);
        assert_eq!(plan.next_id, 2);

        assert_eq!(plan.branch_injections().count(), 2);
        let fp: Vec<_> = plan.function_pointer_injections().collect();
        assert_eq!(fp.len(), 1);
        assert_eq!(fp[0].at, StatementRef::new(0, 3, 0));
        assert!(matches!(fp[0].call, RuntimeCall::LogFunctionPointer { .. }));

        assert_eq!(
            stats,
            WalkStats {
                functions: 1,
                blocks: 4,
                statements: 5,
                branches: 1,
                switches: 0,
                indirect_calls: 1,
            }
        );
    }

    #[test]
    fn test_ids_continue_from_allocator() {
        let (plan, _) = walk_module(&diamond(), IdAllocator::new(40)).unwrap();
        let ids: Vec<_> = plan.entries.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![40, 41]);
        assert_eq!(plan.next_id, 42);
    }

    #[test]
    fn test_empty_module() {
        let (plan, stats) = walk_module(&Module::new("empty.c"), IdAllocator::new(5)).unwrap();
        assert!(plan.is_empty());
        assert_eq!(plan.next_id, 5);
        assert_eq!(stats, WalkStats::default());
    }
}
