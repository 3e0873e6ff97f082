//! Test data builders

use keypoints_ir::features::instrumentation::{
    Block, BlockId, Callee, Function, Module, Operand, Statement, StatementKind,
};
use keypoints_ir::SourceLoc;

/// Builder for Module
#[derive(Debug)]
pub struct ModuleBuilder {
    module: Module,
}

impl ModuleBuilder {
    pub fn new(source_file: &str) -> Self {
        Self {
            module: Module::new(source_file),
        }
    }

    /// Add a function made of `blocks`, in order
    pub fn function(mut self, name: &str, blocks: Vec<Block>) -> Self {
        self.module.functions.push(Function {
            name: name.to_string(),
            blocks,
        });
        self
    }

    pub fn build(self) -> Module {
        self.module
    }
}

pub fn block(label: &str, statements: Vec<Statement>) -> Block {
    Block {
        label: label.to_string(),
        statements,
    }
}

pub fn located(kind: StatementKind, line: u32) -> Statement {
    Statement::new(kind).at(SourceLoc::new("unit.c", line))
}

pub fn synthetic(kind: StatementKind) -> Statement {
    Statement::new(kind)
}

pub fn branch(taken: BlockId, not_taken: BlockId) -> StatementKind {
    StatementKind::Branch { taken, not_taken }
}

pub fn switch(cases: Vec<BlockId>, default: BlockId) -> StatementKind {
    StatementKind::Switch { cases, default }
}

pub fn jump(target: BlockId) -> StatementKind {
    StatementKind::Jump { target }
}

pub fn ret() -> StatementKind {
    StatementKind::Return
}

pub fn indirect_call(value: &str) -> StatementKind {
    StatementKind::Call {
        callee: Callee::Indirect(Operand::Local(value.to_string())),
        args: vec![],
    }
}

pub fn direct_call(name: &str) -> StatementKind {
    StatementKind::Call {
        callee: Callee::Direct(name.to_string()),
        args: vec![],
    }
}

/// A function whose entry switches over `targets` distinct located blocks
///
/// The switch sits on line 1, target `i` returns on line `100 + i`, and the
/// last target is the default. Produces exactly `targets` branch entries.
pub fn fan_out(source_file: &str, targets: usize) -> Module {
    assert!(targets >= 1, "fan_out needs at least one target");

    let cases: Vec<BlockId> = (1..targets).collect();
    let mut blocks = vec![block("entry", vec![located(switch(cases, targets), 1)])];
    for i in 0..targets {
        blocks.push(block(
            &format!("target{}", i),
            vec![located(ret(), 100 + i as u32)],
        ));
    }

    ModuleBuilder::new(source_file).function("fan_out", blocks).build()
}

/// Names of the runtime calls at the start of a block, in order
pub fn leading_runtime_calls(block: &Block) -> Vec<String> {
    block
        .statements
        .iter()
        .map_while(|stmt| match &stmt.kind {
            StatementKind::Call {
                callee: Callee::Direct(name),
                args,
            } if name.starts_with("keypoints_log_") => Some(format!("{}{:?}", name, args)),
            _ => None,
        })
        .collect()
}
