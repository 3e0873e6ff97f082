//! Host CFG model
//!
//! The minimal view of a compilation unit the pass needs: functions, blocks in
//! a stable order, statements in program order, terminator shapes, call
//! sites and optional source positions. A host compiler adapter lowers its IR
//! into this model (it is `serde`-serializable, so the CLI can read it as JSON).
//!
//! Blocks are identified by index within their function. A `BlockHandle`
//! (function index + block index) is the unit-wide identity of a node; two
//! blocks with identical contents are still distinct nodes.

use serde::{Deserialize, Serialize};

use crate::shared::models::{KeypointsError, Result, SourceLoc};

/// Block index within its function
pub type BlockId = usize;

/// Unit-wide identity of a control-flow node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockHandle {
    pub function: usize,
    pub block: BlockId,
}

impl BlockHandle {
    pub fn new(function: usize, block: BlockId) -> Self {
        Self { function, block }
    }
}

/// Position of a statement, as walked (before any insertion)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StatementRef {
    pub function: usize,
    pub block: BlockId,
    pub index: usize,
}

impl StatementRef {
    pub fn new(function: usize, block: BlockId, index: usize) -> Self {
        Self {
            function,
            block,
            index,
        }
    }

    /// First statement of `handle`
    pub fn block_entry(handle: BlockHandle) -> Self {
        Self::new(handle.function, handle.block, 0)
    }

    pub fn block_handle(&self) -> BlockHandle {
        BlockHandle::new(self.function, self.block)
    }
}

/// Call or terminator operand
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operand {
    Const(i64),
    /// Runtime value, e.g. a register loaded through a function pointer
    Local(String),
}

/// Call target
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Callee {
    /// Statically known function
    Direct(String),
    /// Target only known at run time
    Indirect(Operand),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum StatementKind {
    /// Unconditional jump
    Jump { target: BlockId },
    /// Two-way conditional branch
    Branch { taken: BlockId, not_taken: BlockId },
    /// Multi-way branch
    Switch { cases: Vec<BlockId>, default: BlockId },
    Call {
        callee: Callee,
        #[serde(default)]
        args: Vec<Operand>,
    },
    Return,
    /// Anything the pass does not look at
    Other {
        #[serde(default)]
        text: String,
    },
}

impl StatementKind {
    pub fn is_terminator(&self) -> bool {
        matches!(
            self,
            StatementKind::Jump { .. }
                | StatementKind::Branch { .. }
                | StatementKind::Switch { .. }
                | StatementKind::Return
        )
    }

    /// Successor blocks in declaration order (may contain duplicates)
    pub fn successors(&self) -> Vec<BlockId> {
        match self {
            StatementKind::Jump { target } => vec![*target],
            StatementKind::Branch { taken, not_taken } => vec![*taken, *not_taken],
            StatementKind::Switch { cases, default } => {
                let mut all = cases.clone();
                all.push(*default);
                all
            }
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    #[serde(flatten)]
    pub kind: StatementKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loc: Option<SourceLoc>,
}

impl Statement {
    pub fn new(kind: StatementKind) -> Self {
        Self { kind, loc: None }
    }

    pub fn at(mut self, loc: SourceLoc) -> Self {
        self.loc = Some(loc);
        self
    }

    pub fn line(&self) -> Option<u32> {
        self.loc.as_ref().map(|loc| loc.line)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    #[serde(default)]
    pub label: String,
    pub statements: Vec<Statement>,
}

impl Block {
    /// Line of the first statement carrying a source position
    pub fn first_located_line(&self) -> Option<u32> {
        self.statements.iter().find_map(Statement::line)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    pub blocks: Vec<Block>,
}

/// One compilation unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    /// Name recorded in every dictionary entry this unit produces
    pub source_file: String,
    pub functions: Vec<Function>,
}

impl Module {
    pub fn new(source_file: impl Into<String>) -> Self {
        Self {
            source_file: source_file.into(),
            functions: Vec::new(),
        }
    }

    pub fn block(&self, handle: BlockHandle) -> Result<&Block> {
        self.functions
            .get(handle.function)
            .and_then(|f| f.blocks.get(handle.block))
            .ok_or_else(|| {
                KeypointsError::host_ir(format!(
                    "no block {} in function #{}",
                    handle.block, handle.function
                ))
                .with_file(self.source_file.clone())
            })
    }

    /// Check the structural assumptions the walker relies on
    ///
    /// Every block is non-empty, terminators only appear last, and every
    /// successor names a block of the same function.
    pub fn validate(&self) -> Result<()> {
        for function in &self.functions {
            let block_count = function.blocks.len();
            for (block_id, block) in function.blocks.iter().enumerate() {
                let last = match block.statements.len() {
                    0 => {
                        return Err(self.inconsistency(
                            format!("{}: block {} has no statements", function.name, block_id),
                            None,
                        ))
                    }
                    n => n - 1,
                };

                for (index, stmt) in block.statements.iter().enumerate() {
                    if stmt.kind.is_terminator() && index != last {
                        return Err(self.inconsistency(
                            format!(
                                "{}: terminator at position {} of block {} is not last",
                                function.name, index, block_id
                            ),
                            stmt.line(),
                        ));
                    }
                    if let Some(target) = stmt.kind.successors().into_iter().find(|t| *t >= block_count) {
                        return Err(self.inconsistency(
                            format!(
                                "{}: block {} branches to missing block {}",
                                function.name, block_id, target
                            ),
                            stmt.line(),
                        ));
                    }
                }
            }
        }
        Ok(())
    }

    fn inconsistency(&self, message: String, line: Option<u32>) -> KeypointsError {
        let err = KeypointsError::host_ir(message).with_file(self.source_file.clone());
        match line {
            Some(line) => err.with_line(line),
            None => err,
        }
    }
}
