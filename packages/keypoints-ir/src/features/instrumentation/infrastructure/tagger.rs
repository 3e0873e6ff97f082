//! Block tagger
//!
//! Assigns a branch id to every distinct control-flow node reached through a
//! decision, at most once per node per compilation unit. The seen-set is the
//! only deduplication mechanism: a node can be the target of several
//! terminators, or appear twice in one terminator's successor list.

use keypoints_storage::{BranchEntry, IdAllocator};
use rustc_hash::FxHashSet;
use tracing::debug;

use crate::features::instrumentation::domain::{
    BlockHandle, Injection, InstrumentationPlan, Module, RuntimeCall, StatementRef,
};
use crate::shared::models::Result;

pub struct BlockTagger<'m> {
    module: &'m Module,
    ids: IdAllocator,
    seen: FxHashSet<BlockHandle>,
    entries: Vec<BranchEntry>,
    injections: Vec<Injection>,
}

impl<'m> BlockTagger<'m> {
    pub fn new(module: &'m Module, ids: IdAllocator) -> Self {
        Self {
            module,
            ids,
            seen: FxHashSet::default(),
            entries: Vec::new(),
            injections: Vec::new(),
        }
    }

    pub fn is_tagged(&self, target: BlockHandle) -> bool {
        self.seen.contains(&target)
    }

    /// Tag `target`, reached from a decision on `condition_line`
    ///
    /// Returns the new entry, or `None` if the node was already tagged in this
    /// unit (no id allocated, nothing injected).
    pub fn tag(&mut self, condition_line: u32, target: BlockHandle) -> Result<Option<BranchEntry>> {
        let block = self.module.block(target)?;

        // Mark before anything else can observe the node again.
        if !self.seen.insert(target) {
            return Ok(None);
        }

        let id = self.ids.allocate()?;
        let entry = BranchEntry::new(
            id,
            self.module.source_file.clone(),
            condition_line,
            block.first_located_line(),
        );

        debug!(
            "tagged block {}:{} as br_{} (condition line {})",
            target.function, target.block, id, condition_line
        );

        self.entries.push(entry.clone());
        self.injections.push(Injection::new(
            StatementRef::block_entry(target),
            RuntimeCall::LogBranch { id },
        ));
        Ok(Some(entry))
    }

    /// Record an injection that does not create a dictionary entry
    pub fn inject(&mut self, injection: Injection) {
        self.injections.push(injection);
    }

    pub fn finish(self) -> InstrumentationPlan {
        InstrumentationPlan {
            source_file: self.module.source_file.clone(),
            entries: self.entries,
            injections: self.injections,
            next_id: self.ids.next(),
        }
    }
}
