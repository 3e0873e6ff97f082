//! Two-way conditional branches
//!
//! Only nodes reached through an actual decision are tagged: unconditional
//! jumps are skipped, and so is any branch without a source position
//! (compiler-generated control flow).

use crate::features::instrumentation::domain::{BlockHandle, Statement, StatementKind};
use crate::shared::models::Result;

use super::tagger::BlockTagger;

/// Tag the taken target, then the not-taken target; returns how many were new
pub fn classify_branch(tagger: &mut BlockTagger<'_>, function: usize, stmt: &Statement) -> Result<usize> {
    let Some(line) = stmt.line() else {
        return Ok(0);
    };

    let (taken, not_taken) = match stmt.kind {
        StatementKind::Branch { taken, not_taken } => (taken, not_taken),
        // Jump: single successor, no decision made
        _ => return Ok(0),
    };

    let mut tagged = 0;
    for target in [taken, not_taken] {
        if tagger.tag(line, BlockHandle::new(function, target))?.is_some() {
            tagged += 1;
        }
    }
    Ok(tagged)
}
