//! Multi-way branches
//!
//! Case targets are tagged in order, skipping any that alias the default; the
//! default is always tagged last, so it is the final entry a switch creates.

use crate::features::instrumentation::domain::{BlockHandle, Statement, StatementKind};
use crate::shared::models::Result;

use super::tagger::BlockTagger;

/// Tag every distinct case target, then the default; returns how many were new
pub fn classify_switch(tagger: &mut BlockTagger<'_>, function: usize, stmt: &Statement) -> Result<usize> {
    let Some(line) = stmt.line() else {
        return Ok(0);
    };

    let StatementKind::Switch { cases, default } = &stmt.kind else {
        return Ok(0);
    };

    let mut tagged = 0;
    for &case in cases.iter().filter(|&&case| case != *default) {
        if tagger.tag(line, BlockHandle::new(function, case))?.is_some() {
            tagged += 1;
        }
    }
    if tagger.tag(line, BlockHandle::new(function, *default))?.is_some() {
        tagged += 1;
    }
    Ok(tagged)
}
