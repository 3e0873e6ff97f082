use crate::features::instrumentation::domain::{RuntimeCall, StatementRef};
use crate::shared::models::Result;

/// Host facility for inserting runtime calls into live IR
///
/// `at` always refers to statement positions as the walker saw them. The
/// injector orders requests so that positions stay valid while inserting.
pub trait IrInserter {
    fn insert_call_before(&mut self, at: StatementRef, call: &RuntimeCall) -> Result<()>;
}
