mod ir_inserter;

pub use ir_inserter::IrInserter;
