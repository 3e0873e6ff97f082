mod instrument_unit;

pub use instrument_unit::InstrumentUnitUseCase;
