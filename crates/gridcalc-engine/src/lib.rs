//! gridcalc_engine - Formula grammar, evaluation and dependency tracking.

pub mod engine;
