//! Consolidation ledger: per-symbol accumulation of every balance source.

mod consolidation_ledger;
mod ledger_model;

pub use consolidation_ledger::*;
pub use ledger_model::*;

#[cfg(test)]
mod consolidation_ledger_tests;
