//! Netted position extraction for wallet-chain holdings.

mod netted_position_extractor;
mod summary_constants;
mod summary_model;

pub use netted_position_extractor::*;
pub use summary_constants::*;
pub use summary_model::*;
