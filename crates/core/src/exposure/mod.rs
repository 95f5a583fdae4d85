//! Exposure analysis: aggregation of the consolidated ledger into a
//! risk-categorized report, and the service running the whole pipeline.

mod exposure_aggregator;
mod exposure_model;
mod exposure_service;
mod exposure_traits;

pub use exposure_aggregator::*;
pub use exposure_model::*;
pub use exposure_service::*;
pub use exposure_traits::*;

#[cfg(test)]
mod exposure_aggregator_tests;
