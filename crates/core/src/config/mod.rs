//! Engine configuration module.

mod config_model;

pub use config_model::*;
