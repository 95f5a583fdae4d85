//! Margin allocation for derivative venues.

mod margin_allocator;
mod margin_model;

pub use margin_allocator::*;
pub use margin_model::*;
