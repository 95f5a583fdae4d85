//! Symbol handling: normalization, stability classification and margin
//! bucket identifiers.

mod margin_symbols;
mod stability_classifier;
mod symbol_normalizer;
pub mod symbols_constants;

pub use margin_symbols::{margin_reserve_symbol, margin_symbol};
pub use stability_classifier::{Stability, StabilityClassifier};
pub use symbol_normalizer::{clean_symbol, normalize_symbol, SymbolNormalizer};
