//! Stable / non-stable / neutral classification of canonical symbols.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::symbol_normalizer::clean_symbol;
use super::symbols_constants::{
    NEUTRAL_SYMBOLS, OTHER_TOKENS_SYMBOL, STABLE_PREFIX, STABLE_SUFFIX, STABLE_SYMBOLS,
};
use crate::config::ExposureConfig;

/// Risk category of an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Stability {
    /// Fiat-pegged value
    Stable,
    /// Directional market exposure
    NonStable,
    /// Unknown composition; excluded from stable/non-stable ratios
    Neutral,
}

impl Stability {
    /// Maps a known-category flag to a stability.
    pub fn from_stable_flag(is_stable: bool) -> Self {
        if is_stable {
            Stability::Stable
        } else {
            Stability::NonStable
        }
    }

    /// Nullable-boolean view used in serialized output (`null` for neutral).
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Stability::Stable => Some(true),
            Stability::NonStable => Some(false),
            Stability::Neutral => None,
        }
    }
}

/// Classifies canonical symbols.
#[derive(Debug, Clone)]
pub struct StabilityClassifier {
    stable: HashSet<String>,
    neutral: HashSet<String>,
}

impl Default for StabilityClassifier {
    fn default() -> Self {
        Self {
            stable: STABLE_SYMBOLS.iter().map(|s| clean_symbol(s)).collect(),
            neutral: NEUTRAL_SYMBOLS.iter().map(|s| clean_symbol(s)).collect(),
        }
    }
}

impl StabilityClassifier {
    /// Built-in tables extended with the config's extra stable/neutral symbols.
    pub fn from_config(config: &ExposureConfig) -> Self {
        let mut classifier = Self::default();
        classifier.stable.extend(
            config
                .extra_stable_symbols
                .iter()
                .map(|s| clean_symbol(s))
                .filter(|s| !s.is_empty()),
        );
        classifier.neutral.extend(
            config
                .extra_neutral_symbols
                .iter()
                .map(|s| clean_symbol(s))
                .filter(|s| !s.is_empty()),
        );
        classifier
    }

    /// Classifies a symbol. Input is cleaned first, so raw tickers are accepted too.
    ///
    /// Order: neutral set, the catch-all bucket, the stable set, `+` composites
    /// (stable iff every part is), the `STABLE_*` / `*_STABLE` convention.
    pub fn classify(&self, symbol: &str) -> Stability {
        let clean = clean_symbol(symbol);
        if clean.is_empty() {
            return Stability::NonStable;
        }

        if self.neutral.contains(&clean) {
            return Stability::Neutral;
        }
        if clean == OTHER_TOKENS_SYMBOL {
            return Stability::NonStable;
        }
        if self.stable.contains(&clean) {
            return Stability::Stable;
        }

        if clean.contains('+') {
            let mut parts = clean.split('+').filter(|p| !p.is_empty()).peekable();
            if parts.peek().is_some() && parts.all(|p| self.classify(p) == Stability::Stable) {
                return Stability::Stable;
            }
        }

        if clean.starts_with(STABLE_PREFIX) || clean.ends_with(STABLE_SUFFIX) {
            return Stability::Stable;
        }

        Stability::NonStable
    }

    /// Classification honoring a caller-supplied override.
    pub fn classify_with_override(&self, symbol: &str, stability_override: Option<Stability>) -> Stability {
        stability_override.unwrap_or_else(|| self.classify(symbol))
    }

    pub fn is_stable(&self, symbol: &str) -> bool {
        self.classify(symbol) == Stability::Stable
    }
}
