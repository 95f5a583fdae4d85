//! Canonicalization of raw asset symbols.
//!
//! Raw symbols arrive from exchanges, chains and scrapers in many shapes:
//! `" usdc.e "`, `"ETH (Arbitrum)"`, `"stETH"`. The canonical form is the
//! uppercase ticker with annotations and chain markers removed, resolved
//! through the alias table.

use std::collections::HashMap;

use super::symbols_constants::ASSET_ALIASES;

/// Cleans a raw symbol without applying aliases.
///
/// Trims, drops everything from the first `(`, drops a `.suffix` chain marker,
/// strips embedded whitespace and stray `)`, then uppercases. An empty result
/// means the record carries no usable symbol.
pub fn clean_symbol(raw: &str) -> String {
    let mut cleaned = raw.trim();
    if let Some((head, _)) = cleaned.split_once('(') {
        cleaned = head;
    }
    if let Some((head, _)) = cleaned.split_once('.') {
        cleaned = head;
    }
    cleaned
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ')')
        .collect::<String>()
        .to_uppercase()
}

/// Cleans a raw symbol and resolves it through the built-in alias table.
pub fn normalize_symbol(raw: &str) -> String {
    let cleaned = clean_symbol(raw);
    ASSET_ALIASES
        .iter()
        .find(|(alias, _)| *alias == cleaned)
        .map(|(_, base)| (*base).to_string())
        .unwrap_or(cleaned)
}

/// Symbol normalizer with a configurable alias table.
///
/// The alias table is many-to-one and is always looked up with the cleaned
/// symbol, never the raw one.
#[derive(Debug, Clone)]
pub struct SymbolNormalizer {
    aliases: HashMap<String, String>,
}

impl Default for SymbolNormalizer {
    fn default() -> Self {
        Self {
            aliases: ASSET_ALIASES
                .iter()
                .map(|(alias, base)| (alias.to_string(), base.to_string()))
                .collect(),
        }
    }
}

impl SymbolNormalizer {
    /// Builds a normalizer from the built-in aliases plus `extra` pairs.
    /// Extra pairs are cleaned on both sides and win over built-ins.
    pub fn with_extra_aliases<'a, I>(extra: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        let mut normalizer = Self::default();
        for (alias, base) in extra {
            let alias = clean_symbol(alias);
            let base = clean_symbol(base);
            if alias.is_empty() || base.is_empty() {
                continue;
            }
            normalizer.aliases.insert(alias, base);
        }
        normalizer
    }

    /// Canonical symbol for `raw`; empty when nothing usable remains.
    pub fn normalize(&self, raw: &str) -> String {
        let cleaned = clean_symbol(raw);
        match self.aliases.get(&cleaned) {
            Some(base) => base.clone(),
            None => cleaned,
        }
    }

    /// Base symbol for an already-cleaned symbol, if it is an alias.
    pub fn base_of(&self, cleaned: &str) -> Option<&str> {
        self.aliases.get(cleaned).map(String::as_str)
    }
}
