//! Symbol resolution and instrument search
//!
//! Resolution is first-hit, not scored: an exact case-insensitive match wins,
//! otherwise a fixed list of symbol variations is tried in priority order.
//! Only cash-equity (`EQ`) records take part.

use std::sync::Arc;
use tracing::debug;

use super::cache::ResolvedSymbolCache;
use super::store::{CatalogSnapshot, InstrumentStore};
use super::types::InstrumentRecord;
use crate::error::{DirectoryError, Result};

/// Candidate-generation strategies, in the order they are tried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variation {
    Unchanged,
    Uppercase,
    Lowercase,
    StripBeSuffix,
    StripEqUnderscoreSuffix,
    AppendEqSuffix,
    RemoveAmpersand,
    AmpersandToAnd,
    RemoveHyphens,
}

impl Variation {
    pub const ALL: [Self; 9] = [
        Self::Unchanged,
        Self::Uppercase,
        Self::Lowercase,
        Self::StripBeSuffix,
        Self::StripEqUnderscoreSuffix,
        Self::AppendEqSuffix,
        Self::RemoveAmpersand,
        Self::AmpersandToAnd,
        Self::RemoveHyphens,
    ];

    /// Candidate for `symbol`, or `None` when the strategy does not apply
    pub fn apply(self, symbol: &str) -> Option<String> {
        match self {
            Self::Unchanged => Some(symbol.to_string()),
            Self::Uppercase => Some(symbol.to_uppercase()),
            Self::Lowercase => Some(symbol.to_lowercase()),
            Self::StripBeSuffix => symbol.strip_suffix("-BE").map(str::to_string),
            Self::StripEqUnderscoreSuffix => symbol.strip_suffix("_EQ").map(str::to_string),
            Self::AppendEqSuffix => (!symbol.ends_with("-EQ")).then(|| format!("{symbol}-EQ")),
            Self::RemoveAmpersand => symbol.contains('&').then(|| symbol.replace('&', "")),
            Self::AmpersandToAnd => symbol.contains('&').then(|| symbol.replace('&', "AND")),
            Self::RemoveHyphens => symbol.contains('-').then(|| symbol.replace('-', "")),
        }
    }
}

/// Ordered, de-duplicated candidates for `symbol` (first occurrence kept)
pub fn symbol_variations(symbol: &str) -> Vec<String> {
    let mut variations: Vec<String> = Vec::with_capacity(Variation::ALL.len());
    for candidate in Variation::ALL.iter().filter_map(|v| v.apply(symbol)) {
        if !variations.contains(&candidate) {
            variations.push(candidate);
        }
    }
    variations
}

/// Resolves `(exchange, symbol)` to instrument keys against the current snapshot
pub struct SymbolResolver {
    store: Arc<InstrumentStore>,
    cache: Arc<ResolvedSymbolCache>,
}

impl SymbolResolver {
    pub fn new(store: Arc<InstrumentStore>, cache: Arc<ResolvedSymbolCache>) -> Self {
        Self { store, cache }
    }

    /// Resolve a human symbol to its instrument key
    pub fn resolve(&self, exchange: &str, symbol: &str) -> Result<String> {
        if exchange.trim().is_empty() || symbol.trim().is_empty() {
            return Err(DirectoryError::Validation(
                "exchange and symbol must not be blank".to_string(),
            ));
        }

        let snapshot = self.store.current();
        let cache_key = ResolvedSymbolCache::key(exchange, symbol);

        if let Some(instrument_key) = self.cache.get(&cache_key, snapshot.generation()) {
            return Ok(instrument_key);
        }

        let instrument_key = find_equity_match(&snapshot, exchange, symbol)
            .and_then(InstrumentRecord::key)
            .map(str::to_string)
            .ok_or_else(|| DirectoryError::NotFound {
                exchange: exchange.to_string(),
                symbol: symbol.to_string(),
            })?;

        debug!(%cache_key, %instrument_key, "Resolved and cached instrument key");
        self.cache
            .insert(cache_key, snapshot.generation(), instrument_key.clone());
        Ok(instrument_key)
    }

    /// Equities on `exchange` whose symbol, name or short name contains `query`
    pub fn search(&self, exchange: &str, query: &str, max_results: usize) -> Vec<InstrumentRecord> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        let snapshot = self.store.current();
        snapshot
            .equities(exchange)
            .filter(|record| record.matches_query(&needle))
            .take(max_results)
            .cloned()
            .collect()
    }

    /// True iff `resolve` succeeds
    pub fn is_valid_symbol(&self, exchange: &str, symbol: &str) -> bool {
        self.resolve(exchange, symbol).is_ok()
    }
}

fn find_equity_match<'a>(
    snapshot: &'a CatalogSnapshot,
    exchange: &str,
    symbol: &str,
) -> Option<&'a InstrumentRecord> {
    if let Some(record) = snapshot.find_equity(exchange, symbol) {
        return Some(record);
    }

    symbol_variations(symbol)
        .iter()
        .find_map(|candidate| snapshot.find_equity(exchange, candidate))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variations_order() {
        assert_eq!(
            symbol_variations("Bajaj-Auto"),
            vec!["Bajaj-Auto", "BAJAJ-AUTO", "bajaj-auto", "Bajaj-Auto-EQ", "BajajAuto"]
        );
    }

    #[test]
    fn test_variations_strip_suffixes() {
        assert_eq!(
            symbol_variations("IDEA-BE"),
            vec!["IDEA-BE", "idea-be", "IDEA", "IDEA-BE-EQ", "IDEABE"]
        );
        assert_eq!(symbol_variations("SBIN_EQ"), vec!["SBIN_EQ", "sbin_eq", "SBIN", "SBIN_EQ-EQ"]);
    }

    #[test]
    fn test_variations_existing_eq_suffix_not_doubled() {
        let variations = symbol_variations("INFY-EQ");
        assert!(!variations.iter().any(|v| v.ends_with("-EQ-EQ")));
        assert_eq!(variations.last().map(String::as_str), Some("INFYEQ"));
    }

    #[test]
    fn test_variations_ampersand() {
        assert_eq!(
            symbol_variations("M&M"),
            vec!["M&M", "m&m", "M&M-EQ", "MM", "MANDM"]
        );
    }

    #[test]
    fn test_variations_deduplicated() {
        let variations = symbol_variations("TCS");
        assert_eq!(variations, vec!["TCS", "tcs", "TCS-EQ"]);
    }
}
