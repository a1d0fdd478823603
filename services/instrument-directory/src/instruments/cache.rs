//! Resolved symbol cache
//!
//! Entries are tagged with the snapshot generation that produced them. A
//! lookup only returns an entry whose generation matches the snapshot the
//! caller is resolving against, so a resolver racing a refresh can never hand
//! out a key from the superseded catalog.

use dashmap::DashMap;

#[derive(Debug, Clone)]
struct CachedKey {
    generation: u64,
    instrument_key: String,
}

/// Concurrent `EXCHANGE:SYMBOL` -> instrument key map
#[derive(Debug, Default)]
pub struct ResolvedSymbolCache {
    entries: DashMap<String, CachedKey>,
}

impl ResolvedSymbolCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache key: exchange as given, symbol upper-cased
    pub fn key(exchange: &str, symbol: &str) -> String {
        format!("{exchange}:{}", symbol.to_uppercase())
    }

    /// Cached key for `cache_key`, if it was resolved against `generation`
    pub fn get(&self, cache_key: &str, generation: u64) -> Option<String> {
        self.entries
            .get(cache_key)
            .filter(|entry| entry.generation == generation)
            .map(|entry| entry.instrument_key.clone())
    }

    /// Record a resolution; concurrent writers of the same mapping are benign
    pub fn insert(&self, cache_key: String, generation: u64, instrument_key: String) {
        self.entries.insert(
            cache_key,
            CachedKey {
                generation,
                instrument_key,
            },
        );
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Entries resolved against `generation`
    pub fn len_for(&self, generation: u64) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.generation == generation)
            .count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_uppercases_symbol_only() {
        assert_eq!(ResolvedSymbolCache::key("NSE", "reliance"), "NSE:RELIANCE");
        assert_eq!(ResolvedSymbolCache::key("nse", "M&M"), "nse:M&M");
    }

    #[test]
    fn test_generation_mismatch_is_a_miss() {
        let cache = ResolvedSymbolCache::new();
        cache.insert("NSE:TCS".into(), 1, "NSE_EQ|INE467B01029".into());

        assert_eq!(cache.get("NSE:TCS", 1).as_deref(), Some("NSE_EQ|INE467B01029"));
        assert_eq!(cache.get("NSE:TCS", 2), None);
        assert_eq!(cache.len_for(1), 1);
        assert_eq!(cache.len_for(2), 0);
    }

    #[test]
    fn test_clear() {
        let cache = ResolvedSymbolCache::new();
        cache.insert("NSE:TCS".into(), 1, "A".into());
        cache.insert("NSE:INFY".into(), 1, "B".into());
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert!(cache.is_empty());
    }
}
