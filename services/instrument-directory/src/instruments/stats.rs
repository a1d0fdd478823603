//! Read-only catalog statistics

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::cache::ResolvedSymbolCache;
use super::refresh::CacheRefreshPolicy;
use super::store::InstrumentStore;

/// Point-in-time view of the directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStatistics {
    pub last_update: Option<DateTime<Utc>>,
    pub generation: u64,
    pub exchange_count: usize,
    pub total_instrument_count: usize,
    pub cached_symbol_count: usize,
    pub exchange_breakdown: BTreeMap<String, usize>,
}

/// Builds [`CatalogStatistics`] without mutating anything
pub struct StatisticsReporter {
    store: Arc<InstrumentStore>,
    cache: Arc<ResolvedSymbolCache>,
    policy: Arc<CacheRefreshPolicy>,
}

impl StatisticsReporter {
    pub fn new(
        store: Arc<InstrumentStore>,
        cache: Arc<ResolvedSymbolCache>,
        policy: Arc<CacheRefreshPolicy>,
    ) -> Self {
        Self {
            store,
            cache,
            policy,
        }
    }

    /// Report over the snapshot current at call time
    pub fn report(&self) -> CatalogStatistics {
        let snapshot = self.store.current();
        CatalogStatistics {
            last_update: self.policy.last_update(),
            generation: snapshot.generation(),
            exchange_count: snapshot.exchange_count(),
            total_instrument_count: snapshot.total_instruments(),
            cached_symbol_count: self.cache.len_for(snapshot.generation()),
            exchange_breakdown: snapshot.exchange_breakdown(),
        }
    }
}
