//! Instrument directory service
//!
//! Wires fetcher, store, resolver, refresh policy and statistics together and
//! exposes the operations callers use: symbol resolution, search, validation,
//! forced refresh and statistics.

use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{error, info};

use super::cache::ResolvedSymbolCache;
use super::fetcher::{CatalogSource, DirectoryFetcher};
use super::refresh::{CacheRefreshPolicy, RefreshOutcome};
use super::resolver::SymbolResolver;
use super::stats::{CatalogStatistics, StatisticsReporter};
use super::store::InstrumentStore;
use super::types::InstrumentRecord;
use crate::clock::{Clock, SystemClock};
use crate::config::DirectoryConfig;
use crate::error::Result;

/// Instrument directory: catalog cache plus symbol resolution
pub struct InstrumentDirectory {
    config: DirectoryConfig,
    store: Arc<InstrumentStore>,
    resolver: SymbolResolver,
    policy: Arc<CacheRefreshPolicy>,
    reporter: StatisticsReporter,
}

impl InstrumentDirectory {
    /// Directory backed by the HTTP catalog and the system clock
    pub fn new(config: DirectoryConfig) -> Result<Self> {
        let fetcher = DirectoryFetcher::new(&config.catalog)?;
        Ok(Self::with_source(config, Arc::new(fetcher), Arc::new(SystemClock)))
    }

    /// Directory with an explicit catalog source and clock
    pub fn with_source(
        config: DirectoryConfig,
        source: Arc<dyn CatalogSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let store = Arc::new(InstrumentStore::new());
        let cache = Arc::new(ResolvedSymbolCache::new());
        let policy = Arc::new(CacheRefreshPolicy::new(
            source,
            Arc::clone(&store),
            Arc::clone(&cache),
            clock,
            config.cache.ttl(),
        ));
        let resolver = SymbolResolver::new(Arc::clone(&store), Arc::clone(&cache));
        let reporter = StatisticsReporter::new(Arc::clone(&store), cache, Arc::clone(&policy));

        Self {
            config,
            store,
            resolver,
            policy,
            reporter,
        }
    }

    /// Initial load; the store starts empty so this always fetches
    pub async fn start(&self) -> Result<RefreshOutcome> {
        info!(url = %self.config.catalog.url, "Starting instrument directory");
        self.policy.refresh().await
    }

    pub fn config(&self) -> &DirectoryConfig {
        &self.config
    }

    /// Resolve `(exchange, symbol)` to an instrument key
    pub fn resolve_instrument_key(&self, exchange: &str, symbol: &str) -> Result<String> {
        self.resolver.resolve(exchange, symbol)
    }

    /// Equities on `exchange` matching `query`, at most `max_results`
    pub fn search_instruments(
        &self,
        exchange: &str,
        query: &str,
        max_results: usize,
    ) -> Vec<InstrumentRecord> {
        self.resolver.search(exchange, query, max_results)
    }

    /// Search with the configured default result limit
    pub fn search_instruments_default(&self, exchange: &str, query: &str) -> Vec<InstrumentRecord> {
        self.search_instruments(exchange, query, self.config.cache.default_search_limit)
    }

    pub fn is_valid_symbol(&self, exchange: &str, symbol: &str) -> bool {
        self.resolver.is_valid_symbol(exchange, symbol)
    }

    /// Reload regardless of staleness (scheduler and admin entry point)
    pub async fn force_refresh(&self) -> Result<RefreshOutcome> {
        info!("Force refreshing instruments");
        self.policy.refresh().await
    }

    pub async fn refresh_if_needed(&self) -> Result<RefreshOutcome> {
        self.policy.refresh_if_needed().await
    }

    pub fn needs_refresh(&self) -> bool {
        self.policy.needs_refresh()
    }

    pub fn statistics(&self) -> CatalogStatistics {
        self.reporter.report()
    }

    /// Instruments on `exchange` from the current snapshot
    pub fn instruments(&self, exchange: &str) -> Arc<[InstrumentRecord]> {
        self.store.get(exchange)
    }

    /// Spawn a task that refreshes whenever the snapshot goes stale
    ///
    /// Failures are logged and retried on the next tick only.
    pub fn spawn_auto_refresh(self: &Arc<Self>) -> JoinHandle<()> {
        let directory = Arc::clone(self);
        let period = self.config.cache.check_interval();

        tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // first tick completes immediately; startup already loaded
            ticker.tick().await;

            loop {
                ticker.tick().await;
                match directory.refresh_if_needed().await {
                    Ok(RefreshOutcome::Refreshed { instruments, .. }) => {
                        info!(instruments, "Scheduled instrument refresh completed");
                    }
                    Ok(_) => {}
                    Err(e) => error!(error = %e, "Scheduled instrument refresh failed"),
                }
            }
        })
    }
}
