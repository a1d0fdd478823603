//! Catalog staleness policy and single-flight refresh
//!
//! A refresh runs fetch -> decompress -> parse -> build -> swap -> cache clear
//! as one unit. Failures before the swap leave the published snapshot, the
//! resolution cache and the last update time untouched.

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::{error, info, warn};

use super::cache::ResolvedSymbolCache;
use super::fetcher::CatalogSource;
use super::parser;
use super::store::InstrumentStore;
use super::types::InstrumentRecord;
use crate::clock::Clock;
use crate::error::Result;

/// Result of a refresh request that did not fail
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RefreshOutcome {
    /// A new snapshot was published
    Refreshed {
        generation: u64,
        exchanges: usize,
        instruments: usize,
        dropped: usize,
        elapsed_ms: u64,
    },
    /// Another refresh was running; nothing was done
    AlreadyInProgress,
    /// The snapshot is within its TTL; nothing was done
    Fresh,
}

/// Clears the in-flight flag on drop, including on panic or cancellation
struct RefreshGuard<'a>(&'a AtomicBool);

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Decides staleness and orchestrates catalog reloads
pub struct CacheRefreshPolicy {
    source: Arc<dyn CatalogSource>,
    store: Arc<InstrumentStore>,
    cache: Arc<ResolvedSymbolCache>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    last_update: RwLock<Option<DateTime<Utc>>>,
    refreshing: AtomicBool,
}

impl CacheRefreshPolicy {
    pub fn new(
        source: Arc<dyn CatalogSource>,
        store: Arc<InstrumentStore>,
        cache: Arc<ResolvedSymbolCache>,
        clock: Arc<dyn Clock>,
        ttl: Duration,
    ) -> Self {
        Self {
            source,
            store,
            cache,
            clock,
            ttl,
            last_update: RwLock::new(None),
            refreshing: AtomicBool::new(false),
        }
    }

    /// Time of the last successful refresh
    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        *self.last_update.read()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// A refresh is currently running
    pub fn is_refreshing(&self) -> bool {
        self.refreshing.load(Ordering::Acquire)
    }

    /// Store is empty or the last successful refresh is older than the TTL
    pub fn needs_refresh(&self) -> bool {
        if self.store.is_empty() {
            return true;
        }
        match self.last_update() {
            Some(last) => self.clock.now() - last > self.ttl,
            None => true,
        }
    }

    /// Refresh only when [`needs_refresh`](Self::needs_refresh) says so
    pub async fn refresh_if_needed(&self) -> Result<RefreshOutcome> {
        if self.needs_refresh() {
            self.refresh().await
        } else {
            Ok(RefreshOutcome::Fresh)
        }
    }

    /// Reload the catalog; concurrent callers return immediately
    pub async fn refresh(&self) -> Result<RefreshOutcome> {
        if self
            .refreshing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            info!("Instrument refresh already in progress, skipping");
            return Ok(RefreshOutcome::AlreadyInProgress);
        }
        let _guard = RefreshGuard(&self.refreshing);

        info!("Refreshing instrument catalog");
        let start = Instant::now();

        let records = match self.load_records().await {
            Ok(records) => records,
            Err(e) => {
                error!(error = %e, "Instrument refresh failed, keeping previous snapshot");
                return Err(e);
            }
        };

        let snapshot = self.store.build(records);
        if snapshot.dropped() > 0 {
            warn!(
                dropped = snapshot.dropped(),
                "Catalog records without exchange or instrument type were skipped"
            );
        }
        let generation = snapshot.generation();
        let exchanges = snapshot.exchange_count();
        let instruments = snapshot.total_instruments();
        let dropped = snapshot.dropped();

        self.store.swap(snapshot);
        self.cache.clear();
        *self.last_update.write() = Some(self.clock.now());

        let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        info!(generation, instruments, elapsed_ms, "Instrument catalog refreshed");

        Ok(RefreshOutcome::Refreshed {
            generation,
            exchanges,
            instruments,
            dropped,
            elapsed_ms,
        })
    }

    async fn load_records(&self) -> Result<Vec<InstrumentRecord>> {
        let text = self.source.fetch_catalog().await?;
        parser::parse(&text)
    }
}
