//! Snapshot-based instrument store
//!
//! The whole catalog lives in one immutable [`CatalogSnapshot`] published
//! through an `ArcSwap`. A refresh builds the next snapshot off to the side and
//! swaps it in; readers that already loaded the previous one keep it alive
//! until they drop their `Arc`.

use arc_swap::ArcSwap;
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

use super::types::InstrumentRecord;

/// One immutable generation of the catalog, partitioned by exchange
#[derive(Debug, Default)]
pub struct CatalogSnapshot {
    generation: u64,
    by_exchange: FxHashMap<String, Arc<[InstrumentRecord]>>,
    /// exchange -> upper-cased equity trading symbol -> first keyed position
    equity_index: FxHashMap<String, FxHashMap<String, usize>>,
    total_instruments: usize,
    dropped: usize,
}

impl CatalogSnapshot {
    /// Generation counter; 0 is the empty startup snapshot
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Instruments listed on `exchange`, in catalog order
    pub fn instruments(&self, exchange: &str) -> &[InstrumentRecord] {
        self.by_exchange
            .get(exchange)
            .map(|list| &list[..])
            .unwrap_or(&[])
    }

    /// First keyed equity on `exchange` whose trading symbol equals `symbol` ignoring case
    pub fn find_equity(&self, exchange: &str, symbol: &str) -> Option<&InstrumentRecord> {
        let position = *self
            .equity_index
            .get(exchange)?
            .get(&symbol.to_ascii_uppercase())?;
        self.by_exchange.get(exchange)?.get(position)
    }

    /// Equities on `exchange`, in catalog order
    pub fn equities<'a>(&'a self, exchange: &str) -> impl Iterator<Item = &'a InstrumentRecord> + 'a {
        self.instruments(exchange)
            .iter()
            .filter(|record| record.is_equity())
    }

    pub fn exchange_count(&self) -> usize {
        self.by_exchange.len()
    }

    pub fn total_instruments(&self) -> usize {
        self.total_instruments
    }

    /// Records rejected while building this snapshot
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn is_empty(&self) -> bool {
        self.total_instruments == 0
    }

    /// Instrument count per exchange, sorted by exchange code
    pub fn exchange_breakdown(&self) -> BTreeMap<String, usize> {
        self.by_exchange
            .iter()
            .map(|(exchange, list)| (exchange.clone(), list.len()))
            .collect()
    }
}

/// Holder of the current catalog snapshot
pub struct InstrumentStore {
    current: ArcSwap<CatalogSnapshot>,
    next_generation: AtomicU64,
}

impl InstrumentStore {
    /// Empty store (generation 0)
    pub fn new() -> Self {
        Self {
            current: ArcSwap::from_pointee(CatalogSnapshot::default()),
            next_generation: AtomicU64::new(1),
        }
    }

    /// Build the next snapshot from parsed records without publishing it
    ///
    /// Records with no exchange or no instrument type are dropped rather than
    /// failing the refresh.
    pub fn build(&self, records: Vec<InstrumentRecord>) -> CatalogSnapshot {
        let mut grouped: FxHashMap<String, Vec<InstrumentRecord>> = FxHashMap::default();
        let mut dropped = 0;

        for record in records {
            let Some(exchange) = record.exchange.clone().filter(|_| record.is_storable()) else {
                dropped += 1;
                continue;
            };
            grouped.entry(exchange).or_default().push(record);
        }

        let mut equity_index: FxHashMap<String, FxHashMap<String, usize>> = FxHashMap::default();
        let mut total_instruments = 0;
        let by_exchange = grouped
            .into_iter()
            .map(|(exchange, list)| {
                total_instruments += list.len();
                let index = equity_index.entry(exchange.clone()).or_default();
                for (position, record) in list.iter().enumerate() {
                    if !record.is_equity() || record.key().is_none() {
                        continue;
                    }
                    if let Some(symbol) = &record.trading_symbol {
                        index.entry(symbol.to_ascii_uppercase()).or_insert(position);
                    }
                }
                (exchange, Arc::from(list))
            })
            .collect();

        CatalogSnapshot {
            generation: self.next_generation.fetch_add(1, Ordering::Relaxed),
            by_exchange,
            equity_index,
            total_instruments,
            dropped,
        }
    }

    /// Publish `snapshot` as the current catalog
    pub fn swap(&self, snapshot: CatalogSnapshot) {
        info!(
            generation = snapshot.generation,
            exchanges = snapshot.exchange_count(),
            instruments = snapshot.total_instruments,
            "Publishing instrument snapshot"
        );
        self.current.store(Arc::new(snapshot));
    }

    /// Current snapshot reference
    pub fn current(&self) -> Arc<CatalogSnapshot> {
        self.current.load_full()
    }

    /// Instruments on `exchange` from the current snapshot; empty if unknown
    pub fn get(&self, exchange: &str) -> Arc<[InstrumentRecord]> {
        self.current
            .load()
            .by_exchange
            .get(exchange)
            .cloned()
            .unwrap_or_else(|| Arc::from(Vec::new()))
    }

    pub fn is_empty(&self) -> bool {
        self.current.load().is_empty()
    }
}

impl Default for InstrumentStore {
    fn default() -> Self {
        Self::new()
    }
}
