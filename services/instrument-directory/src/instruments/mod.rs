//! Instrument catalog download, snapshot storage and symbol resolution
//!
//! - `fetcher` downloads and gunzips the published catalog
//! - `parser` decodes it into [`InstrumentRecord`]s
//! - `store` partitions records by exchange into immutable snapshots
//! - `resolver` maps human symbols to instrument keys through `cache`
//! - `refresh` decides staleness and runs single-flight reloads

pub mod cache;
pub mod fetcher;
pub mod parser;
pub mod refresh;
pub mod resolver;
pub mod service;
pub mod stats;
pub mod store;
pub mod types;

pub use cache::ResolvedSymbolCache;
pub use fetcher::{CatalogSource, DirectoryFetcher};
pub use refresh::{CacheRefreshPolicy, RefreshOutcome};
pub use resolver::{SymbolResolver, Variation, symbol_variations};
pub use service::InstrumentDirectory;
pub use stats::{CatalogStatistics, StatisticsReporter};
pub use store::{CatalogSnapshot, InstrumentStore};
pub use types::*;
