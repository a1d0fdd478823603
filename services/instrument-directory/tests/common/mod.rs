//! Shared fixtures for instrument directory integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use flate2::Compression;
use flate2::write::GzEncoder;
use instrument_directory::config::DirectoryConfig;
use instrument_directory::instruments::CatalogSource;
use instrument_directory::{DirectoryError, InstrumentDirectory, ManualClock, Result};
use parking_lot::Mutex;
use std::io::Write;
use std::sync::Arc;
use std::sync::Once;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

/// Initialize tracing once for the whole test binary
pub fn init_test_env() {
    INIT.call_once(|| {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "instrument_directory=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().with_test_writer())
            .init();
    });
}

pub const TEST_USER_AGENT: &str = "instrument-directory-tests/1.0";

/// Catalog with equities, an index, a future and rows missing required fields
pub const SAMPLE_CATALOG: &str = r#"[
    {"instrument_key":"NSE_EQ|INE002A01018","exchange":"NSE","segment":"NSE_EQ","trading_symbol":"RELIANCE","name":"RELIANCE INDUSTRIES LTD","short_name":"Reliance Industries","instrument_type":"EQ","isin":"INE002A01018","lot_size":1,"tick_size":5.0,"exchange_token":"2885"},
    {"instrument_key":"NSE_EQ|INE155A01022","exchange":"NSE","segment":"NSE_EQ","trading_symbol":"TATAMOTORS","name":"TATA MOTORS LIMITED","short_name":"Tata Motors","instrument_type":"EQ","exchange_token":3456},
    {"instrument_key":"NSE_EQ|INE040A01034","exchange":"NSE","trading_symbol":"HDFCBANK","name":"HDFC BANK LTD","short_name":"HDFC Bank","instrument_type":"EQ"},
    {"instrument_key":"NSE_EQ|INE090A01021","exchange":"NSE","trading_symbol":"ICICIBANK","name":"ICICI BANK LTD.","short_name":"ICICI Bank","instrument_type":"EQ"},
    {"instrument_key":"NSE_EQ|INE062A01020","exchange":"NSE","trading_symbol":"SBIN","name":"STATE BANK OF INDIA","short_name":"SBI","instrument_type":"EQ"},
    {"instrument_key":"NSE_EQ|INE237A01028","exchange":"NSE","trading_symbol":"KOTAKBANK","name":"KOTAK MAHINDRA BANK LTD","short_name":"Kotak Bank","instrument_type":"EQ"},
    {"instrument_key":"NSE_EQ|INE238A01034","exchange":"NSE","trading_symbol":"AXISBANK","name":"AXIS BANK LIMITED","short_name":"Axis Bank","instrument_type":"EQ"},
    {"instrument_key":"NSE_EQ|INE028A01039","exchange":"NSE","trading_symbol":"BANKBARODA","name":"BANK OF BARODA","short_name":"Bank of Baroda","instrument_type":"EQ"},
    {"instrument_key":"NSE_EQ|INE101A01026","exchange":"NSE","trading_symbol":"M&M","name":"MAHINDRA & MAHINDRA LTD","short_name":"M&M","instrument_type":"EQ"},
    {"instrument_key":"NSE_EQ|INE917I01010","exchange":"NSE","trading_symbol":"BAJAJ-AUTO","name":"BAJAJ AUTO LIMITED","short_name":"Bajaj Auto","instrument_type":"EQ"},
    {"instrument_key":"NSE_EQ|INE669E01016","exchange":"NSE","trading_symbol":"IDEA","name":"VODAFONE IDEA LIMITED","short_name":"Vodafone Idea","instrument_type":"EQ"},
    {"instrument_key":"NSE_INDEX|Nifty Bank","exchange":"NSE","segment":"NSE_INDEX","trading_symbol":"BANKNIFTY","name":"Nifty Bank","instrument_type":"INDEX"},
    {"instrument_key":"NSE_FO|35001","exchange":"NSE","segment":"NSE_FO","trading_symbol":"SBIN FUT 30 JAN 25","underlying_symbol":"SBIN","instrument_type":"FUT","lot_size":"1500","expiry":1738175400000,"weekly":false},
    {"instrument_key":"BSE_EQ|INE002A01018","exchange":"BSE","segment":"BSE_EQ","trading_symbol":"RELIANCE","name":"RELIANCE INDUSTRIES LTD","instrument_type":"EQ","unknown_upstream_field":{"nested":true}},
    {"instrument_key":"BSE_EQ|INE009A01021","exchange":"BSE","trading_symbol":"INFY","name":"INFOSYS LIMITED","instrument_type":"EQ"},
    {"instrument_key":"ORPHAN|1","trading_symbol":"NOEXCHANGE","instrument_type":"EQ"},
    {"instrument_key":"ORPHAN|2","exchange":"NSE","trading_symbol":"NOTYPE"}
]"#;

/// Equities listed on NSE in `SAMPLE_CATALOG`
pub const SAMPLE_NSE_EQUITIES: usize = 11;

/// Catalog after a corporate action remapped TATAMOTORS
pub const REMAPPED_CATALOG: &str = r#"[
    {"instrument_key":"NSE_EQ|INE155A01030","exchange":"NSE","trading_symbol":"TATAMOTORS","name":"TATA MOTORS LIMITED","instrument_type":"EQ"},
    {"instrument_key":"NSE_EQ|INE002A01018","exchange":"NSE","trading_symbol":"RELIANCE","name":"RELIANCE INDUSTRIES LTD","instrument_type":"EQ"}
]"#;

/// Gzip `text` the way the catalog is published
pub fn gzip(text: &str) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(text.as_bytes())
        .expect("Failed to write gzip payload");
    encoder.finish().expect("Failed to finish gzip payload")
}

/// Config pointing at `url` with background refresh disabled
pub fn test_config(url: &str) -> DirectoryConfig {
    let mut config = DirectoryConfig::default();
    config.catalog.url = url.to_string();
    config.catalog.connect_timeout_secs = 2;
    config.catalog.read_timeout_secs = 5;
    config.catalog.user_agent = Some(TEST_USER_AGENT.to_string());
    config.cache.auto_refresh = false;
    config
}

/// Clock frozen at a fixed morning
pub fn test_clock() -> Arc<ManualClock> {
    let start = Utc
        .with_ymd_and_hms(2025, 1, 6, 6, 0, 0)
        .single()
        .expect("Invalid test start time");
    Arc::new(ManualClock::new(start))
}

/// In-memory catalog source that serves a replaceable payload
pub struct StubCatalog {
    payload: Mutex<Result<String>>,
    calls: AtomicUsize,
}

impl StubCatalog {
    pub fn serving(text: &str) -> Arc<Self> {
        Arc::new(Self {
            payload: Mutex::new(Ok(text.to_string())),
            calls: AtomicUsize::new(0),
        })
    }

    /// Serve `text` on subsequent fetches
    pub fn set_catalog(&self, text: &str) {
        *self.payload.lock() = Ok(text.to_string());
    }

    /// Fail subsequent fetches with a network error
    pub fn fail_with(&self, message: &str) {
        *self.payload.lock() = Err(DirectoryError::Network(message.to_string()));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogSource for StubCatalog {
    async fn fetch_catalog(&self) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &*self.payload.lock() {
            Ok(text) => Ok(text.clone()),
            Err(DirectoryError::Network(message)) => Err(DirectoryError::Network(message.clone())),
            Err(other) => Err(DirectoryError::Network(other.to_string())),
        }
    }
}

/// Directory loaded from `SAMPLE_CATALOG` through a stub source
pub async fn loaded_directory() -> (InstrumentDirectory, Arc<StubCatalog>, Arc<ManualClock>) {
    directory_with_catalog(SAMPLE_CATALOG).await
}

/// Directory loaded from `catalog` through a stub source
pub async fn directory_with_catalog(
    catalog: &str,
) -> (InstrumentDirectory, Arc<StubCatalog>, Arc<ManualClock>) {
    init_test_env();
    let source = StubCatalog::serving(catalog);
    let clock = test_clock();
    let directory = InstrumentDirectory::with_source(
        test_config("http://unused.invalid/complete.json.gz"),
        source.clone(),
        clock.clone(),
    );
    directory
        .start()
        .await
        .expect("Failed to load test catalog");
    (directory, source, clock)
}
