//! Instrument Directory
//!
//! Keeps a local copy of the broker's instrument catalog and resolves
//! human-readable trading symbols (`RELIANCE` on `NSE`) to the opaque
//! instrument keys the market data APIs expect.

pub mod clock;
pub mod config;
pub mod error;
pub mod instruments;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::DirectoryConfig;
pub use error::{DirectoryError, Result};
pub use instruments::{
    CatalogStatistics, InstrumentDirectory, InstrumentRecord, RefreshOutcome,
};
