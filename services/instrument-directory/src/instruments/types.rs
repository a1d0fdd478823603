//! Instrument catalog record types
//!
//! The upstream catalog is a JSON array of loosely-typed objects. Every field
//! except the key is optional, unknown fields are ignored, and a handful of
//! attributes that upstream has shipped both as strings and as numbers are
//! decoded leniently so a single odd row cannot fail the whole catalog:
//! `null` leaves a field unset and scalars are accepted where text is expected.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Instrument type code for cash-market equities
pub const EQUITY_INSTRUMENT_TYPE: &str = "EQ";

/// One tradable security or index entry from the catalog
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstrumentRecord {
    /// Opaque upstream identifier, e.g. `NSE_EQ|INE002A01018`
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub instrument_key: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub exchange_token: Option<String>,

    /// Human ticker, e.g. `RELIANCE`
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub trading_symbol: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,

    /// Venue code, e.g. `NSE`; records without one are not stored
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub exchange: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub segment: Option<String>,

    /// `EQ`, `INDEX`, `FUT`, `CE`, `PE`, ...; records without one are not stored
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub instrument_type: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub isin: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_i64", skip_serializing_if = "Option::is_none")]
    pub lot_size: Option<i64>,

    #[serde(default, deserialize_with = "lenient::opt_f64", skip_serializing_if = "Option::is_none")]
    pub tick_size: Option<f64>,

    #[serde(default, deserialize_with = "lenient::opt_f64", skip_serializing_if = "Option::is_none")]
    pub freeze_quantity: Option<f64>,

    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub underlying_key: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub underlying_type: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub option_type: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_f64", skip_serializing_if = "Option::is_none")]
    pub strike_price: Option<f64>,

    /// Upstream sends epoch millis; older dumps used ISO dates
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub expiry: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_bool", skip_serializing_if = "Option::is_none")]
    pub weekly: Option<bool>,

    #[serde(default, deserialize_with = "lenient::opt_i64", skip_serializing_if = "Option::is_none")]
    pub minimum_lot_size: Option<i64>,

    #[serde(default, deserialize_with = "lenient::opt_i64", skip_serializing_if = "Option::is_none")]
    pub precision: Option<i64>,

    #[serde(default, deserialize_with = "lenient::opt_f64", skip_serializing_if = "Option::is_none")]
    pub multiplier: Option<f64>,

    #[serde(default, deserialize_with = "lenient::opt_f64", skip_serializing_if = "Option::is_none")]
    pub base_price: Option<f64>,

    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub cross_currency: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub underlying_symbol: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub underlying_listing_id: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub underlying_group: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_i64", skip_serializing_if = "Option::is_none")]
    pub market_lot: Option<i64>,

    #[serde(default, deserialize_with = "lenient::opt_bool", skip_serializing_if = "Option::is_none")]
    pub is_index: Option<bool>,

    #[serde(default, deserialize_with = "lenient::opt_i64", skip_serializing_if = "Option::is_none")]
    pub max_single_order_quantity: Option<i64>,

    #[serde(default, deserialize_with = "lenient::opt_f64", skip_serializing_if = "Option::is_none")]
    pub max_single_order_value: Option<f64>,

    #[serde(default, deserialize_with = "lenient::opt_i64", skip_serializing_if = "Option::is_none")]
    pub max_quantity_freeze: Option<i64>,

    #[serde(default, deserialize_with = "lenient::opt_f64", skip_serializing_if = "Option::is_none")]
    pub daily_price_range_lower: Option<f64>,

    #[serde(default, deserialize_with = "lenient::opt_f64", skip_serializing_if = "Option::is_none")]
    pub daily_price_range_upper: Option<f64>,
}

impl InstrumentRecord {
    /// Minimal record with the fields resolution cares about
    pub fn new(
        instrument_key: impl Into<String>,
        exchange: impl Into<String>,
        trading_symbol: impl Into<String>,
        instrument_type: impl Into<String>,
    ) -> Self {
        Self {
            instrument_key: Some(instrument_key.into()),
            exchange: Some(exchange.into()),
            trading_symbol: Some(trading_symbol.into()),
            instrument_type: Some(instrument_type.into()),
            ..Self::default()
        }
    }

    /// Set the display name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the short name
    #[must_use]
    pub fn with_short_name(mut self, short_name: impl Into<String>) -> Self {
        self.short_name = Some(short_name.into());
        self
    }

    /// Instrument key, if the catalog supplied a non-empty one
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.instrument_key.as_deref().filter(|key| !key.trim().is_empty())
    }

    /// Cash-market equity, the only type that takes part in resolution and search
    #[must_use]
    pub fn is_equity(&self) -> bool {
        self.instrument_type.as_deref() == Some(EQUITY_INSTRUMENT_TYPE)
    }

    /// Has both an exchange and an instrument type
    #[must_use]
    pub fn is_storable(&self) -> bool {
        self.exchange.is_some() && self.instrument_type.is_some()
    }

    /// Case-insensitive substring match on symbol, name or short name
    ///
    /// `needle` must already be lowercase.
    #[must_use]
    pub fn matches_query(&self, needle: &str) -> bool {
        [&self.trading_symbol, &self.name, &self.short_name]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

/// Lenient scalar decoders for fields upstream has typed inconsistently
mod lenient {
    use super::{Deserialize, Deserializer, Value};

    pub(super) fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            Some(Value::String(s)) => Some(s),
            Some(Value::Number(n)) => Some(n.to_string()),
            Some(Value::Bool(b)) => Some(b.to_string()),
            _ => None,
        })
    }

    pub(super) fn opt_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            Some(Value::Number(n)) => n.as_i64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite() && f.fract() == 0.0)
                    .map(|f| f as i64)
            }),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        })
    }

    pub(super) fn opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        })
    }

    pub(super) fn opt_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            Some(Value::Bool(b)) => Some(b),
            Some(Value::String(s)) => s.trim().parse().ok(),
            Some(Value::Number(n)) => n.as_i64().map(|v| v != 0),
            _ => None,
        })
    }
}
