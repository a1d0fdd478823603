//! Catalog JSON parsing

use tracing::info;

use super::types::InstrumentRecord;
use crate::error::{DirectoryError, Result};

/// Parse the decompressed catalog into records
///
/// The payload must be a non-empty JSON array of objects. Unknown fields are
/// ignored and absent optional fields are left unset.
pub fn parse(text: &str) -> Result<Vec<InstrumentRecord>> {
    let records: Vec<InstrumentRecord> = serde_json::from_str(text)
        .map_err(|e| DirectoryError::Format(format!("catalog is not an array of instruments: {e}")))?;

    if records.is_empty() {
        return Err(DirectoryError::Format(
            "catalog contained no instruments".to_string(),
        ));
    }

    info!(count = records.len(), "Parsed instrument catalog");
    Ok(records)
}
