//! Import and export of quote collections
//!
//! The exchange format is the same JSON array used for the durable slot.

use serde::Serialize;
use thiserror::Error;

use crate::models::Quote;
use crate::storage::{decode_quotes, encode_quotes};
use crate::store::QuoteStore;

/// Default file name for exported collections
pub const EXPORT_FILE_NAME: &str = "quotes.json";

/// Errors importing a collection
#[derive(Error, Debug)]
pub enum ImportError {
    /// Input was not a JSON array
    #[error("Import data is not a JSON array of quotes: {0}")]
    Parse(#[from] serde_json::Error),
}

/// What an import did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    /// Quotes appended to the collection
    pub imported: usize,
    /// Records rejected as malformed or invalid
    pub skipped: usize,
}

/// Serialize a collection for export
pub fn export_quotes(quotes: &[Quote]) -> Result<String, serde_json::Error> {
    encode_quotes(quotes)
}

/// Parse raw import data and append the valid records to the store
///
/// Duplicates by text are allowed; only sync deduplicates.
pub fn import_into(store: &mut QuoteStore, raw: &str) -> Result<ImportReport, ImportError> {
    let decoded = decode_quotes(raw)?;
    let imported = store.extend_valid(decoded.quotes);
    Ok(ImportReport {
        imported,
        skipped: decoded.skipped,
    })
}
