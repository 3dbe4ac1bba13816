//! Quote persistence
//!
//! Saves and loads the quote collection and the small bits of UI state
//! that go with it.
//!
//! Slots:
//! - `quotes` (durable) - the full collection as a JSON array
//! - `selectedCategory` (durable) - last chosen category filter
//! - `lastShownIndex` (session) - index of the last quote shown
//!
//! The plain accessors never fail: storage problems are logged and the
//! caller gets "nothing saved" / "nothing loaded". The `try_*` variants
//! return the underlying [`StorageError`].

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use super::error::{StorageError, StorageResult};
use super::slots::{FileSlots, MemorySlots, SlotStore};
use crate::config::Config;
use crate::models::{CategoryFilter, Quote};

/// Durable slot holding the collection
pub const QUOTES_SLOT: &str = "quotes";

/// Durable slot holding the selected category filter
pub const SELECTED_CATEGORY_SLOT: &str = "selectedCategory";

/// Session slot holding the last shown index
pub const LAST_SHOWN_INDEX_SLOT: &str = "lastShownIndex";

/// Result of decoding a serialized collection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedQuotes {
    /// Records that passed validation, in order
    pub quotes: Vec<Quote>,
    /// Records dropped for being malformed or invalid
    pub skipped: usize,
}

/// Decode a JSON array of quotes, dropping invalid records
///
/// Fails only if the input is not a JSON array.
pub fn decode_quotes(raw: &str) -> Result<DecodedQuotes, serde_json::Error> {
    let records: Vec<Value> = serde_json::from_str(raw)?;
    let mut decoded = DecodedQuotes::default();

    for record in records {
        let quote = serde_json::from_value::<Quote>(record)
            .ok()
            .and_then(|raw| Quote::new(&raw.text, &raw.category).ok());
        match quote {
            Some(quote) => decoded.quotes.push(quote),
            None => decoded.skipped += 1,
        }
    }

    Ok(decoded)
}

/// Encode a collection as a pretty JSON array
pub fn encode_quotes(quotes: &[Quote]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(quotes)
}

/// Persistence layer for quotes and UI state
#[derive(Clone)]
pub struct QuotePersistence {
    durable: Arc<dyn SlotStore>,
    session: Arc<dyn SlotStore>,
}

impl QuotePersistence {
    /// File-backed durable slots in the configured data directory and a
    /// fresh in-memory session
    pub fn new(config: &Config) -> Self {
        Self::with_slots(
            Arc::new(FileSlots::new(&config.data_dir)),
            Arc::new(MemorySlots::new()),
        )
    }

    /// Use explicit slot stores
    pub fn with_slots(durable: Arc<dyn SlotStore>, session: Arc<dyn SlotStore>) -> Self {
        Self { durable, session }
    }

    // ==================== Collection ====================

    /// Serialize the collection into the durable slot
    pub fn try_save(&self, quotes: &[Quote]) -> StorageResult<()> {
        let json = encode_quotes(quotes).map_err(|source| StorageError::Encode {
            slot: QUOTES_SLOT.to_string(),
            source,
        })?;
        self.durable.set(QUOTES_SLOT, &json)?;
        debug!("Saved {} quotes", quotes.len());
        Ok(())
    }

    /// Save the collection, logging instead of failing
    ///
    /// Returns whether the write reached storage.
    pub fn save(&self, quotes: &[Quote]) -> bool {
        match self.try_save(quotes) {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to save quotes: {}", e);
                false
            }
        }
    }

    /// Read and validate the durable collection
    ///
    /// `Ok(None)` when the slot is empty or nothing valid is left after
    /// dropping invalid records.
    pub fn try_load(&self) -> StorageResult<Option<Vec<Quote>>> {
        let Some(raw) = self.durable.get(QUOTES_SLOT)? else {
            return Ok(None);
        };

        if raw.trim().is_empty() {
            return Ok(None);
        }

        let decoded = decode_quotes(&raw).map_err(|e| StorageError::Corrupt {
            slot: QUOTES_SLOT.to_string(),
            details: e.to_string(),
        })?;

        if decoded.skipped > 0 {
            warn!("Dropped {} invalid saved quotes", decoded.skipped);
        }

        if decoded.quotes.is_empty() {
            return Ok(None);
        }

        Ok(Some(decoded.quotes))
    }

    /// Load the collection, treating any failure as "nothing saved"
    pub fn load(&self) -> Option<Vec<Quote>> {
        match self.try_load() {
            Ok(quotes) => quotes,
            Err(e) => {
                warn!("Failed to load saved quotes: {}", e);
                None
            }
        }
    }

    /// Whether a collection has been saved
    pub fn has_saved_quotes(&self) -> bool {
        matches!(self.durable.get(QUOTES_SLOT), Ok(Some(_)))
    }

    /// Remove the durable collection slot
    ///
    /// Returns whether the slot is gone.
    pub fn clear(&self) -> bool {
        match self.durable.remove(QUOTES_SLOT) {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to remove saved quotes: {}", e);
                false
            }
        }
    }

    // ==================== UI State ====================

    /// Index of the last quote shown in this session
    pub fn last_shown_index(&self) -> Option<usize> {
        match self.session.get(LAST_SHOWN_INDEX_SLOT) {
            Ok(value) => value.and_then(|v| v.trim().parse().ok()),
            Err(e) => {
                warn!("Failed to read last shown index: {}", e);
                None
            }
        }
    }

    /// Remember the last shown index for this session
    pub fn set_last_shown_index(&self, index: usize) {
        if let Err(e) = self.session.set(LAST_SHOWN_INDEX_SLOT, &index.to_string()) {
            warn!("Failed to store last shown index: {}", e);
        }
    }

    /// Last selected category filter (`All` if never set)
    pub fn selected_category(&self) -> CategoryFilter {
        match self.durable.get(SELECTED_CATEGORY_SLOT) {
            Ok(Some(raw)) => {
                let value = serde_json::from_str::<String>(&raw).unwrap_or(raw);
                CategoryFilter::parse(&value)
            }
            Ok(None) => CategoryFilter::All,
            Err(e) => {
                warn!("Failed to read selected category: {}", e);
                CategoryFilter::All
            }
        }
    }

    /// Persist the selected category filter
    pub fn set_selected_category(&self, filter: &CategoryFilter) {
        let result = serde_json::to_string(filter.as_str())
            .map_err(|source| StorageError::Encode {
                slot: SELECTED_CATEGORY_SLOT.to_string(),
                source,
            })
            .and_then(|json| self.durable.set(SELECTED_CATEGORY_SLOT, &json));

        if let Err(e) = result {
            warn!("Failed to store selected category: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::seed_quotes;
    use std::fs;
    use tempfile::TempDir;

    fn file_persistence(temp_dir: &TempDir) -> QuotePersistence {
        QuotePersistence::with_slots(
            Arc::new(FileSlots::new(temp_dir.path())),
            Arc::new(MemorySlots::new()),
        )
    }

    /// Slot store whose writes always fail, like a full or disabled disk
    struct FailingSlots;

    impl SlotStore for FailingSlots {
        fn get(&self, _key: &str) -> StorageResult<Option<String>> {
            Err(StorageError::Corrupt {
                slot: "any".to_string(),
                details: "storage disabled".to_string(),
            })
        }

        fn set(&self, _key: &str, _value: &str) -> StorageResult<()> {
            Err(StorageError::writing(
                std::io::Error::new(std::io::ErrorKind::Other, "quota exceeded"),
                "quotes.json".into(),
            ))
        }

        fn remove(&self, _key: &str) -> StorageResult<()> {
            self.set("", "")
        }
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = file_persistence(&temp_dir);

        let mut quotes = seed_quotes();
        quotes.push(Quote::new("Ünïcödé \"quoted\"", "Misc").unwrap());

        assert!(persistence.save(&quotes));
        assert_eq!(persistence.load(), Some(quotes));
    }

    #[test]
    fn test_load_missing_slot_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = file_persistence(&temp_dir);

        assert!(!persistence.has_saved_quotes());
        assert!(persistence.load().is_none());
    }

    #[test]
    fn test_load_drops_invalid_records() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = file_persistence(&temp_dir);
        fs::write(
            temp_dir.path().join("quotes.json"),
            r#"[
                {"text": "kept", "category": "A"},
                {"text": "", "category": "A"},
                {"text": "no category"},
                42,
                {"text": "also kept", "category": "B", "extra": true}
            ]"#,
        )
        .unwrap();

        let loaded = persistence.load().unwrap();
        let texts: Vec<_> = loaded.iter().map(|q| q.text.as_str()).collect();
        assert_eq!(texts, vec!["kept", "also kept"]);
    }

    #[test]
    fn test_load_all_invalid_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = file_persistence(&temp_dir);
        fs::write(
            temp_dir.path().join("quotes.json"),
            r#"[{"text": " ", "category": "A"}]"#,
        )
        .unwrap();

        assert!(persistence.load().is_none());
    }

    #[test]
    fn test_load_unparsable_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = file_persistence(&temp_dir);
        fs::write(temp_dir.path().join("quotes.json"), "{not json").unwrap();

        assert!(persistence.load().is_none());
        assert!(matches!(
            persistence.try_load(),
            Err(StorageError::Corrupt { .. })
        ));
    }

    #[test]
    fn test_load_empty_array_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = file_persistence(&temp_dir);
        persistence.save(&[]);

        assert!(persistence.has_saved_quotes());
        assert!(persistence.load().is_none());
    }

    #[test]
    fn test_clear_removes_slot() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = file_persistence(&temp_dir);
        persistence.save(&seed_quotes());

        assert!(persistence.clear());
        assert!(!persistence.has_saved_quotes());
        assert!(!temp_dir.path().join("quotes.json").exists());
    }

    #[test]
    fn test_failing_storage_never_errors_out() {
        let persistence =
            QuotePersistence::with_slots(Arc::new(FailingSlots), Arc::new(FailingSlots));

        assert!(!persistence.save(&seed_quotes()));
        assert!(persistence.load().is_none());
        assert!(!persistence.clear());

        persistence.set_last_shown_index(1);
        assert!(persistence.last_shown_index().is_none());

        persistence.set_selected_category(&CategoryFilter::parse("Wisdom"));
        assert_eq!(persistence.selected_category(), CategoryFilter::All);
    }

    #[test]
    fn test_try_save_reports_error() {
        let persistence =
            QuotePersistence::with_slots(Arc::new(FailingSlots), Arc::new(MemorySlots::new()));

        let err = persistence.try_save(&seed_quotes()).unwrap_err();
        assert!(matches!(err, StorageError::OutOfSpace { .. }));
    }

    #[test]
    fn test_last_shown_index() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = file_persistence(&temp_dir);

        assert!(persistence.last_shown_index().is_none());
        persistence.set_last_shown_index(2);
        assert_eq!(persistence.last_shown_index(), Some(2));
    }

    #[test]
    fn test_last_shown_index_is_session_scoped() {
        let temp_dir = TempDir::new().unwrap();
        file_persistence(&temp_dir).set_last_shown_index(2);

        // A new session over the same data directory starts fresh
        assert!(file_persistence(&temp_dir).last_shown_index().is_none());
    }

    #[test]
    fn test_selected_category_is_durable() {
        let temp_dir = TempDir::new().unwrap();
        assert_eq!(
            file_persistence(&temp_dir).selected_category(),
            CategoryFilter::All
        );

        file_persistence(&temp_dir).set_selected_category(&CategoryFilter::parse("Wisdom"));

        assert_eq!(
            file_persistence(&temp_dir).selected_category(),
            CategoryFilter::Category("Wisdom".to_string())
        );
    }

    #[test]
    fn test_decode_quotes_counts_skipped() {
        let decoded =
            decode_quotes(r#"[{"text":"a","category":"X"},{"text":"","category":"X"}]"#).unwrap();
        assert_eq!(decoded.quotes.len(), 1);
        assert_eq!(decoded.skipped, 1);

        assert!(decode_quotes(r#"{"text":"a","category":"X"}"#).is_err());
    }
}
