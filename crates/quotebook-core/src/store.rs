//! In-memory quote collection
//!
//! `QuoteStore` is the single source of truth for the running process.
//! It does no I/O; persistence and sync go through `QuoteBook` and
//! `SyncEngine`, which hold the store behind a [`SharedStore`] lock.
//!
//! ## Usage
//!
//! ```ignore
//! let mut store = QuoteStore::new(seed_quotes());
//! store.add("Less is more.", "Design")?;
//! assert_eq!(store.len(), 4);
//! ```

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::models::{Quote, ValidationError};

/// Store shared between the facade and the sync engine
///
/// Holding the lock is the critical section for any read-modify-write
/// of the collection.
pub type SharedStore = Arc<Mutex<QuoteStore>>;

/// Ordered collection of validated quotes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuoteStore {
    quotes: Vec<Quote>,
}

impl QuoteStore {
    /// Create a store from an initial collection
    ///
    /// Invalid entries are dropped.
    pub fn new(quotes: Vec<Quote>) -> Self {
        let mut store = Self::default();
        store.replace_all(quotes);
        store
    }

    /// Wrap this store for sharing across tasks
    pub fn into_shared(self) -> SharedStore {
        Arc::new(Mutex::new(self))
    }

    /// Read-only view of every quote, in insertion order
    pub fn all(&self) -> &[Quote] {
        &self.quotes
    }

    /// Validate and append a quote
    ///
    /// Returns the stored (trimmed) quote.
    pub fn add(&mut self, text: &str, category: &str) -> Result<Quote, ValidationError> {
        let quote = Quote::new(text, category)?;
        self.quotes.push(quote.clone());
        Ok(quote)
    }

    /// Append already-built quotes, skipping any that fail validation
    ///
    /// Returns how many were appended.
    pub fn extend_valid(&mut self, quotes: impl IntoIterator<Item = Quote>) -> usize {
        let before = self.quotes.len();
        self.quotes
            .extend(quotes.into_iter().filter(|q| q.validate().is_ok()));
        self.quotes.len() - before
    }

    /// Swap the whole collection
    ///
    /// Used after loading from disk and after a sync merge.
    pub fn replace_all(&mut self, quotes: Vec<Quote>) {
        self.quotes = quotes
            .into_iter()
            .filter(|q| q.validate().is_ok())
            .collect();
    }

    /// Remove every quote
    pub fn clear(&mut self) {
        self.quotes.clear();
    }

    /// Number of quotes
    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    /// Whether the store holds no quotes
    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}
