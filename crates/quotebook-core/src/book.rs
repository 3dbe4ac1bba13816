//! Quote book: the main entry point
//!
//! `QuoteBook` owns the shared store, the persistence layer and the
//! configuration, and exposes everything a front end needs: showing,
//! adding, filtering, importing, exporting and clearing quotes, plus a
//! ready-wired [`SyncEngine`].
//!
//! ## Startup
//!
//! On first run the book starts from the built-in seed quotes. After
//! that it loads the saved collection, which replaces the seed entirely.
//!
//! ## Usage
//!
//! ```ignore
//! let book = QuoteBook::open()?;
//! book.add_quote("Less is more.", "Design").await?;
//! if let Some(quote) = book.show_quote(None).await {
//!     println!("{}", quote);
//! }
//! ```

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::config::Config;
use crate::models::{seed_quotes, CategoryFilter, Quote, ValidationError};
use crate::query::{self, Pick};
use crate::storage::QuotePersistence;
use crate::store::{QuoteStore, SharedStore};
use crate::sync::{RemoteSource, SyncEngine, SyncEvent};
use crate::transfer::{self, ImportError, ImportReport};

/// Capacity of the notification channel
const EVENT_CAPACITY: usize = 64;

/// Where the collection came from at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Built-in seed quotes (nothing usable was saved)
    Seed,
    /// Loaded from the durable slot
    Saved,
}

/// Quote collection with persistence and change notifications
pub struct QuoteBook {
    store: SharedStore,
    persistence: QuotePersistence,
    config: Config,
    events: broadcast::Sender<SyncEvent>,
    sync_in_flight: Arc<AtomicBool>,
    origin: Origin,
}

impl QuoteBook {
    /// Open the book using the default configuration
    pub fn open() -> Result<Self> {
        let config = Config::load().context("Failed to load configuration")?;
        Ok(Self::open_with_config(config))
    }

    /// Open the book with a specific configuration
    pub fn open_with_config(config: Config) -> Self {
        let persistence = QuotePersistence::new(&config);
        Self::with_persistence(config, persistence)
    }

    /// Open the book on explicit storage
    pub fn with_persistence(config: Config, persistence: QuotePersistence) -> Self {
        let (quotes, origin) = match persistence.load() {
            Some(quotes) => {
                debug!("Loaded {} saved quotes", quotes.len());
                (quotes, Origin::Saved)
            }
            None => {
                debug!("No saved quotes, starting from seed");
                (seed_quotes(), Origin::Seed)
            }
        };

        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            store: QuoteStore::new(quotes).into_shared(),
            persistence,
            config,
            events,
            sync_in_flight: Arc::new(AtomicBool::new(false)),
            origin,
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Where the collection came from at startup
    pub fn origin(&self) -> Origin {
        self.origin
    }

    /// Get the persistence layer
    pub fn persistence(&self) -> &QuotePersistence {
        &self.persistence
    }

    /// Subscribe to change and sync notifications
    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.events.subscribe()
    }

    /// Build a sync engine over this book's store and storage
    ///
    /// Every engine from the same book shares one in-flight flag, so at
    /// most one cycle runs at a time whichever engine starts it.
    pub fn sync_engine(&self, remote: Arc<dyn RemoteSource>) -> Arc<SyncEngine> {
        Arc::new(SyncEngine::with_in_flight(
            self.store.clone(),
            self.persistence.clone(),
            remote,
            self.events.clone(),
            self.sync_in_flight.clone(),
        ))
    }

    // ==================== Reading ====================

    /// Snapshot of every quote
    pub async fn quotes(&self) -> Vec<Quote> {
        self.store.lock().await.all().to_vec()
    }

    /// Number of quotes
    pub async fn len(&self) -> usize {
        self.store.lock().await.len()
    }

    /// Whether the collection is empty
    pub async fn is_empty(&self) -> bool {
        self.store.lock().await.is_empty()
    }

    /// Category menu: `"all"` then each category in first-seen order
    pub async fn categories(&self) -> Vec<String> {
        query::list_categories(self.store.lock().await.all())
    }

    /// Quotes matching a filter
    pub async fn filtered(&self, filter: &CategoryFilter) -> Vec<Quote> {
        let store = self.store.lock().await;
        query::filter(store.all(), filter)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Pick a random quote and remember it as the last shown
    ///
    /// Uses the saved category selection when no filter is given.
    pub async fn show_quote(&self, filter: Option<&CategoryFilter>) -> Option<Quote> {
        let selected;
        let filter = match filter {
            Some(filter) => filter,
            None => {
                selected = self.persistence.selected_category();
                &selected
            }
        };

        let Pick { index, quote } = {
            let store = self.store.lock().await;
            query::pick_random(store.all(), filter)?
        };

        self.persistence.set_last_shown_index(index);
        Some(quote)
    }

    /// The quote shown last in this session, if it still exists
    pub async fn last_shown(&self) -> Option<Quote> {
        let index = self.persistence.last_shown_index()?;
        self.store.lock().await.all().get(index).cloned()
    }

    /// Saved category selection
    pub fn selected_category(&self) -> CategoryFilter {
        self.persistence.selected_category()
    }

    /// Change the category selection and return the matching quotes
    pub async fn select_category(&self, filter: CategoryFilter) -> Vec<Quote> {
        self.persistence.set_selected_category(&filter);
        self.filtered(&filter).await
    }

    // ==================== Writing ====================

    /// Validate, append and save a new quote
    ///
    /// Waits for any running sync merge, so the quote is added to the
    /// merged collection.
    pub async fn add_quote(&self, text: &str, category: &str) -> Result<Quote, ValidationError> {
        let quote = {
            let mut store = self.store.lock().await;
            let quote = store.add(text, category)?;
            self.persistence.save(store.all());
            quote
        };

        info!("Added quote in category {}", quote.category);
        self.notify_changed();
        Ok(quote)
    }

    /// Append quotes from raw JSON and save
    pub async fn import_json(&self, raw: &str) -> Result<ImportReport, ImportError> {
        let report = {
            let mut store = self.store.lock().await;
            let report = transfer::import_into(&mut store, raw)?;
            if report.imported > 0 {
                self.persistence.save(store.all());
            }
            report
        };

        info!(
            "Imported {} quotes ({} skipped)",
            report.imported, report.skipped
        );
        if report.imported > 0 {
            self.notify_changed();
        }
        Ok(report)
    }

    /// Serialize the whole collection for export
    pub async fn export_json(&self) -> Result<String, serde_json::Error> {
        transfer::export_quotes(self.store.lock().await.all())
    }

    /// Empty the collection and remove the saved copy
    ///
    /// Returns whether the saved copy is gone.
    pub async fn clear(&self) -> bool {
        let removed = {
            let mut store = self.store.lock().await;
            store.clear();
            self.persistence.clear()
        };

        info!("Cleared all quotes");
        self.notify_changed();
        removed
    }

    fn notify_changed(&self) {
        let _ = self.events.send(SyncEvent::DataChanged);
    }
}
