//! Sync engine
//!
//! One merge cycle:
//! 1. Fetch remote quotes (empty on failure)
//! 2. Lock the store and read the local collection
//! 3. Merge: remote first, then every local quote whose text is not in
//!    the remote batch
//! 4. Replace the store contents and save them
//! 5. Notify subscribers
//!
//! Steps 2-4 run under the store lock, so a quote added during a cycle
//! lands on the merged collection. Only one cycle runs at a time; a cycle
//! requested while another is in flight is skipped.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, info};

use super::client::RemoteSource;
use crate::models::Quote;
use crate::storage::QuotePersistence;
use crate::store::SharedStore;

/// Notifications for whoever renders the collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// A merge cycle finished
    Synced(SyncReport),
    /// The collection changed (sync, add, import, or clear)
    DataChanged,
}

/// Summary of one merge cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Quotes received from the remote
    pub remote: usize,
    /// Local quotes kept alongside the remote ones
    pub local_kept: usize,
    /// Local quotes replaced by a remote quote with the same text
    pub local_dropped: usize,
    /// Size of the merged collection
    pub total: usize,
    /// Whether the merged collection reached durable storage
    pub persisted: bool,
    /// When the cycle finished
    pub synced_at: DateTime<Utc>,
}

/// Result of asking for a cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Completed(SyncReport),
    /// Another cycle was already running
    Skipped,
}

/// Merge local and remote collections
///
/// Remote quotes come first and win on an exact text match; the local
/// duplicate is dropped. Other local quotes keep their order.
pub fn merge(local: &[Quote], remote: &[Quote]) -> Vec<Quote> {
    let remote_texts: HashSet<&str> = remote.iter().map(|q| q.text.as_str()).collect();

    remote
        .iter()
        .cloned()
        .chain(
            local
                .iter()
                .filter(|q| !remote_texts.contains(q.text.as_str()))
                .cloned(),
        )
        .collect()
}

/// Clears the in-flight flag when a cycle ends, including on panic
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Reconciles the local store with a remote source
///
/// Engines built with the same in-flight flag skip each other's cycles.
pub struct SyncEngine {
    store: SharedStore,
    persistence: QuotePersistence,
    remote: Arc<dyn RemoteSource>,
    events: broadcast::Sender<SyncEvent>,
    in_flight: Arc<AtomicBool>,
}

impl SyncEngine {
    pub fn new(
        store: SharedStore,
        persistence: QuotePersistence,
        remote: Arc<dyn RemoteSource>,
        events: broadcast::Sender<SyncEvent>,
    ) -> Self {
        Self::with_in_flight(
            store,
            persistence,
            remote,
            events,
            Arc::new(AtomicBool::new(false)),
        )
    }

    /// Build an engine that shares its in-flight flag with other engines
    pub fn with_in_flight(
        store: SharedStore,
        persistence: QuotePersistence,
        remote: Arc<dyn RemoteSource>,
        events: broadcast::Sender<SyncEvent>,
        in_flight: Arc<AtomicBool>,
    ) -> Self {
        Self {
            store,
            persistence,
            remote,
            events,
            in_flight,
        }
    }

    /// Subscribe to sync notifications
    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.events.subscribe()
    }

    /// Whether a cycle is running right now
    pub fn is_syncing(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Run one merge cycle
    pub async fn run_cycle(&self) -> SyncOutcome {
        if self.in_flight.swap(true, Ordering::AcqRel) {
            debug!("Sync already in progress, skipping");
            return SyncOutcome::Skipped;
        }
        let _in_flight = InFlight(self.in_flight.as_ref());

        let remote = self.remote.fetch_quotes().await;

        let report = {
            let mut store = self.store.lock().await;
            let local = store.all();
            let merged = merge(local, &remote);

            let local_kept = merged.len() - remote.len();
            let local_dropped = local.len() - local_kept;

            store.replace_all(merged);
            let persisted = self.persistence.save(store.all());

            SyncReport {
                remote: remote.len(),
                local_kept,
                local_dropped,
                total: store.len(),
                persisted,
                synced_at: Utc::now(),
            }
        };

        info!(
            "Sync complete: remote={} kept={} dropped={} total={}",
            report.remote, report.local_kept, report.local_dropped, report.total
        );

        // No subscribers is fine
        let _ = self.events.send(SyncEvent::Synced(report.clone()));
        let _ = self.events.send(SyncEvent::DataChanged);

        SyncOutcome::Completed(report)
    }

    /// Forward a newly added quote to the remote
    pub async fn push(&self, quote: &Quote) {
        self.remote.push_quote(quote).await;
    }
}
