//! Periodic sync scheduler
//!
//! Runs a merge cycle on a fixed interval in a background task until
//! stopped. Missed ticks are skipped rather than bunched up.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};

use super::engine::SyncEngine;

/// Commands sent to the scheduler task
#[derive(Debug)]
pub enum SyncCommand {
    /// Run a cycle now without waiting for the next tick
    SyncNow,
    /// Stop the scheduler
    Shutdown,
}

/// Handle for the background sync task
pub struct SyncScheduler {
    command_tx: mpsc::Sender<SyncCommand>,
    task: JoinHandle<()>,
}

impl SyncScheduler {
    /// Spawn the scheduler; the first cycle runs one interval from now
    pub fn start(engine: Arc<SyncEngine>, interval: Duration) -> Self {
        let (command_tx, command_rx) = mpsc::channel(16);
        let task = tokio::spawn(scheduler_task(engine, interval, command_rx));
        info!("Sync scheduler started, interval={:?}", interval);

        Self { command_tx, task }
    }

    /// Ask for an immediate cycle
    pub fn sync_now(&self) {
        let _ = self.command_tx.try_send(SyncCommand::SyncNow);
    }

    /// Stop the scheduler and wait for any running cycle to finish
    pub async fn stop(self) {
        let _ = self.command_tx.send(SyncCommand::Shutdown).await;
        let _ = self.task.await;
        info!("Sync scheduler stopped");
    }
}

async fn scheduler_task(
    engine: Arc<SyncEngine>,
    interval: Duration,
    mut command_rx: mpsc::Receiver<SyncCommand>,
) {
    let mut ticker = time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                debug!("Sync tick");
                engine.run_cycle().await;
            }
            cmd = command_rx.recv() => {
                match cmd {
                    Some(SyncCommand::SyncNow) => {
                        engine.run_cycle().await;
                    }
                    // Handle dropped or shutdown requested
                    Some(SyncCommand::Shutdown) | None => break,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Quote;
    use crate::storage::{MemorySlots, QuotePersistence};
    use crate::store::QuoteStore;
    use crate::sync::{RemoteSource, SyncEvent};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::broadcast;

    #[derive(Default)]
    struct CountingRemote {
        fetches: AtomicUsize,
    }

    #[async_trait]
    impl RemoteSource for CountingRemote {
        async fn fetch_quotes(&self) -> Vec<Quote> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            vec![Quote::new("from server", "Server").unwrap()]
        }

        async fn push_quote(&self, _quote: &Quote) {}
    }

    fn engine(remote: Arc<CountingRemote>) -> Arc<SyncEngine> {
        let persistence = QuotePersistence::with_slots(
            Arc::new(MemorySlots::new()),
            Arc::new(MemorySlots::new()),
        );
        let (events, _) = broadcast::channel(64);
        Arc::new(SyncEngine::new(
            QuoteStore::default().into_shared(),
            persistence,
            remote,
            events,
        ))
    }

    async fn next_synced(rx: &mut broadcast::Receiver<SyncEvent>) {
        loop {
            if let SyncEvent::Synced(_) = rx.recv().await.unwrap() {
                return;
            }
        }
    }

    #[tokio::test]
    async fn test_scheduler_runs_periodically() {
        let remote = Arc::new(CountingRemote::default());
        let engine = engine(remote.clone());
        let mut rx = engine.subscribe();

        let scheduler = SyncScheduler::start(engine, Duration::from_millis(20));

        for _ in 0..3 {
            time::timeout(Duration::from_secs(5), next_synced(&mut rx))
                .await
                .unwrap();
        }

        scheduler.stop().await;
        assert!(remote.fetches.load(Ordering::SeqCst) >= 3);
    }

    #[tokio::test]
    async fn test_sync_now_runs_before_first_tick() {
        let remote = Arc::new(CountingRemote::default());
        let engine = engine(remote.clone());
        let mut rx = engine.subscribe();

        let scheduler = SyncScheduler::start(engine, Duration::from_secs(3600));
        scheduler.sync_now();

        time::timeout(Duration::from_secs(5), next_synced(&mut rx))
            .await
            .unwrap();
        assert_eq!(remote.fetches.load(Ordering::SeqCst), 1);

        scheduler.stop().await;
    }

    #[tokio::test]
    async fn test_stop_ends_task() {
        let remote = Arc::new(CountingRemote::default());
        let scheduler = SyncScheduler::start(engine(remote.clone()), Duration::from_secs(3600));

        time::timeout(Duration::from_secs(5), scheduler.stop())
            .await
            .unwrap();
        assert_eq!(remote.fetches.load(Ordering::SeqCst), 0);
    }
}
