//! Sync command handlers

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::broadcast::error::RecvError;

use quotebook_core::sync::{RemoteClient, SyncEngine, SyncEvent, SyncOutcome, SyncScheduler};
use quotebook_core::{Quote, QuoteBook};

use crate::output::Output;

fn engine(book: &QuoteBook) -> Result<Arc<SyncEngine>> {
    let client =
        RemoteClient::from_config(book.config()).context("Failed to create HTTP client")?;
    Ok(book.sync_engine(Arc::new(client)))
}

/// Run one merge cycle against the remote
pub async fn sync(book: &QuoteBook, output: &Output) -> Result<()> {
    output.message(&format!(
        "Fetching quotes from {}...",
        book.config().effective_remote_url()
    ));

    match engine(book)?.run_cycle().await {
        SyncOutcome::Completed(report) => {
            if report.remote == 0 {
                output.warn("No quotes received from the server; local quotes kept");
            }
            output.print_sync_report(&report);
        }
        SyncOutcome::Skipped => output.message("A sync is already running."),
    }

    Ok(())
}

/// Forward a newly added quote to the remote
pub async fn push(book: &QuoteBook, quote: &Quote, output: &Output) {
    match engine(book) {
        Ok(engine) => {
            engine.push(quote).await;
            output.message("Quote sent to server.");
        }
        Err(e) => output.warn(&format!("Could not send quote to server: {:#}", e)),
    }
}

/// The quote on screen after the collection changed
///
/// Keeps the last shown quote while it still exists, otherwise picks
/// a new one.
async fn displayed_quote(book: &QuoteBook) -> Option<Quote> {
    match book.last_shown().await {
        Some(quote) => Some(quote),
        None => book.show_quote(None).await,
    }
}

/// Sync periodically and render notifications until Ctrl-C
pub async fn watch(book: &QuoteBook, interval: Option<u64>, output: &Output) -> Result<()> {
    let interval = interval
        .map(|secs| Duration::from_secs(secs.max(1)))
        .unwrap_or_else(|| book.config().sync_interval());

    let mut events = book.subscribe();
    let scheduler = SyncScheduler::start(engine(book)?, interval);
    scheduler.sync_now();

    output.message(&format!(
        "Syncing every {}s. Press Ctrl-C to stop.",
        interval.as_secs()
    ));
    if !output.is_json() {
        if let Some(quote) = book.show_quote(None).await {
            output.print_quote(&quote);
        }
    }

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = events.recv() => match event {
                Ok(SyncEvent::Synced(report)) => output.print_sync_report(&report),
                Ok(SyncEvent::DataChanged) => {
                    // JSON consumers get the reports only
                    if !output.is_json() {
                        if let Some(quote) = displayed_quote(book).await {
                            output.print_quote(&quote);
                        }
                    }
                }
                Err(RecvError::Lagged(missed)) => {
                    tracing::debug!("Missed {} sync notifications", missed);
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    scheduler.stop().await;
    output.message("Stopped.");
    Ok(())
}
