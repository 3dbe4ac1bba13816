//! Remote sync
//!
//! Pulls quotes from a remote endpoint, merges them into the local store
//! (remote wins on exact text match), and saves the result.
//!
//! ## Usage
//!
//! ```ignore
//! let remote = Arc::new(RemoteClient::from_config(book.config())?);
//! let engine = book.sync_engine(remote);
//! let scheduler = SyncScheduler::start(engine, book.config().sync_interval());
//! // ...
//! scheduler.stop().await;
//! ```

mod client;
mod engine;
mod scheduler;

pub use client::{
    parse_remote_quotes, RemoteClient, RemoteSource, TransportError, REMOTE_BATCH_LIMIT,
};
pub use engine::{merge, SyncEngine, SyncEvent, SyncOutcome, SyncReport};
pub use scheduler::{SyncCommand, SyncScheduler};
