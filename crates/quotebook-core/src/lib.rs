//! Quotebook Core Library
//!
//! This crate provides the core functionality for Quotebook, a local
//! quote collection with optional periodic sync against a remote endpoint.
//!
//! # Architecture
//!
//! - **Store**: In-memory ordered collection behind an async mutex
//! - **Storage**: Key-value slots (durable files and per-session memory)
//! - **Sync**: Periodic fetch and merge where the remote copy wins
//!
//! Every read-modify-write of the collection holds the store lock, so a
//! quote added while a merge runs is applied after it and never lost.
//!
//! # Quick Start
//!
//! ```text
//! let book = QuoteBook::open()?;
//!
//! // Add a quote
//! book.add_quote("Simplicity is the soul of efficiency.", "Wisdom").await?;
//!
//! // Show a random one
//! let quote = book.show_quote(None).await;
//! ```
//!
//! # Modules
//!
//! - `book`: Quote book facade (main entry point)
//! - `models`: Quote and category filter types
//! - `query`: Category listing, filtering and random selection
//! - `store`: In-memory collection
//! - `storage`: Slot persistence
//! - `sync`: Remote client, merge engine and scheduler
//! - `transfer`: JSON import and export
//! - `config`: Application configuration

pub mod book;
pub mod config;
pub mod models;
pub mod query;
pub mod storage;
pub mod store;
pub mod sync;
pub mod transfer;

pub use book::{Origin, QuoteBook};
pub use config::Config;
pub use models::{CategoryFilter, Quote, ValidationError};
pub use storage::{QuotePersistence, StorageError};
pub use store::{QuoteStore, SharedStore};
pub use transfer::{ImportError, ImportReport};
