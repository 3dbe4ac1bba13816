//! Storage layer
//!
//! Handles quote persistence on top of simple key-value slots.
//!
//! ## Architecture
//!
//! - **Durable slots**: one file per key in the data directory
//! - **Session slots**: in-memory, gone when the process exits
//!
//! Storage failures are logged and degrade to in-memory operation; they
//! never take the process down.

pub mod error;
pub mod persistence;
pub mod slots;

pub use error::{StorageError, StorageResult};
pub use persistence::{
    decode_quotes, encode_quotes, DecodedQuotes, QuotePersistence, LAST_SHOWN_INDEX_SLOT,
    QUOTES_SLOT, SELECTED_CATEGORY_SLOT,
};
pub use slots::{FileSlots, MemorySlots, SlotStore};
