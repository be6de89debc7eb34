#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// In-memory watchlist.
pub mod memory;

/// SQLite-backed watchlist.
#[cfg(feature = "sqlite")]
pub mod sqlite;

// Re-export the trait for convenience
pub use ticker_core::{WatchlistEntry, WatchlistStore};

pub use memory::InMemoryWatchlist;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteWatchlist;
