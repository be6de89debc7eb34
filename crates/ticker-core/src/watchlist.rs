//! Watchlist trait for the saved list of symbols.
//!
//! This module defines the [`WatchlistStore`] trait. The dataset compiler only
//! reads from a store; writes come from the CLI or another front end.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{error::Result, types::Symbol};

/// A saved symbol.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WatchlistEntry {
    /// Store-assigned identifier.
    pub id: i64,
    /// The watched symbol.
    pub symbol: Symbol,
    /// When the symbol was added.
    pub date_added: DateTime<Utc>,
    /// Free-text note.
    pub notes: Option<String>,
}

/// Keyed list of watched symbols.
///
/// Implementations can store entries in various backends (SQLite, in-memory).
#[async_trait]
pub trait WatchlistStore: Send + Sync {
    /// Adds a symbol and returns the stored entry.
    ///
    /// Adding a symbol that is already present returns the existing entry.
    async fn add(&self, symbol: &Symbol, notes: Option<&str>) -> Result<WatchlistEntry>;

    /// Removes an entry by id. Returns `false` if no such entry exists.
    async fn remove(&self, id: i64) -> Result<bool>;

    /// Lists all entries in insertion order.
    async fn list(&self) -> Result<Vec<WatchlistEntry>>;

    /// Removes every entry and returns how many were removed.
    async fn clear(&self) -> Result<usize>;

    /// Lists the watched symbols in insertion order.
    async fn symbols(&self) -> Result<Vec<Symbol>> {
        Ok(self.list().await?.into_iter().map(|e| e.symbol).collect())
    }
}
