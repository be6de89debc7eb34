//! In-memory watchlist.

use async_trait::async_trait;
use chrono::Utc;
use ticker_core::{Result, Symbol, WatchlistEntry, WatchlistStore};
use tokio::sync::RwLock;
use tracing::{debug, instrument};

#[derive(Debug, Default)]
struct Entries {
    next_id: i64,
    entries: Vec<WatchlistEntry>,
}

/// Watchlist kept in memory and lost when dropped.
#[derive(Debug, Default)]
pub struct InMemoryWatchlist {
    inner: RwLock<Entries>,
}

impl InMemoryWatchlist {
    /// Creates an empty watchlist.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WatchlistStore for InMemoryWatchlist {
    #[instrument(skip(self), fields(symbol = %symbol))]
    async fn add(&self, symbol: &Symbol, notes: Option<&str>) -> Result<WatchlistEntry> {
        let mut inner = self.inner.write().await;
        if let Some(existing) = inner.entries.iter().find(|e| &e.symbol == symbol) {
            debug!("Symbol already watched");
            return Ok(existing.clone());
        }

        inner.next_id += 1;
        let entry = WatchlistEntry {
            id: inner.next_id,
            symbol: symbol.clone(),
            date_added: Utc::now(),
            notes: notes.map(ToString::to_string),
        };
        inner.entries.push(entry.clone());
        debug!(id = entry.id, "Added to watchlist");
        Ok(entry)
    }

    async fn remove(&self, id: i64) -> Result<bool> {
        let mut inner = self.inner.write().await;
        let before = inner.entries.len();
        inner.entries.retain(|e| e.id != id);
        Ok(inner.entries.len() < before)
    }

    async fn list(&self) -> Result<Vec<WatchlistEntry>> {
        Ok(self.inner.read().await.entries.clone())
    }

    async fn clear(&self) -> Result<usize> {
        let mut inner = self.inner.write().await;
        let removed = inner.entries.len();
        inner.entries.clear();
        debug!(removed, "Cleared watchlist");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_add_is_idempotent() {
        let watchlist = InMemoryWatchlist::new();
        let first = watchlist.add(&Symbol::new("ibm"), Some("core")).await.unwrap();
        let again = watchlist.add(&Symbol::new("IBM"), None).await.unwrap();

        assert_eq!(first, again);
        assert_eq!(watchlist.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_remove_and_clear() {
        let watchlist = InMemoryWatchlist::new();
        let ibm = watchlist.add(&Symbol::new("IBM"), None).await.unwrap();
        watchlist.add(&Symbol::new("MSFT"), None).await.unwrap();
        watchlist.add(&Symbol::new("AAPL"), None).await.unwrap();

        assert!(watchlist.remove(ibm.id).await.unwrap());
        assert!(!watchlist.remove(ibm.id).await.unwrap());
        assert_eq!(
            watchlist.symbols().await.unwrap(),
            vec![Symbol::new("MSFT"), Symbol::new("AAPL")]
        );

        assert_eq!(watchlist.clear().await.unwrap(), 2);
        assert!(watchlist.list().await.unwrap().is_empty());
    }
}
