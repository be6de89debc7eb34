//! SQLite-backed watchlist.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::sync::Mutex;
use ticker_core::{DataError, Result, Symbol, WatchlistEntry, WatchlistStore};
use tracing::{debug, instrument};

/// Watchlist stored in a SQLite database file.
///
/// Symbols are unique; adding one twice returns the stored entry.
#[derive(Debug)]
pub struct SqliteWatchlist {
    conn: Mutex<Connection>,
}

impl SqliteWatchlist {
    /// Opens (or creates) a watchlist database at the given path.
    ///
    /// # Errors
    /// Returns [`DataError::Storage`] if the database cannot be opened or the
    /// schema cannot be created.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path).map_err(storage)?;
        let watchlist = Self {
            conn: Mutex::new(conn),
        };
        watchlist.initialize_schema()?;
        Ok(watchlist)
    }

    /// Creates a watchlist in an in-memory database.
    ///
    /// # Errors
    /// Returns [`DataError::Storage`] if schema creation fails.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(storage)?;
        let watchlist = Self {
            conn: Mutex::new(conn),
        };
        watchlist.initialize_schema()?;
        Ok(watchlist)
    }

    fn initialize_schema(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS watchlist (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                symbol TEXT NOT NULL UNIQUE,
                date_added TEXT NOT NULL,
                notes TEXT
            )",
            [],
        )
        .map_err(storage)?;

        debug!("SQLite watchlist schema initialized");
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| DataError::Storage(e.to_string()))
    }

    fn find_by_symbol(conn: &Connection, symbol: &Symbol) -> Result<Option<WatchlistEntry>> {
        conn.query_row(
            "SELECT id, symbol, date_added, notes FROM watchlist WHERE symbol = ?1",
            params![symbol.as_str()],
            row_to_raw,
        )
        .optional()
        .map_err(storage)?
        .map(into_entry)
        .transpose()
    }
}

type RawEntry = (i64, String, String, Option<String>);

fn into_entry((id, symbol, date_added, notes): RawEntry) -> Result<WatchlistEntry> {
    let date_added = DateTime::parse_from_rfc3339(&date_added)
        .map_err(|e| DataError::Parse(format!("Invalid date_added {date_added}: {e}")))?
        .with_timezone(&Utc);
    Ok(WatchlistEntry {
        id,
        symbol: Symbol::new(symbol),
        date_added,
        notes,
    })
}

fn row_to_raw(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawEntry> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn storage(e: rusqlite::Error) -> DataError {
    DataError::Storage(e.to_string())
}

#[async_trait]
impl WatchlistStore for SqliteWatchlist {
    #[instrument(skip(self), fields(symbol = %symbol))]
    async fn add(&self, symbol: &Symbol, notes: Option<&str>) -> Result<WatchlistEntry> {
        let conn = self.lock()?;
        if let Some(existing) = Self::find_by_symbol(&conn, symbol)? {
            debug!(id = existing.id, "Symbol already watched");
            return Ok(existing);
        }

        let date_added = Utc::now();
        conn.execute(
            "INSERT INTO watchlist (symbol, date_added, notes) VALUES (?1, ?2, ?3)",
            params![symbol.as_str(), date_added.to_rfc3339(), notes],
        )
        .map_err(storage)?;

        let entry = WatchlistEntry {
            id: conn.last_insert_rowid(),
            symbol: symbol.clone(),
            date_added,
            notes: notes.map(ToString::to_string),
        };
        debug!(id = entry.id, "Added to watchlist");
        Ok(entry)
    }

    #[instrument(skip(self))]
    async fn remove(&self, id: i64) -> Result<bool> {
        let conn = self.lock()?;
        let removed = conn
            .execute("DELETE FROM watchlist WHERE id = ?1", params![id])
            .map_err(storage)?;
        Ok(removed > 0)
    }

    async fn list(&self) -> Result<Vec<WatchlistEntry>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT id, symbol, date_added, notes FROM watchlist ORDER BY id ASC")
            .map_err(storage)?;

        let rows = stmt
            .query_map([], row_to_raw)
            .map_err(storage)?
            .collect::<rusqlite::Result<Vec<RawEntry>>>()
            .map_err(storage)?;

        rows.into_iter().map(into_entry).collect()
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<usize> {
        let conn = self.lock()?;
        let removed = conn.execute("DELETE FROM watchlist", []).map_err(storage)?;
        debug!(removed, "Cleared watchlist");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sqlite_watchlist_initialization() {
        let watchlist = SqliteWatchlist::in_memory();
        assert!(watchlist.is_ok());
    }

    #[tokio::test]
    async fn test_add_list_remove() {
        let watchlist = SqliteWatchlist::in_memory().unwrap();

        let ibm = watchlist
            .add(&Symbol::new("IBM"), Some("dividend"))
            .await
            .unwrap();
        let msft = watchlist.add(&Symbol::new("MSFT"), None).await.unwrap();
        assert!(msft.id > ibm.id);

        let duplicate = watchlist.add(&Symbol::new("ibm"), None).await.unwrap();
        assert_eq!(duplicate.id, ibm.id);
        assert_eq!(duplicate.notes.as_deref(), Some("dividend"));

        let entries = watchlist.list().await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].symbol, Symbol::new("IBM"));
        assert_eq!(entries[0].date_added.timestamp(), ibm.date_added.timestamp());

        assert!(watchlist.remove(ibm.id).await.unwrap());
        assert!(!watchlist.remove(ibm.id).await.unwrap());
        assert_eq!(watchlist.symbols().await.unwrap(), vec![Symbol::new("MSFT")]);
    }

    #[tokio::test]
    async fn test_clear() {
        let watchlist = SqliteWatchlist::in_memory().unwrap();
        watchlist.add(&Symbol::new("IBM"), None).await.unwrap();
        watchlist.add(&Symbol::new("AAPL"), None).await.unwrap();

        assert_eq!(watchlist.clear().await.unwrap(), 2);
        assert!(watchlist.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_persists_to_file() {
        let path = std::env::temp_dir().join(format!("tickerscope-watchlist-{}.db", std::process::id()));
        {
            let watchlist = SqliteWatchlist::new(&path).unwrap();
            watchlist.add(&Symbol::new("IBM"), None).await.unwrap();
        }
        let reopened = SqliteWatchlist::new(&path).unwrap();
        assert_eq!(reopened.symbols().await.unwrap(), vec![Symbol::new("IBM")]);
        drop(reopened);
        std::fs::remove_file(&path).unwrap();
    }
}
