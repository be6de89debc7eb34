//! Offline transport serving canned responses.

use async_trait::async_trait;
use serde_json::Value;
use std::{
    collections::HashMap,
    fs,
    path::Path,
    sync::Mutex,
};
use ticker_core::{ApiQuery, DataError, Result, Transport};
use tracing::debug;

use crate::http::classify_response;

#[derive(Clone, Debug)]
enum Fixture {
    Body(Value),
    Failure(String),
}

/// Transport that answers from canned JSON bodies instead of the network.
///
/// Responses are keyed by API function (`OVERVIEW`, `TIME_SERIES_DAILY`, ...),
/// optionally narrowed to one symbol with a `FUNCTION.SYMBOL` key. Symbol-specific
/// entries win; market-wide queries only match the plain function key. Bodies go through the same advisory classification as live
/// responses, so an advisory fixture fails the way a live one would. A query
/// with no matching fixture fails with [`DataError::Transport`].
#[derive(Debug, Default)]
pub struct FixtureTransport {
    fixtures: HashMap<String, Fixture>,
    log: Mutex<Vec<ApiQuery>>,
}

impl FixtureTransport {
    /// Creates a transport with no fixtures.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every `*.json` file in a directory; the file stem is the key.
    ///
    /// `*.csv` files are loaded as raw text, the way CSV functions answer live.
    ///
    /// # Errors
    /// Returns [`DataError::Other`] if the directory cannot be read and
    /// [`DataError::Parse`] if a file is not valid JSON.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let entries = fs::read_dir(dir)
            .map_err(|e| DataError::Other(format!("reading {}: {e}", dir.display())))?;

        let mut transport = Self::new();
        for entry in entries {
            let path = entry.map_err(|e| DataError::Other(e.to_string()))?.path();
            let extension = path.extension().and_then(|ext| ext.to_str());
            if !matches!(extension, Some("json" | "csv")) {
                continue;
            }
            let Some(key) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            let text = fs::read_to_string(&path)
                .map_err(|e| DataError::Other(format!("reading {}: {e}", path.display())))?;
            let body = if extension == Some("csv") {
                Value::String(text)
            } else {
                serde_json::from_str(&text)
                    .map_err(|e| DataError::Parse(format!("{}: {e}", path.display())))?
            };
            transport.fixtures.insert(key.to_string(), Fixture::Body(body));
        }

        debug!(dir = %dir.display(), fixtures = transport.fixtures.len(), "Loaded fixtures");
        Ok(transport)
    }

    /// Adds a body for a key (`OVERVIEW` or `OVERVIEW.IBM`).
    #[must_use]
    pub fn with_response(mut self, key: impl Into<String>, body: Value) -> Self {
        self.fixtures.insert(key.into(), Fixture::Body(body));
        self
    }

    /// Makes a key fail with a transport error.
    #[must_use]
    pub fn with_failure(mut self, key: impl Into<String>, message: impl Into<String>) -> Self {
        self.fixtures
            .insert(key.into(), Fixture::Failure(message.into()));
        self
    }

    /// Number of fixtures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fixtures.len()
    }

    /// Returns true if there are no fixtures.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fixtures.is_empty()
    }

    /// Every query received so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<ApiQuery> {
        self.log.lock().map(|log| log.clone()).unwrap_or_default()
    }

    fn lookup(&self, query: &ApiQuery) -> Option<&Fixture> {
        let function = query.function.as_str();
        query
            .symbol
            .as_ref()
            .and_then(|symbol| self.fixtures.get(&format!("{function}.{symbol}")))
            .or_else(|| self.fixtures.get(function))
    }
}

#[async_trait]
impl Transport for FixtureTransport {
    async fn request(&self, query: &ApiQuery) -> Result<Value> {
        if let Ok(mut log) = self.log.lock() {
            log.push(query.clone());
        }

        match self.lookup(query) {
            Some(Fixture::Body(body)) => classify_response(body.clone()),
            Some(Fixture::Failure(message)) => Err(DataError::Transport(message.clone())),
            None => Err(DataError::Transport(format!(
                "no fixture for {} {}",
                query.function,
                query.symbol_str()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use ticker_core::{AdvisoryKind, ApiFunction, Symbol};

    fn query(function: ApiFunction, symbol: &str) -> ApiQuery {
        ApiQuery::new(function, Symbol::new(symbol))
    }

    #[tokio::test]
    async fn test_symbol_specific_fixture_wins() {
        let transport = FixtureTransport::new()
            .with_response("OVERVIEW", json!({"Symbol": "ANY"}))
            .with_response("OVERVIEW.IBM", json!({"Symbol": "IBM"}));

        let ibm = transport.request(&query(ApiFunction::Overview, "ibm")).await.unwrap();
        assert_eq!(ibm["Symbol"], "IBM");
        let other = transport.request(&query(ApiFunction::Overview, "MSFT")).await.unwrap();
        assert_eq!(other["Symbol"], "ANY");
        assert_eq!(transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_market_query_matches_function_key() {
        let transport = FixtureTransport::new()
            .with_response("TOP_GAINERS_LOSERS", json!({"top_gainers": []}));

        let body = transport
            .request(&ApiQuery::market(ApiFunction::TopGainersLosers))
            .await
            .unwrap();
        assert!(body["top_gainers"].is_array());
        assert_eq!(transport.requests()[0].symbol, None);
    }

    #[tokio::test]
    async fn test_missing_and_failing_fixtures() {
        let transport = FixtureTransport::new()
            .with_failure("EARNINGS", "connection reset")
            .with_response("GLOBAL_QUOTE", json!({"Note": "API call frequency exceeded"}));

        let missing = transport.request(&query(ApiFunction::CashFlow, "IBM")).await;
        assert!(matches!(missing, Err(DataError::Transport(_))));

        let failing = transport.request(&query(ApiFunction::Earnings, "IBM")).await;
        assert!(matches!(failing, Err(DataError::Transport(m)) if m == "connection reset"));

        let advisory = transport.request(&query(ApiFunction::GlobalQuote, "IBM")).await;
        assert!(matches!(
            advisory,
            Err(DataError::UpstreamAdvisory { kind: AdvisoryKind::RateLimit, .. })
        ));
    }

    #[test]
    fn test_from_dir() {
        let dir = std::env::temp_dir().join(format!("tickerscope-fixtures-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("OVERVIEW.json"), r#"{"Symbol": "IBM"}"#).unwrap();
        fs::write(dir.join("EARNINGS_CALENDAR.csv"), "symbol,name\nIBM,IBM\n").unwrap();
        fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let transport = FixtureTransport::from_dir(&dir).unwrap();
        assert_eq!(transport.len(), 2);

        fs::remove_dir_all(&dir).unwrap();
        assert!(FixtureTransport::from_dir(&dir).is_err());
    }
}
