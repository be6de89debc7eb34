//! HTTP transport to the Alpha Vantage query endpoint.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::{fmt, sync::Arc, time::Duration};
use ticker_core::{AdvisoryKind, ApiQuery, DataError, Result, Transport};
use tracing::{debug, warn};

use crate::rate_limit::SlidingWindowLimiter;

/// Default query endpoint.
pub const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co/query";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Substring that marks an `Information` body as a rate-limit refusal.
const RATE_LIMIT_MARKER: &str = "API call frequency";

/// Rate-limited HTTP transport.
///
/// Every request first waits on the shared [`SlidingWindowLimiter`], then
/// issues a GET with `function`, `symbol`, the extra parameters and `apikey`.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
    api_key: String,
    limiter: Arc<SlidingWindowLimiter>,
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("limiter", &self.limiter)
            .finish()
    }
}

impl HttpTransport {
    /// Creates a transport with its own HTTP client.
    ///
    /// # Errors
    /// Returns [`DataError::Transport`] if the HTTP client cannot be built.
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
        limiter: Arc<SlidingWindowLimiter>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DataError::Transport(e.to_string()))?;
        Ok(Self::with_client(client, api_key, base_url, limiter))
    }

    /// Creates a transport with a custom HTTP client.
    #[must_use]
    pub fn with_client(
        client: Client,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        limiter: Arc<SlidingWindowLimiter>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            limiter,
        }
    }

    /// The limiter shared by every request of this transport.
    #[must_use]
    pub fn limiter(&self) -> &Arc<SlidingWindowLimiter> {
        &self.limiter
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(&self, query: &ApiQuery) -> Result<Value> {
        self.limiter.acquire().await;
        debug!(function = %query.function, symbol = query.symbol_str(), "Alpha Vantage request");

        let response = self
            .client
            .get(&self.base_url)
            .query(&query.pairs())
            .query(&[("apikey", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| DataError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(DataError::Transport(format!("HTTP {status}: {text}")));
        }

        let text = response
            .text()
            .await
            .map_err(|e| DataError::Transport(e.without_url().to_string()))?;
        let body: Value = match serde_json::from_str(&text) {
            Ok(body) => body,
            // CSV functions still answer advisories in JSON.
            Err(_) if query.function.is_csv() => return Ok(Value::String(text)),
            Err(e) => return Err(DataError::Transport(format!("malformed body: {e}"))),
        };

        classify_response(body)
    }
}

/// Separates data bodies from advisory bodies.
///
/// The API answers soft failures with HTTP 200 and a single sentinel key:
/// `Information` (rate limit when it mentions the call frequency, otherwise a
/// plain notice), `Error Message`, or `Note` (rate limit).
///
/// # Errors
/// Returns [`DataError::UpstreamAdvisory`] for advisory bodies.
pub fn classify_response(body: Value) -> Result<Value> {
    let advisory = if let Some(message) = body.get("Information") {
        let message = message_text(message);
        let kind = if message.contains(RATE_LIMIT_MARKER) {
            AdvisoryKind::RateLimit
        } else {
            AdvisoryKind::Information
        };
        Some((kind, message))
    } else if let Some(message) = body.get("Error Message") {
        Some((AdvisoryKind::ErrorMessage, message_text(message)))
    } else {
        body.get("Note")
            .map(|message| (AdvisoryKind::RateLimit, message_text(message)))
    };

    match advisory {
        Some((kind, message)) => {
            warn!(%kind, %message, "Alpha Vantage advisory");
            Err(DataError::UpstreamAdvisory { kind, message })
        }
        None => Ok(body),
    }
}

fn message_text(value: &Value) -> String {
    value
        .as_str()
        .map_or_else(|| value.to_string(), ToString::to_string)
}
