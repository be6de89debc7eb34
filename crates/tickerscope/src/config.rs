//! Compiler configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use ticker_alphavantage::{ClientOptions, DEFAULT_BASE_URL};
use ticker_core::{DataFrequency, OutputSize};

/// Everything a [`DatasetCompiler`](crate::DatasetCompiler) needs, passed at construction.
///
/// The `Debug` output never shows the API key.
#[derive(Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CompilerConfig {
    /// Alpha Vantage API key. Not needed when `fixture_dir` is set.
    #[serde(default)]
    pub api_key: String,

    /// Query endpoint.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request cap per sliding minute.
    #[serde(default = "default_requests_per_minute")]
    pub requests_per_minute: usize,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Merge the server-side BBANDS, STOCHRSI, STOCHF and APO series.
    #[serde(default = "default_true")]
    pub advanced_indicators: bool,

    /// Granularity of the main time series.
    #[serde(default)]
    pub frequency: DataFrequency,

    /// History depth of the main time series.
    #[serde(default)]
    pub output_size: OutputSize,

    /// Number of insider transactions kept in the summary.
    #[serde(default = "default_insider_limit")]
    pub insider_limit: usize,

    /// Fetch the fundamentals concurrently instead of one after another.
    #[serde(default)]
    pub parallel_fetch: bool,

    /// Serve responses from `*.json` files in this directory instead of the network.
    #[serde(default)]
    pub fixture_dir: Option<PathBuf>,
}

// ── Defaults ─────────────────────────────────────────────────────────────────

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_requests_per_minute() -> usize {
    75
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_true() -> bool {
    true
}
fn default_insider_limit() -> usize {
    ticker_analytics::DEFAULT_RECENT_LIMIT
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            requests_per_minute: default_requests_per_minute(),
            timeout_secs: default_timeout_secs(),
            advanced_indicators: true,
            frequency: DataFrequency::default(),
            output_size: OutputSize::default(),
            insider_limit: default_insider_limit(),
            parallel_fetch: false,
            fixture_dir: None,
        }
    }
}

impl fmt::Debug for CompilerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let api_key = if self.api_key.is_empty() { "" } else { "[REDACTED]" };
        f.debug_struct("CompilerConfig")
            .field("api_key", &api_key)
            .field("base_url", &self.base_url)
            .field("requests_per_minute", &self.requests_per_minute)
            .field("timeout_secs", &self.timeout_secs)
            .field("advanced_indicators", &self.advanced_indicators)
            .field("frequency", &self.frequency)
            .field("output_size", &self.output_size)
            .field("insider_limit", &self.insider_limit)
            .field("parallel_fetch", &self.parallel_fetch)
            .field("fixture_dir", &self.fixture_dir)
            .finish()
    }
}

impl CompilerConfig {
    /// Creates a configuration with defaults and the given API key.
    #[must_use]
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Fetch options for the client.
    #[must_use]
    pub const fn client_options(&self) -> ClientOptions {
        ClientOptions {
            frequency: self.frequency,
            output_size: self.output_size,
            advanced_indicators: self.advanced_indicators,
        }
    }
}
