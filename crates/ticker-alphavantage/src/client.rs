//! Alpha Vantage client: one typed fetcher per resource.
//!
//! The fetchers themselves live next to their response types in
//! [`series`](crate::series), [`fundamentals`](crate::fundamentals),
//! [`indicators`](crate::indicators), [`quote`](crate::quote) and
//! [`insider`](crate::insider).

use serde_json::Value;
use std::sync::Arc;
use ticker_core::{
    ApiFunction, ApiQuery, DataFrequency, DataProvider, OutputSize, Result, Symbol, Transport,
};

use crate::{
    http::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT, HttpTransport},
    rate_limit::SlidingWindowLimiter,
};

/// Time series granularities served by Alpha Vantage.
const SUPPORTED_FREQUENCIES: &[DataFrequency] = &[
    DataFrequency::Minute,
    DataFrequency::FiveMinute,
    DataFrequency::FifteenMinute,
    DataFrequency::ThirtyMinute,
    DataFrequency::Hourly,
    DataFrequency::Daily,
    DataFrequency::DailyAdjusted,
    DataFrequency::Weekly,
    DataFrequency::Monthly,
];

/// Fetch behaviour shared by every request of a client.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClientOptions {
    /// Granularity of the main time series.
    pub frequency: DataFrequency,
    /// History depth of the main time series.
    pub output_size: OutputSize,
    /// Whether to merge the BBANDS, STOCHRSI, STOCHF and APO series into the time series.
    pub advanced_indicators: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            frequency: DataFrequency::Daily,
            output_size: OutputSize::Full,
            advanced_indicators: true,
        }
    }
}

/// Alpha Vantage client.
///
/// All requests go through one [`Transport`]; with [`HttpTransport`] they
/// share its rate limiter.
#[derive(Clone, Debug)]
pub struct AlphaVantageClient {
    transport: Arc<dyn Transport>,
    options: ClientOptions,
}

impl AlphaVantageClient {
    /// Creates a client over the live API with the default limit of 75
    /// requests per minute.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let limiter = Arc::new(SlidingWindowLimiter::per_minute(75));
        let transport = HttpTransport::new(api_key, DEFAULT_BASE_URL, DEFAULT_TIMEOUT, limiter)?;
        Ok(Self::with_transport(Arc::new(transport), ClientOptions::default()))
    }

    /// Creates a client over any transport.
    #[must_use]
    pub fn with_transport(transport: Arc<dyn Transport>, options: ClientOptions) -> Self {
        Self { transport, options }
    }

    /// The fetch options.
    #[must_use]
    pub const fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// The underlying transport.
    #[must_use]
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    pub(crate) async fn get(&self, query: ApiQuery) -> Result<Value> {
        self.transport.request(&query).await
    }

    pub(crate) async fn get_function(&self, function: ApiFunction, symbol: &Symbol) -> Result<Value> {
        self.get(ApiQuery::new(function, symbol.clone())).await
    }
}

impl DataProvider for AlphaVantageClient {
    fn name(&self) -> &str {
        "Alpha Vantage"
    }

    fn description(&self) -> &str {
        "Alpha Vantage market data API: prices, fundamentals, insider activity and technical indicators"
    }

    fn supported_frequencies(&self) -> &[DataFrequency] {
        SUPPORTED_FREQUENCIES
    }
}
