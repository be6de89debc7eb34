//! Global quote and the supplementary quote/volume fetch.

use serde::Deserialize;
use serde_json::Value;
use ticker_analytics::{NormalizedOverview, SupplementaryData};
use ticker_core::{
    ApiFunction, DataError, DataFrequency, GlobalQuote, OutputSize, Result, Symbol, parse_number,
};
use tracing::{debug, warn};

use crate::{client::AlphaVantageClient, indicators::parse_date};

impl AlphaVantageClient {
    /// Fetches the latest quote.
    ///
    /// # Errors
    /// Returns [`DataError::Shape`] if `Global Quote` is missing or empty.
    pub async fn fetch_global_quote(&self, symbol: &Symbol) -> Result<GlobalQuote> {
        let body = self.get_function(ApiFunction::GlobalQuote, symbol).await?;
        let quote = parse_global_quote(&body)?;
        debug!(%symbol, price = ?quote.price, "Fetched global quote");
        Ok(quote)
    }

    /// Fetches supplementary figures on their own: the latest quote plus a
    /// compact daily series for the volume average.
    ///
    /// Overview-derived figures are filled from `overview` when given. A failed
    /// series request only leaves the volume average and relative volume at `N/A`.
    ///
    /// # Errors
    /// Returns the quote request's error.
    pub async fn fetch_supplementary_data(
        &self,
        symbol: &Symbol,
        overview: Option<&NormalizedOverview>,
    ) -> Result<SupplementaryData> {
        let quote = self.fetch_global_quote(symbol).await?;
        let series = match self
            .fetch_time_series_with(symbol, DataFrequency::Daily, OutputSize::Compact)
            .await
        {
            Ok(series) => Some(series),
            Err(e) => {
                warn!(%symbol, error = %e, "Volume average unavailable");
                None
            }
        };
        Ok(SupplementaryData::derive(overview, Some(&quote), series.as_ref()))
    }
}

/// Parses a `GLOBAL_QUOTE` body.
///
/// # Errors
/// Returns [`DataError::Shape`] if `Global Quote` is missing or empty.
pub fn parse_global_quote(body: &Value) -> Result<GlobalQuote> {
    let raw = body
        .get("Global Quote")
        .filter(|quote| quote.as_object().is_some_and(|object| !object.is_empty()))
        .ok_or_else(|| DataError::Shape("no Global Quote".to_string()))?;
    let raw: AvGlobalQuote = serde_json::from_value(raw.clone())
        .map_err(|e| DataError::Parse(format!("global quote: {e}")))?;

    let number = |value: &Option<String>| value.as_deref().and_then(parse_number);

    Ok(GlobalQuote {
        symbol: Symbol::new(raw.symbol.unwrap_or_default()),
        open: number(&raw.open),
        high: number(&raw.high),
        low: number(&raw.low),
        price: number(&raw.price),
        volume: number(&raw.volume)
            .filter(|v| *v >= 0.0)
            .map(|v| v.round() as u64),
        latest_trading_day: raw.latest_trading_day.as_deref().and_then(parse_date),
        previous_close: number(&raw.previous_close),
        change: number(&raw.change),
        change_percent: raw.change_percent.filter(|s| !s.trim().is_empty()),
    })
}

// ============================================================================
// Alpha Vantage API Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct AvGlobalQuote {
    #[serde(default, rename = "01. symbol")]
    symbol: Option<String>,
    #[serde(default, rename = "02. open")]
    open: Option<String>,
    #[serde(default, rename = "03. high")]
    high: Option<String>,
    #[serde(default, rename = "04. low")]
    low: Option<String>,
    #[serde(default, rename = "05. price")]
    price: Option<String>,
    #[serde(default, rename = "06. volume")]
    volume: Option<String>,
    #[serde(default, rename = "07. latest trading day")]
    latest_trading_day: Option<String>,
    #[serde(default, rename = "08. previous close")]
    previous_close: Option<String>,
    #[serde(default, rename = "09. change")]
    change: Option<String>,
    #[serde(default, rename = "10. change percent")]
    change_percent: Option<String>,
}
