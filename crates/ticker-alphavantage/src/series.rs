//! Time series fetching and parsing.

use serde_json::{Map, Value};
use ticker_analytics::add_technical_indicators;
use ticker_core::{
    ApiFunction, ApiQuery, DataError, DataFrequency, OhlcvBar, OutputSize, PriceSeries, Result,
    Symbol,
};
use tracing::{debug, warn};

use crate::{
    client::AlphaVantageClient,
    indicators::{ExternalIndicator, parse_timestamp, value_number},
};

impl AlphaVantageClient {
    /// Fetches the main time series with the client's frequency and output size,
    /// adds the computed indicators and, if enabled, merges the server-side ones.
    ///
    /// # Errors
    /// Returns the transport error, or [`DataError::Shape`] if the body has no
    /// time series table or no parseable row.
    pub async fn fetch_time_series(&self, symbol: &Symbol) -> Result<PriceSeries> {
        let options = *self.options();
        let mut series = self
            .fetch_time_series_with(symbol, options.frequency, options.output_size)
            .await?;

        if options.advanced_indicators {
            self.enhance_technical_indicators(symbol, options.frequency, &mut series)
                .await;
        }
        Ok(series)
    }

    /// Fetches a time series with explicit granularity and depth and adds the
    /// computed indicators. Server-side indicators are not merged.
    ///
    /// # Errors
    /// See [`fetch_time_series`](Self::fetch_time_series).
    pub async fn fetch_time_series_with(
        &self,
        symbol: &Symbol,
        frequency: DataFrequency,
        output_size: OutputSize,
    ) -> Result<PriceSeries> {
        let mut query = ApiQuery::new(ApiFunction::TimeSeries(frequency), symbol.clone())
            .param("outputsize", output_size.as_str());
        if let Some(interval) = frequency.interval() {
            query = query.param("interval", interval);
        }

        let body = self.get(query).await?;
        let mut series = parse_time_series(&body)?;
        add_technical_indicators(&mut series)?;

        debug!(%symbol, rows = series.len(), "Fetched time series");
        Ok(series)
    }

    /// Left-joins the four server-side indicator series onto `series`.
    ///
    /// The indicators are requested on the same `frequency` as the bars so their
    /// timestamps line up. Failures are logged and skipped. Returns how many
    /// indicators were merged.
    pub async fn enhance_technical_indicators(
        &self,
        symbol: &Symbol,
        frequency: DataFrequency,
        series: &mut PriceSeries,
    ) -> usize {
        let mut merged = 0;
        for indicator in ExternalIndicator::ALL {
            match self.fetch_indicator(symbol, indicator, frequency).await {
                Ok(table) => {
                    series.join_left(&table);
                    merged += 1;
                }
                Err(e) => {
                    warn!(%symbol, function = %indicator.function(), error = %e, "Skipping indicator");
                }
            }
        }
        merged
    }
}

/// Parses a `TIME_SERIES_*` body.
///
/// The table is the first key containing `Time Series`. Value labels lose their
/// `N. ` prefix and map to open/high/low/close/volume; other labels are ignored.
/// Rows with an unparseable timestamp or value are dropped. Intraday bars keep
/// their full timestamp; daily and longer bars sit at midnight.
///
/// # Errors
/// Returns [`DataError::Shape`] if there is no table or no row survives parsing.
pub fn parse_time_series(body: &Value) -> Result<PriceSeries> {
    let table = body
        .as_object()
        .and_then(|root| {
            root.iter()
                .find(|(key, _)| key.contains("Time Series"))
                .and_then(|(_, table)| table.as_object())
        })
        .ok_or_else(|| DataError::Shape("no Time Series table".to_string()))?;

    let bars: Vec<OhlcvBar> = table
        .iter()
        .filter_map(|(stamp, row)| parse_bar(stamp, row.as_object()?))
        .collect();

    if bars.is_empty() {
        return Err(DataError::Shape("time series has no parseable rows".to_string()));
    }
    if bars.len() < table.len() {
        debug!(dropped = table.len() - bars.len(), "Dropped unparseable time series rows");
    }

    Ok(PriceSeries::new(bars))
}

fn parse_bar(stamp: &str, row: &Map<String, Value>) -> Option<OhlcvBar> {
    let timestamp = parse_timestamp(stamp)?;
    let (mut open, mut high, mut low, mut close, mut volume) = (None, None, None, None, None);

    for (label, value) in row {
        match strip_ordinal(label) {
            "open" => open = value_number(value),
            "high" => high = value_number(value),
            "low" => low = value_number(value),
            "close" => close = value_number(value),
            "volume" => volume = value_number(value),
            _ => {}
        }
    }

    let volume = volume.filter(|v| *v >= 0.0)?.round() as u64;
    Some(OhlcvBar::at(timestamp, open?, high?, low?, close?, volume))
}

/// `"1. open"` -> `"open"`.
fn strip_ordinal(label: &str) -> &str {
    match label.split_once(". ") {
        Some((prefix, rest)) if prefix.chars().all(|c| c.is_ascii_digit()) => rest,
        _ => label,
    }
}
