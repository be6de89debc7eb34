//! Market-wide movers and the earnings calendar.

use serde::Deserialize;
use serde_json::Value;
use ticker_analytics::format::{format_signed, format_signed_percent, format_volume};
use ticker_core::{
    ApiFunction, ApiQuery, DataError, DisplayValue, EarningsCalendarEntry, MarketMover,
    MarketMovers, Result, Symbol, parse_number,
};
use tracing::debug;

use crate::{client::AlphaVantageClient, indicators::parse_date};

impl AlphaVantageClient {
    /// Fetches today's top gainers, top losers and most actively traded tickers.
    ///
    /// # Errors
    /// Returns [`DataError::Shape`] if any of the three lists is missing.
    pub async fn fetch_market_movers(&self) -> Result<MarketMovers> {
        let body = self
            .get(ApiQuery::market(ApiFunction::TopGainersLosers))
            .await?;
        let movers = parse_market_movers(&body)?;
        debug!(
            gainers = movers.top_gainers.len(),
            losers = movers.top_losers.len(),
            active = movers.most_actively_traded.len(),
            "Fetched market movers"
        );
        Ok(movers)
    }

    /// Fetches upcoming earnings reports, market-wide or for one symbol.
    ///
    /// # Errors
    /// Returns [`DataError::Shape`] if the body is not CSV.
    pub async fn fetch_earnings_calendar(
        &self,
        symbol: Option<&Symbol>,
    ) -> Result<Vec<EarningsCalendarEntry>> {
        let query = match symbol {
            Some(symbol) => ApiQuery::new(ApiFunction::EarningsCalendar, symbol.clone()),
            None => ApiQuery::market(ApiFunction::EarningsCalendar),
        };
        let body = self.get(query).await?;
        let entries = parse_earnings_calendar(&body)?;
        debug!(symbol = ?symbol, count = entries.len(), "Fetched earnings calendar");
        Ok(entries)
    }
}

/// Parses a `TOP_GAINERS_LOSERS` body.
///
/// Each entry gets display fields: a signed change, a signed percent change and
/// a suffixed volume. A value that does not parse is shown as sent; a missing
/// one is `N/A`. Entries that do not deserialize are dropped.
///
/// # Errors
/// Returns [`DataError::Shape`] unless `top_gainers`, `top_losers` and
/// `most_actively_traded` are all lists.
pub fn parse_market_movers(body: &Value) -> Result<MarketMovers> {
    let list = |key: &str| -> Result<Vec<MarketMover>> {
        let items = body
            .get(key)
            .and_then(Value::as_array)
            .ok_or_else(|| DataError::Shape(format!("no {key} list")))?;
        let movers: Vec<MarketMover> = items
            .iter()
            .filter_map(|item| serde_json::from_value::<AvMarketMover>(item.clone()).ok())
            .map(market_mover)
            .collect();
        if movers.len() < items.len() {
            debug!(list = key, dropped = items.len() - movers.len(), "Dropped unparseable movers");
        }
        Ok(movers)
    };

    Ok(MarketMovers {
        last_updated: body
            .get("last_updated")
            .and_then(Value::as_str)
            .map(ToString::to_string),
        top_gainers: list("top_gainers")?,
        top_losers: list("top_losers")?,
        most_actively_traded: list("most_actively_traded")?,
    })
}

fn market_mover(raw: AvMarketMover) -> MarketMover {
    let change_amount = raw.change_amount.as_deref().and_then(parse_number);
    let change_percentage = raw
        .change_percentage
        .as_deref()
        .and_then(|pct| parse_number(pct.trim().trim_end_matches('%')));
    let volume = raw
        .volume
        .as_deref()
        .and_then(parse_number)
        .filter(|v| *v >= 0.0)
        .map(|v| v.round() as u64);

    MarketMover {
        ticker: Symbol::new(raw.ticker),
        price: raw.price.as_deref().and_then(parse_number),
        change_amount,
        change_percentage,
        volume,
        change_formatted: display(change_amount.map(format_signed), raw.change_amount),
        change_pct_formatted: display(
            change_percentage.map(format_signed_percent),
            raw.change_percentage,
        ),
        volume_formatted: display(volume.map(format_volume), raw.volume),
    }
}

/// The formatted value, else the raw text, else `N/A`.
fn display(formatted: Option<String>, raw: Option<String>) -> DisplayValue {
    formatted
        .or_else(|| raw.filter(|text| !text.trim().is_empty()))
        .into()
}

/// Parses an `EARNINGS_CALENDAR` CSV body.
///
/// Columns are matched by header name. Rows that do not deserialize are
/// dropped; an empty calendar is not an error.
///
/// # Errors
/// Returns [`DataError::Shape`] if the body is not CSV text.
pub fn parse_earnings_calendar(body: &Value) -> Result<Vec<EarningsCalendarEntry>> {
    let text = body
        .as_str()
        .ok_or_else(|| DataError::Shape("earnings calendar is not CSV".to_string()))?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut entries = Vec::new();
    let mut dropped = 0usize;
    for row in reader.deserialize::<AvCalendarRow>() {
        match row {
            Ok(row) if !row.symbol.is_empty() => entries.push(EarningsCalendarEntry {
                symbol: Symbol::new(row.symbol),
                name: row.name,
                report_date: row.report_date.as_deref().and_then(parse_date),
                fiscal_date_ending: row.fiscal_date_ending.as_deref().and_then(parse_date),
                estimate: row.estimate.as_deref().and_then(parse_number),
                currency: row.currency.filter(|c| !c.is_empty()),
            }),
            _ => dropped += 1,
        }
    }
    if dropped > 0 {
        debug!(dropped, "Dropped unparseable earnings calendar rows");
    }

    Ok(entries)
}

// ============================================================================
// Alpha Vantage API Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct AvMarketMover {
    ticker: String,
    #[serde(default)]
    price: Option<String>,
    #[serde(default)]
    change_amount: Option<String>,
    #[serde(default)]
    change_percentage: Option<String>,
    #[serde(default)]
    volume: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AvCalendarRow {
    symbol: String,
    #[serde(default)]
    name: String,
    #[serde(default, rename = "reportDate")]
    report_date: Option<String>,
    #[serde(default, rename = "fiscalDateEnding")]
    fiscal_date_ending: Option<String>,
    #[serde(default)]
    estimate: Option<String>,
    #[serde(default)]
    currency: Option<String>,
}
