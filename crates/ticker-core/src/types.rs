//! Core data types for per-ticker market data.
//!
//! This module defines the fundamental data structures:
//!
//! - [`Symbol`] - Trading symbol/ticker
//! - [`OhlcvBar`] - One OHLCV bar
//! - [`DisplayValue`] - A formatted value or the "not available" sentinel
//! - [`CompanyOverview`] - Raw company overview fields
//! - [`AnnualReport`] and [`FinancialStatement`] - Statement line items
//! - [`EarningsHistory`] - Reported EPS
//! - [`InsiderTransaction`] - One insider trade
//! - [`GlobalQuote`] - Latest quote
//! - [`MarketMovers`] - Market-wide gainers, losers and most active tickers
//! - [`EarningsCalendarEntry`] - One upcoming earnings report

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Rendering of [`DisplayValue::NotAvailable`].
pub const NOT_AVAILABLE: &str = "N/A";

/// Parses an upstream numeric string.
///
/// The API sends numbers as strings and uses `"None"`, `"-"` or an empty string
/// for missing values; those (and anything non-numeric) yield `None`.
#[must_use]
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") || trimmed == "-" {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// A trading symbol/ticker.
///
/// Symbols are automatically uppercased on creation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Symbol(String);

impl Symbol {
    /// Creates a new symbol from a string, converting to uppercase.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into().trim().to_uppercase())
    }

    /// Returns the symbol as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Symbol {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// OHLCV (Open, High, Low, Close, Volume) bar for one period.
///
/// Daily and longer bars sit at midnight of their trading date; intraday bars
/// carry the exchange timestamp of the interval.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OhlcvBar {
    /// Start of the period.
    pub timestamp: NaiveDateTime,
    /// Opening price.
    pub open: f64,
    /// Highest price during the period.
    pub high: f64,
    /// Lowest price during the period.
    pub low: f64,
    /// Closing price.
    pub close: f64,
    /// Traded volume.
    pub volume: u64,
}

impl OhlcvBar {
    /// Creates a bar for a whole trading date.
    #[must_use]
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: u64) -> Self {
        Self::at(date.and_time(NaiveTime::MIN), open, high, low, close, volume)
    }

    /// Creates a bar starting at `timestamp`.
    #[must_use]
    pub const fn at(
        timestamp: NaiveDateTime,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: u64,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Trading date of the bar.
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

/// A display-ready value, or the sentinel meaning "could not be determined".
///
/// The sentinel is distinct from zero and from an empty string, and renders as
/// [`NOT_AVAILABLE`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum DisplayValue {
    /// A formatted value.
    Available(String),
    /// The value could not be determined.
    #[default]
    NotAvailable,
}

impl DisplayValue {
    /// Wraps a formatted value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self::Available(value.into())
    }

    /// Returns true unless this is the sentinel.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }

    /// The formatted value, if available.
    #[must_use]
    pub fn as_deref(&self) -> Option<&str> {
        match self {
            Self::Available(s) => Some(s.as_str()),
            Self::NotAvailable => None,
        }
    }
}

impl From<Option<String>> for DisplayValue {
    fn from(value: Option<String>) -> Self {
        value.map_or(Self::NotAvailable, Self::Available)
    }
}

impl From<String> for DisplayValue {
    fn from(value: String) -> Self {
        if value == NOT_AVAILABLE {
            Self::NotAvailable
        } else {
            Self::Available(value)
        }
    }
}

impl From<DisplayValue> for String {
    fn from(value: DisplayValue) -> Self {
        value.to_string()
    }
}

impl fmt::Display for DisplayValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Available(s) => f.write_str(s),
            Self::NotAvailable => f.write_str(NOT_AVAILABLE),
        }
    }
}

/// Raw company overview fields, as sent upstream (`"Symbol"`, `"MarketCapitalization"`, ...).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyOverview {
    fields: BTreeMap<String, String>,
}

impl CompanyOverview {
    /// Creates an overview from raw fields.
    #[must_use]
    pub const fn new(fields: BTreeMap<String, String>) -> Self {
        Self { fields }
    }

    /// Raw value of a field. `"None"` is returned verbatim.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Numeric value of a field, absent for `"None"` and unparseable strings.
    #[must_use]
    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(parse_number)
    }

    /// Display value of a textual field (`Name`, `Sector`, ...).
    #[must_use]
    pub fn text(&self, key: &str) -> DisplayValue {
        match self.get(key).map(str::trim) {
            None | Some("" | "None" | "-") => DisplayValue::NotAvailable,
            Some(value) => DisplayValue::new(value),
        }
    }

    /// All raw fields.
    #[must_use]
    pub const fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    /// Number of raw fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if there are no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// One fiscal period of a financial statement.
///
/// Line items keep their upstream names (`totalRevenue`, `netIncome`, ...).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnualReport {
    /// End of the fiscal period.
    pub fiscal_date_ending: Option<NaiveDate>,
    /// Currency the figures are reported in.
    pub reported_currency: Option<String>,
    /// Line items; `None` when the upstream value was missing or non-numeric.
    pub items: BTreeMap<String, Option<f64>>,
}

impl AnnualReport {
    /// Creates an empty report for a period.
    #[must_use]
    pub const fn new(fiscal_date_ending: Option<NaiveDate>) -> Self {
        Self {
            fiscal_date_ending,
            reported_currency: None,
            items: BTreeMap::new(),
        }
    }

    /// Sets a line item.
    #[must_use]
    pub fn with_item(mut self, name: impl Into<String>, value: Option<f64>) -> Self {
        self.items.insert(name.into(), value);
        self
    }

    /// Value of a line item, absent if missing or non-numeric.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.items.get(name).copied().flatten()
    }

    /// Value of a line item, `0.0` if missing or non-numeric.
    #[must_use]
    pub fn value_or_zero(&self, name: &str) -> f64 {
        self.get(name).unwrap_or(0.0)
    }
}

/// A financial statement resource: annual and quarterly reports, most recent first.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialStatement {
    /// Stock symbol.
    pub symbol: Symbol,
    /// Annual reports, most recent first.
    pub annual_reports: Vec<AnnualReport>,
    /// Quarterly reports, most recent first.
    pub quarterly_reports: Vec<AnnualReport>,
}

impl FinancialStatement {
    /// The most recent annual report.
    #[must_use]
    pub fn latest_annual(&self) -> Option<&AnnualReport> {
        self.annual_reports.first()
    }
}

/// Reported EPS for one fiscal year.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnnualEarnings {
    /// End of the fiscal year.
    pub fiscal_date_ending: Option<NaiveDate>,
    /// Reported earnings per share.
    pub reported_eps: Option<f64>,
}

/// Reported and estimated EPS for one fiscal quarter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuarterlyEarnings {
    /// End of the fiscal quarter.
    pub fiscal_date_ending: Option<NaiveDate>,
    /// Date the figures were reported.
    pub reported_date: Option<NaiveDate>,
    /// Reported earnings per share.
    pub reported_eps: Option<f64>,
    /// Consensus estimate.
    pub estimated_eps: Option<f64>,
    /// Reported minus estimated.
    pub surprise: Option<f64>,
    /// Surprise as a percentage of the estimate.
    pub surprise_percentage: Option<f64>,
}

/// Earnings resource.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EarningsHistory {
    /// Stock symbol.
    pub symbol: Symbol,
    /// Annual EPS, most recent first.
    pub annual: Vec<AnnualEarnings>,
    /// Quarterly EPS, most recent first.
    pub quarterly: Vec<QuarterlyEarnings>,
}

/// Direction of an insider trade.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    /// Purchase or acquisition.
    Buy,
    /// Sale or disposal.
    Sell,
    /// Anything else (gift, option exercise, ...), kept verbatim.
    Other(String),
}

impl TransactionKind {
    /// Parses an upstream transaction type, case-insensitively.
    ///
    /// The acquisition/disposal codes `A` and `D` map to buy and sell.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "buy" | "purchase" | "a" => Self::Buy,
            "sell" | "sale" | "d" => Self::Sell,
            _ => Self::Other(raw.trim().to_string()),
        }
    }
}

/// One insider transaction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InsiderTransaction {
    /// Transaction date.
    pub date: Option<NaiveDate>,
    /// Buy, sell or other.
    pub kind: TransactionKind,
    /// Number of shares.
    pub shares: Option<f64>,
    /// Price per share.
    pub price: Option<f64>,
    /// Name of the reporting insider.
    pub reporter_name: Option<String>,
    /// Title of the reporting insider.
    pub reporter_title: Option<String>,
}

/// Latest quote for a symbol.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalQuote {
    /// Stock symbol.
    pub symbol: Symbol,
    /// Session open.
    pub open: Option<f64>,
    /// Session high.
    pub high: Option<f64>,
    /// Session low.
    pub low: Option<f64>,
    /// Last price.
    pub price: Option<f64>,
    /// Session volume.
    pub volume: Option<u64>,
    /// Latest trading day.
    pub latest_trading_day: Option<NaiveDate>,
    /// Previous session close.
    pub previous_close: Option<f64>,
    /// Absolute change from the previous close.
    pub change: Option<f64>,
    /// Percent change as sent upstream (e.g. `"0.52%"`).
    pub change_percent: Option<String>,
}

/// One entry of a market movers list.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketMover {
    /// Ticker.
    pub ticker: Symbol,
    /// Last price.
    pub price: Option<f64>,
    /// Absolute change.
    pub change_amount: Option<f64>,
    /// Percent change, as a whole percent.
    pub change_percentage: Option<f64>,
    /// Session volume.
    pub volume: Option<u64>,
    /// Signed change with two decimals (`"+1.25"`).
    pub change_formatted: DisplayValue,
    /// Signed percent change with two decimals (`"-3.10%"`).
    pub change_pct_formatted: DisplayValue,
    /// Volume with a `M`/`K` suffix (`"12.35M"`).
    pub volume_formatted: DisplayValue,
}

/// Market-wide top gainers, top losers and most actively traded tickers.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketMovers {
    /// Upstream timestamp of the snapshot, as sent.
    pub last_updated: Option<String>,
    /// Largest percent gains.
    pub top_gainers: Vec<MarketMover>,
    /// Largest percent losses.
    pub top_losers: Vec<MarketMover>,
    /// Highest volume.
    pub most_actively_traded: Vec<MarketMover>,
}

/// One upcoming earnings report.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EarningsCalendarEntry {
    /// Reporting company.
    pub symbol: Symbol,
    /// Company name.
    pub name: String,
    /// Expected report date.
    pub report_date: Option<NaiveDate>,
    /// Last day of the reported fiscal period.
    pub fiscal_date_ending: Option<NaiveDate>,
    /// Consensus EPS estimate.
    pub estimate: Option<f64>,
    /// Reporting currency.
    pub currency: Option<String>,
}
