//! Provider and transport traits.
//!
//! - [`DataProvider`] - Base metadata trait for a market-data source
//! - [`Transport`] - Issues one upstream request and classifies the outcome
//! - [`ApiFunction`] and [`ApiQuery`] - Typed request parameters

use async_trait::async_trait;
use serde_json::Value;
use std::fmt::{self, Debug};

use crate::{error::Result, frequency::DataFrequency, types::Symbol};

/// Base trait for all data providers.
pub trait DataProvider: Send + Sync + Debug {
    /// Returns the name of this provider (e.g., "Alpha Vantage").
    fn name(&self) -> &str;

    /// Returns a description of this provider.
    fn description(&self) -> &str;

    /// Returns the time series frequencies supported by this provider.
    fn supported_frequencies(&self) -> &[DataFrequency];
}

/// Upstream resource selector (the `function` query parameter).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ApiFunction {
    /// One of the `TIME_SERIES_*` functions.
    TimeSeries(DataFrequency),
    /// Company overview.
    Overview,
    /// Annual and quarterly balance sheets.
    BalanceSheet,
    /// Annual and quarterly income statements.
    IncomeStatement,
    /// Annual and quarterly cash flow statements.
    CashFlow,
    /// Annual and quarterly EPS.
    Earnings,
    /// Insider transactions.
    InsiderTransactions,
    /// Latest quote.
    GlobalQuote,
    /// Bollinger bands.
    Bbands,
    /// Stochastic RSI.
    StochRsi,
    /// Fast stochastic oscillator.
    StochFast,
    /// Absolute price oscillator.
    Apo,
    /// Market-wide top gainers, losers and most active tickers.
    TopGainersLosers,
    /// Upcoming earnings reports, answered as CSV.
    EarningsCalendar,
}

impl ApiFunction {
    /// Upstream `function` parameter value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TimeSeries(frequency) => frequency.function(),
            Self::Overview => "OVERVIEW",
            Self::BalanceSheet => "BALANCE_SHEET",
            Self::IncomeStatement => "INCOME_STATEMENT",
            Self::CashFlow => "CASH_FLOW",
            Self::Earnings => "EARNINGS",
            Self::InsiderTransactions => "INSIDER_TRANSACTIONS",
            Self::GlobalQuote => "GLOBAL_QUOTE",
            Self::Bbands => "BBANDS",
            Self::StochRsi => "STOCHRSI",
            Self::StochFast => "STOCHF",
            Self::Apo => "APO",
            Self::TopGainersLosers => "TOP_GAINERS_LOSERS",
            Self::EarningsCalendar => "EARNINGS_CALENDAR",
        }
    }

    /// Returns true if the upstream answers this function with CSV instead of JSON.
    #[must_use]
    pub const fn is_csv(&self) -> bool {
        matches!(self, Self::EarningsCalendar)
    }
}

impl fmt::Display for ApiFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single upstream request: function, symbol and resource-specific parameters.
///
/// Market-wide functions carry no symbol. The API key is not part of the
/// query; transports append it themselves.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiQuery {
    /// Resource selector.
    pub function: ApiFunction,
    /// Ticker the request is about, if any.
    pub symbol: Option<Symbol>,
    /// Additional `key=value` parameters, in insertion order.
    pub params: Vec<(String, String)>,
}

impl ApiQuery {
    /// Creates a query about `symbol` with no extra parameters.
    #[must_use]
    pub const fn new(function: ApiFunction, symbol: Symbol) -> Self {
        Self {
            function,
            symbol: Some(symbol),
            params: Vec::new(),
        }
    }

    /// Creates a market-wide query with no symbol.
    #[must_use]
    pub const fn market(function: ApiFunction) -> Self {
        Self {
            function,
            symbol: None,
            params: Vec::new(),
        }
    }

    /// The symbol as text, or `""` for market-wide queries.
    #[must_use]
    pub fn symbol_str(&self) -> &str {
        self.symbol.as_ref().map_or("", Symbol::as_str)
    }

    /// Appends a parameter.
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Returns the value of a parameter, if set.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// All parameters including `function` and `symbol` (when set), ready for a
    /// query string.
    #[must_use]
    pub fn pairs(&self) -> Vec<(&str, &str)> {
        let mut pairs = Vec::with_capacity(self.params.len() + 2);
        pairs.push(("function", self.function.as_str()));
        if let Some(symbol) = &self.symbol {
            pairs.push(("symbol", symbol.as_str()));
        }
        pairs.extend(self.params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        pairs
    }
}

/// Issues upstream requests.
///
/// Implementations return the parsed JSON body on success; functions answered
/// in CSV (see [`ApiFunction::is_csv`]) come back as a JSON string holding the
/// raw text. Network failures,
/// non-2xx statuses and malformed bodies surface as
/// [`DataError::Transport`](crate::DataError::Transport); advisory bodies
/// (rate-limit notes, informational messages, explicit error messages) surface
/// as [`DataError::UpstreamAdvisory`](crate::DataError::UpstreamAdvisory).
#[async_trait]
pub trait Transport: Send + Sync + Debug {
    /// Sends one request and returns the classified outcome.
    async fn request(&self, query: &ApiQuery) -> Result<Value>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_pairs() {
        let query = ApiQuery::new(ApiFunction::Bbands, Symbol::new("ibm"))
            .param("interval", "daily")
            .param("time_period", "20");

        assert_eq!(query.get("time_period"), Some("20"));
        assert_eq!(query.get("missing"), None);
        assert_eq!(
            query.pairs(),
            vec![
                ("function", "BBANDS"),
                ("symbol", "IBM"),
                ("interval", "daily"),
                ("time_period", "20"),
            ]
        );
    }

    #[test]
    fn test_market_query_has_no_symbol() {
        let query = ApiQuery::market(ApiFunction::TopGainersLosers);
        assert_eq!(query.symbol_str(), "");
        assert_eq!(query.pairs(), vec![("function", "TOP_GAINERS_LOSERS")]);
        assert!(!query.function.is_csv());
        assert!(ApiFunction::EarningsCalendar.is_csv());
    }

    #[test]
    fn test_function_names() {
        assert_eq!(
            ApiFunction::TimeSeries(DataFrequency::Weekly).as_str(),
            "TIME_SERIES_WEEKLY"
        );
        assert_eq!(ApiFunction::StochFast.to_string(), "STOCHF");
    }
}
