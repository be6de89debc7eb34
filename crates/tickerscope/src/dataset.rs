//! The compiled per-ticker dataset and its serializable summary.

use chrono::NaiveDate;
use polars::prelude::DataFrame;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use ticker_analytics::{
    CalculatedMetrics, InsiderSummary, NormalizedOverview, StatementHighlights, SupplementaryData,
    overview::keys,
};
use ticker_core::{
    DataError, DisplayValue, EarningsHistory, ErrorKind, FinancialStatement, GlobalQuote,
    InsiderTransaction, OhlcvBar, PriceSeries, Result, Symbol, columns,
};

/// A fetched resource, as named in warnings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    /// Price history with indicators.
    TimeSeries,
    /// Company overview.
    CompanyOverview,
    /// Balance sheets.
    BalanceSheet,
    /// Income statements.
    IncomeStatement,
    /// Cash flow statements.
    CashFlow,
    /// Reported EPS.
    Earnings,
    /// Insider transactions.
    InsiderTransactions,
    /// Latest quote.
    GlobalQuote,
}

impl Resource {
    /// Snake-case name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TimeSeries => "time_series",
            Self::CompanyOverview => "company_overview",
            Self::BalanceSheet => "balance_sheet",
            Self::IncomeStatement => "income_statement",
            Self::CashFlow => "cash_flow",
            Self::Earnings => "earnings",
            Self::InsiderTransactions => "insider_transactions",
            Self::GlobalQuote => "global_quote",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resource that could not be fetched. Its slot in the dataset stays empty.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FetchWarning {
    /// Which resource failed.
    pub resource: Resource,
    /// Category of the failure.
    pub kind: ErrorKind,
    /// Error text.
    pub message: String,
}

impl FetchWarning {
    /// Records a fetch error.
    #[must_use]
    pub fn new(resource: Resource, error: &DataError) -> Self {
        Self {
            resource,
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

/// Everything known about one ticker. Every field is independently optional.
#[derive(Clone, Debug, Default)]
pub struct TickerDataset {
    /// The ticker.
    pub symbol: Symbol,
    /// Price history with computed and merged indicator columns.
    pub time_series: Option<PriceSeries>,
    /// Raw and formatted overview fields.
    pub company_overview: Option<NormalizedOverview>,
    /// Balance sheets, most recent first.
    pub balance_sheet: Option<FinancialStatement>,
    /// Income statements, most recent first.
    pub income_statement: Option<FinancialStatement>,
    /// Cash flow statements, most recent first.
    pub cash_flow: Option<FinancialStatement>,
    /// Reported EPS.
    pub earnings: Option<EarningsHistory>,
    /// Insider transactions in upstream order.
    pub insider_transactions: Option<Vec<InsiderTransaction>>,
    /// Latest quote.
    pub global_quote: Option<GlobalQuote>,
    /// Float, short interest, volume and valuation figures.
    pub supplementary_data: Option<SupplementaryData>,
    /// Ratios from the latest annual statements.
    pub calculated_metrics: Option<CalculatedMetrics>,
    /// Recent insider activity.
    pub insider_summary: Option<InsiderSummary>,
    /// Formatted balance sheet line items.
    pub statement_highlights: Option<StatementHighlights>,
}

impl TickerDataset {
    /// Creates an empty dataset.
    #[must_use]
    pub fn new(symbol: Symbol) -> Self {
        Self {
            symbol,
            ..Self::default()
        }
    }

    /// Returns true if there is a non-empty price history.
    #[must_use]
    pub fn is_analyzable(&self) -> bool {
        self.time_series.as_ref().is_some_and(|s| !s.is_empty())
    }

    /// The price history as a DataFrame, for charting.
    ///
    /// # Errors
    /// Returns an error if the frame cannot be built.
    pub fn time_series_frame(&self) -> Result<Option<DataFrame>> {
        self.time_series.as_ref().map(PriceSeries::to_frame).transpose()
    }
}

/// Result of compiling one ticker.
#[derive(Clone, Debug)]
pub struct CompiledDataset {
    /// Whatever could be fetched and derived.
    pub dataset: TickerDataset,
    /// One entry per resource that failed.
    pub warnings: Vec<FetchWarning>,
    /// Set when there is no price history to analyze.
    pub error: Option<String>,
}

impl CompiledDataset {
    /// Returns true if there is no error.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Serializable slice of the dataset.
    #[must_use]
    pub fn summary(&self) -> DatasetSummary {
        DatasetSummary::from_compiled(self)
    }
}

/// Headline figures of a compiled dataset, ready to serialize.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DatasetSummary {
    /// The ticker.
    pub symbol: Symbol,
    /// Company name.
    pub name: DisplayValue,
    /// Sector.
    pub sector: DisplayValue,
    /// Industry.
    pub industry: DisplayValue,
    /// Latest price.
    pub price: Option<f64>,
    /// Change from the previous close, as sent upstream.
    pub change_percent: DisplayValue,
    /// Number of price rows.
    pub rows: usize,
    /// First price date.
    pub first_date: Option<NaiveDate>,
    /// Last price date.
    pub last_date: Option<NaiveDate>,
    /// Last close.
    pub last_close: Option<f64>,
    /// Indicator values on the last row, by column name.
    pub indicators: BTreeMap<String, f64>,
    /// Market capitalization with suffix.
    pub market_cap: DisplayValue,
    /// Trailing P/E.
    pub pe_ratio: DisplayValue,
    /// Insider ownership.
    pub insider_ownership: DisplayValue,
    /// Institutional ownership.
    pub institutional_ownership: DisplayValue,
    /// Float shares with suffix.
    pub float: DisplayValue,
    /// Computed ratios.
    pub metrics: BTreeMap<String, f64>,
    /// Supplementary figures.
    pub supplementary: Option<SupplementaryData>,
    /// Insider buys among recent transactions.
    pub insider_buys: Option<usize>,
    /// Insider sells among recent transactions.
    pub insider_sells: Option<usize>,
    /// Insider buy/sell ratio.
    pub insider_buy_sell_ratio: DisplayValue,
    /// Failed resources.
    pub warnings: Vec<FetchWarning>,
    /// Set when there is no price history to analyze.
    pub error: Option<String>,
}

const SUMMARY_INDICATORS: [&str; 9] = [
    columns::MA20,
    columns::MA50,
    columns::MA200,
    columns::RSI,
    columns::MACD,
    columns::MACD_SIGNAL,
    columns::ATR,
    columns::RELATIVE_VOLUME,
    columns::DAILY_RETURN,
];

impl DatasetSummary {
    fn from_compiled(compiled: &CompiledDataset) -> Self {
        let dataset = &compiled.dataset;
        let overview = |key: &str| {
            dataset
                .company_overview
                .as_ref()
                .map_or(DisplayValue::NotAvailable, |o| o.get(key))
        };
        let series = dataset.time_series.as_ref();
        let insider = dataset.insider_summary.as_ref();

        Self {
            symbol: dataset.symbol.clone(),
            name: overview("Name"),
            sector: overview("Sector"),
            industry: overview("Industry"),
            price: dataset.global_quote.as_ref().and_then(|q| q.price),
            change_percent: dataset
                .global_quote
                .as_ref()
                .and_then(|q| q.change_percent.clone())
                .into(),
            rows: series.map_or(0, PriceSeries::len),
            first_date: series.and_then(|s| s.bars().first()).map(OhlcvBar::date),
            last_date: series.and_then(PriceSeries::last_bar).map(OhlcvBar::date),
            last_close: series.and_then(PriceSeries::last_bar).map(|b| b.close),
            indicators: series
                .map(|s| {
                    SUMMARY_INDICATORS
                        .iter()
                        .filter_map(|name| s.last_value(name).map(|v| ((*name).to_string(), v)))
                        .collect()
                })
                .unwrap_or_default(),
            market_cap: overview(keys::MARKET_CAP),
            pe_ratio: overview("PERatio"),
            insider_ownership: overview(keys::INSIDER_OWNERSHIP),
            institutional_ownership: overview(keys::INSTITUTIONAL_OWNERSHIP),
            float: overview(keys::FLOAT),
            metrics: dataset
                .calculated_metrics
                .as_ref()
                .map(|m| {
                    m.to_map()
                        .into_iter()
                        .map(|(k, v)| (k.to_string(), v))
                        .collect()
                })
                .unwrap_or_default(),
            supplementary: dataset.supplementary_data.clone(),
            insider_buys: insider.map(|s| s.buys),
            insider_sells: insider.map(|s| s.sells),
            insider_buy_sell_ratio: insider
                .map(InsiderSummary::buy_sell_ratio)
                .into(),
            warnings: compiled.warnings.clone(),
            error: compiled.error.clone(),
        }
    }
}
