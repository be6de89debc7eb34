//! Per-ticker dataset compilation.
//!
//! [`DatasetCompiler`] runs every resource fetcher for a symbol, downgrades each
//! failure to a [`FetchWarning`] and derives the normalized overview, the
//! calculated metrics, the supplementary figures and the insider summary from
//! whatever came back.

use futures::{Stream, StreamExt, stream};
use std::sync::Arc;
use ticker_alphavantage::{
    AlphaVantageClient, FixtureTransport, HttpTransport, SlidingWindowLimiter,
};
use ticker_analytics::{
    InsiderSummary, StatementHighlights, SupplementaryData, calculate_metrics, normalize_overview,
};
use ticker_core::{
    CompanyOverview, DataError, EarningsHistory, FinancialStatement, GlobalQuote,
    InsiderTransaction, PriceSeries, Result, Symbol, Transport, WatchlistStore,
};
use tracing::{debug, info, instrument, warn};

use crate::{
    config::CompilerConfig,
    dataset::{CompiledDataset, FetchWarning, Resource, TickerDataset},
};

/// Error text set on a dataset without a usable price history.
pub const NO_ANALYZABLE_DATA: &str = "no analyzable data";

/// Raw fetch results for one symbol, before derivation.
#[derive(Debug, Default)]
struct Fetched {
    time_series: Option<PriceSeries>,
    overview: Option<CompanyOverview>,
    balance_sheet: Option<FinancialStatement>,
    income_statement: Option<FinancialStatement>,
    cash_flow: Option<FinancialStatement>,
    earnings: Option<EarningsHistory>,
    insider_transactions: Option<Vec<InsiderTransaction>>,
    global_quote: Option<GlobalQuote>,
}

/// Compiles [`TickerDataset`]s from the Alpha Vantage resources.
#[derive(Clone, Debug)]
pub struct DatasetCompiler {
    client: AlphaVantageClient,
    config: CompilerConfig,
}

impl DatasetCompiler {
    /// Creates a compiler from configuration.
    ///
    /// With `fixture_dir` set, responses are served from that directory and no
    /// API key is needed. Otherwise requests go over HTTP, throttled to
    /// `requests_per_minute`.
    ///
    /// # Errors
    /// Returns [`DataError::InvalidParameter`] if live mode has no API key, or
    /// the error from building the transport.
    pub fn from_config(config: CompilerConfig) -> Result<Self> {
        let transport: Arc<dyn Transport> = match &config.fixture_dir {
            Some(dir) => {
                let fixtures = FixtureTransport::from_dir(dir)?;
                info!(dir = %dir.display(), fixtures = fixtures.len(), "Using fixture transport");
                Arc::new(fixtures)
            }
            None => {
                if config.api_key.trim().is_empty() {
                    return Err(DataError::InvalidParameter(
                        "an Alpha Vantage API key is required".to_string(),
                    ));
                }
                let limiter = Arc::new(SlidingWindowLimiter::per_minute(config.requests_per_minute));
                Arc::new(HttpTransport::new(
                    config.api_key.clone(),
                    config.base_url.clone(),
                    config.timeout(),
                    limiter,
                )?)
            }
        };
        Ok(Self::with_transport(transport, config))
    }

    /// Creates a compiler over any transport.
    #[must_use]
    pub fn with_transport(transport: Arc<dyn Transport>, config: CompilerConfig) -> Self {
        let client = AlphaVantageClient::with_transport(transport, config.client_options());
        Self { client, config }
    }

    /// The underlying client.
    #[must_use]
    pub const fn client(&self) -> &AlphaVantageClient {
        &self.client
    }

    /// The configuration.
    #[must_use]
    pub const fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Fetches and derives everything available for `symbol`.
    ///
    /// Never fails: each resource that cannot be fetched leaves its slot empty
    /// and adds a warning. Without a non-empty price history the result carries
    /// [`NO_ANALYZABLE_DATA`] as its error, alongside every other field.
    #[instrument(skip(self), fields(symbol = %symbol))]
    pub async fn compile(&self, symbol: &Symbol) -> CompiledDataset {
        let mut warnings = Vec::new();
        let fetched = if self.config.parallel_fetch {
            self.fetch_parallel(symbol, &mut warnings).await
        } else {
            self.fetch_sequential(symbol, &mut warnings).await
        };

        let dataset = self.derive(symbol, fetched);
        let error = (!dataset.is_analyzable()).then(|| {
            warn!("No price history; dataset is not analyzable");
            NO_ANALYZABLE_DATA.to_string()
        });

        info!(warnings = warnings.len(), analyzable = error.is_none(), "Compiled dataset");
        CompiledDataset {
            dataset,
            warnings,
            error,
        }
    }

    /// Compiles each symbol in turn, yielding datasets as they complete.
    pub fn compile_stream<'a>(
        &'a self,
        symbols: &'a [Symbol],
    ) -> impl Stream<Item = CompiledDataset> + 'a {
        stream::iter(symbols).then(move |symbol| self.compile(symbol))
    }

    /// Compiles every symbol on the watchlist, in watchlist order.
    ///
    /// # Errors
    /// Returns the store's error if the watchlist cannot be read.
    #[instrument(skip_all)]
    pub async fn compile_watchlist(&self, store: &dyn WatchlistStore) -> Result<Vec<CompiledDataset>> {
        let symbols = store.symbols().await?;
        debug!(count = symbols.len(), "Compiling watchlist");
        Ok(self.compile_stream(&symbols).collect::<Vec<_>>().await)
    }

    async fn fetch_sequential(&self, symbol: &Symbol, warnings: &mut Vec<FetchWarning>) -> Fetched {
        let client = &self.client;
        Fetched {
            time_series: record(Resource::TimeSeries, client.fetch_time_series(symbol).await, warnings),
            overview: record(Resource::CompanyOverview, client.fetch_overview(symbol).await, warnings),
            balance_sheet: record(
                Resource::BalanceSheet,
                client.fetch_balance_sheet(symbol).await,
                warnings,
            ),
            income_statement: record(
                Resource::IncomeStatement,
                client.fetch_income_statement(symbol).await,
                warnings,
            ),
            cash_flow: record(Resource::CashFlow, client.fetch_cash_flow(symbol).await, warnings),
            earnings: record(Resource::Earnings, client.fetch_earnings(symbol).await, warnings),
            insider_transactions: record(
                Resource::InsiderTransactions,
                client.fetch_insider_transactions(symbol).await,
                warnings,
            ),
            global_quote: record(Resource::GlobalQuote, client.fetch_global_quote(symbol).await, warnings),
        }
    }

    async fn fetch_parallel(&self, symbol: &Symbol, warnings: &mut Vec<FetchWarning>) -> Fetched {
        let client = &self.client;
        let (time_series, overview, balance, income, cash_flow, earnings, insider, quote) = tokio::join!(
            client.fetch_time_series(symbol),
            client.fetch_overview(symbol),
            client.fetch_balance_sheet(symbol),
            client.fetch_income_statement(symbol),
            client.fetch_cash_flow(symbol),
            client.fetch_earnings(symbol),
            client.fetch_insider_transactions(symbol),
            client.fetch_global_quote(symbol),
        );

        Fetched {
            time_series: record(Resource::TimeSeries, time_series, warnings),
            overview: record(Resource::CompanyOverview, overview, warnings),
            balance_sheet: record(Resource::BalanceSheet, balance, warnings),
            income_statement: record(Resource::IncomeStatement, income, warnings),
            cash_flow: record(Resource::CashFlow, cash_flow, warnings),
            earnings: record(Resource::Earnings, earnings, warnings),
            insider_transactions: record(Resource::InsiderTransactions, insider, warnings),
            global_quote: record(Resource::GlobalQuote, quote, warnings),
        }
    }

    fn derive(&self, symbol: &Symbol, fetched: Fetched) -> TickerDataset {
        let company_overview = fetched.overview.as_ref().map(normalize_overview);

        let calculated_metrics = match (&fetched.income_statement, &fetched.balance_sheet) {
            (Some(income), Some(balance)) => {
                match (income.latest_annual(), balance.latest_annual()) {
                    (Some(income), Some(balance)) => Some(calculate_metrics(
                        income,
                        balance,
                        fetched.cash_flow.as_ref().and_then(FinancialStatement::latest_annual),
                    )),
                    _ => None,
                }
            }
            _ => None,
        };

        let supplementary_data = (company_overview.is_some()
            || fetched.global_quote.is_some()
            || fetched.time_series.is_some())
        .then(|| {
            SupplementaryData::derive(
                company_overview.as_ref(),
                fetched.global_quote.as_ref(),
                fetched.time_series.as_ref(),
            )
        });

        let insider_summary = fetched
            .insider_transactions
            .as_deref()
            .map(|txs| InsiderSummary::from_transactions(txs, self.config.insider_limit));

        let statement_highlights = fetched
            .balance_sheet
            .as_ref()
            .map(StatementHighlights::from_balance_sheet);

        TickerDataset {
            symbol: symbol.clone(),
            time_series: fetched.time_series,
            company_overview,
            balance_sheet: fetched.balance_sheet,
            income_statement: fetched.income_statement,
            cash_flow: fetched.cash_flow,
            earnings: fetched.earnings,
            insider_transactions: fetched.insider_transactions,
            global_quote: fetched.global_quote,
            supplementary_data,
            calculated_metrics,
            insider_summary,
            statement_highlights,
        }
    }
}

fn record<T>(resource: Resource, result: Result<T>, warnings: &mut Vec<FetchWarning>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(%resource, error = %e, "Fetch failed");
            warnings.push(FetchWarning::new(resource, &e));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use ticker_core::ErrorKind;

    fn compiler(transport: FixtureTransport) -> DatasetCompiler {
        let config = CompilerConfig {
            advanced_indicators: false,
            ..CompilerConfig::default()
        };
        DatasetCompiler::with_transport(Arc::new(transport), config)
    }

    #[test]
    fn test_live_mode_requires_api_key() {
        let result = DatasetCompiler::from_config(CompilerConfig::default());
        assert!(matches!(result, Err(DataError::InvalidParameter(_))));

        assert!(DatasetCompiler::from_config(CompilerConfig::with_api_key("demo")).is_ok());
    }

    #[test]
    fn test_debug_hides_api_key() {
        let compiler = DatasetCompiler::from_config(CompilerConfig::with_api_key("secret-key")).unwrap();
        let debug = format!("{compiler:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("secret-key"));
    }

    #[tokio::test]
    async fn test_everything_fails() {
        let compiled = compiler(FixtureTransport::new())
            .compile(&Symbol::new("NONE"))
            .await;

        assert_eq!(compiled.error.as_deref(), Some(NO_ANALYZABLE_DATA));
        assert_eq!(compiled.warnings.len(), 8);
        assert!(compiled.dataset.supplementary_data.is_none());
        assert!(compiled.dataset.calculated_metrics.is_none());
    }

    #[tokio::test]
    async fn test_advisory_recorded_as_warning() {
        let transport = FixtureTransport::new().with_response(
            "GLOBAL_QUOTE",
            json!({"Note": "Thank you for using Alpha Vantage! Our standard API call frequency is 5 calls per minute."}),
        );
        let compiled = compiler(transport).compile(&Symbol::new("IBM")).await;

        let quote = compiled
            .warnings
            .iter()
            .find(|w| w.resource == Resource::GlobalQuote)
            .unwrap();
        assert_eq!(quote.kind, ErrorKind::UpstreamAdvisory);
    }

    #[tokio::test]
    async fn test_insider_summary_uses_limit() {
        let rows: Vec<_> = (1..=5)
            .map(|day| {
                let kind = if day % 2 == 0 { "D" } else { "A" };
                json!({
                    "transaction_date": format!("2024-01-0{day}"),
                    "acquisition_or_disposal": kind,
                    "shares": "100",
                    "share_price": "10.0",
                    "executive": "Jane Doe",
                    "executive_title": "Director"
                })
            })
            .collect();
        let transport = FixtureTransport::new()
            .with_response("INSIDER_TRANSACTIONS", json!({"data": rows}));
        let config = CompilerConfig {
            advanced_indicators: false,
            insider_limit: 3,
            ..CompilerConfig::default()
        };
        let compiled = DatasetCompiler::with_transport(Arc::new(transport), config)
            .compile(&Symbol::new("IBM"))
            .await;

        let summary = compiled.dataset.insider_summary.unwrap();
        assert_eq!(summary.recent.len(), 3);
        assert_eq!(summary.buys + summary.sells, 3);
        assert_eq!(compiled.dataset.insider_transactions.unwrap().len(), 5);
    }
}
