//! Company overview, financial statements and earnings.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use ticker_core::{
    AnnualEarnings, AnnualReport, ApiFunction, CompanyOverview, DataError, EarningsHistory,
    FinancialStatement, QuarterlyEarnings, Result, Symbol, parse_number,
};
use tracing::debug;

use crate::{client::AlphaVantageClient, indicators::parse_date};

impl AlphaVantageClient {
    /// Fetches the company overview.
    ///
    /// # Errors
    /// Returns [`DataError::Shape`] if the body is empty or has no `Symbol`.
    pub async fn fetch_overview(&self, symbol: &Symbol) -> Result<CompanyOverview> {
        let body = self.get_function(ApiFunction::Overview, symbol).await?;
        let overview = parse_overview(&body)?;
        debug!(%symbol, fields = overview.len(), "Fetched company overview");
        Ok(overview)
    }

    /// Fetches the balance sheets.
    ///
    /// # Errors
    /// Returns [`DataError::Shape`] if `annualReports` is missing or empty.
    pub async fn fetch_balance_sheet(&self, symbol: &Symbol) -> Result<FinancialStatement> {
        self.fetch_statement(ApiFunction::BalanceSheet, symbol).await
    }

    /// Fetches the income statements.
    ///
    /// # Errors
    /// Returns [`DataError::Shape`] if `annualReports` is missing or empty.
    pub async fn fetch_income_statement(&self, symbol: &Symbol) -> Result<FinancialStatement> {
        self.fetch_statement(ApiFunction::IncomeStatement, symbol).await
    }

    /// Fetches the cash flow statements.
    ///
    /// # Errors
    /// Returns [`DataError::Shape`] if `annualReports` is missing or empty.
    pub async fn fetch_cash_flow(&self, symbol: &Symbol) -> Result<FinancialStatement> {
        self.fetch_statement(ApiFunction::CashFlow, symbol).await
    }

    /// Fetches annual and quarterly EPS.
    ///
    /// # Errors
    /// Returns [`DataError::Shape`] if `annualEarnings` is missing or empty.
    pub async fn fetch_earnings(&self, symbol: &Symbol) -> Result<EarningsHistory> {
        let body = self.get_function(ApiFunction::Earnings, symbol).await?;
        let earnings = parse_earnings(&body, symbol)?;
        debug!(
            %symbol,
            annual = earnings.annual.len(),
            quarterly = earnings.quarterly.len(),
            "Fetched earnings"
        );
        Ok(earnings)
    }

    async fn fetch_statement(
        &self,
        function: ApiFunction,
        symbol: &Symbol,
    ) -> Result<FinancialStatement> {
        let body = self.get_function(function, symbol).await?;
        let statement = parse_statement(&body, symbol)?;
        debug!(%symbol, %function, reports = statement.annual_reports.len(), "Fetched statement");
        Ok(statement)
    }
}

/// Parses an `OVERVIEW` body. Non-string values are kept in their JSON form.
///
/// # Errors
/// Returns [`DataError::Shape`] if the body is empty or has no `Symbol`.
pub fn parse_overview(body: &Value) -> Result<CompanyOverview> {
    let object = body
        .as_object()
        .filter(|object| object.contains_key("Symbol"))
        .ok_or_else(|| DataError::Shape("overview has no Symbol".to_string()))?;

    let fields = object
        .iter()
        .map(|(key, value)| {
            let text = match value {
                Value::String(s) => s.clone(),
                Value::Null => "None".to_string(),
                other => other.to_string(),
            };
            (key.clone(), text)
        })
        .collect();

    Ok(CompanyOverview::new(fields))
}

/// Parses a `BALANCE_SHEET`, `INCOME_STATEMENT` or `CASH_FLOW` body.
///
/// Line items that are `"None"` or non-numeric are kept as absent.
///
/// # Errors
/// Returns [`DataError::Shape`] if `annualReports` is missing or empty.
pub fn parse_statement(body: &Value, symbol: &Symbol) -> Result<FinancialStatement> {
    let annual_reports = reports(body, "annualReports");
    if annual_reports.is_empty() {
        return Err(DataError::Shape("no annualReports".to_string()));
    }

    Ok(FinancialStatement {
        symbol: statement_symbol(body, symbol),
        annual_reports,
        quarterly_reports: reports(body, "quarterlyReports"),
    })
}

fn reports(body: &Value, key: &str) -> Vec<AnnualReport> {
    body.get(key)
        .and_then(Value::as_array)
        .map(|reports| {
            reports
                .iter()
                .filter_map(Value::as_object)
                .map(parse_report)
                .collect()
        })
        .unwrap_or_default()
}

fn parse_report(object: &Map<String, Value>) -> AnnualReport {
    let mut report = AnnualReport::new(
        object
            .get("fiscalDateEnding")
            .and_then(Value::as_str)
            .and_then(parse_date),
    );
    report.reported_currency = object
        .get("reportedCurrency")
        .and_then(Value::as_str)
        .map(ToString::to_string);
    report.items = object
        .iter()
        .filter(|(key, _)| !matches!(key.as_str(), "fiscalDateEnding" | "reportedCurrency"))
        .map(|(key, value)| (key.clone(), crate::indicators::value_number(value)))
        .collect::<BTreeMap<_, _>>();
    report
}

fn statement_symbol(body: &Value, requested: &Symbol) -> Symbol {
    body.get("symbol")
        .and_then(Value::as_str)
        .map_or_else(|| requested.clone(), Symbol::new)
}

/// Parses an `EARNINGS` body.
///
/// # Errors
/// Returns [`DataError::Shape`] if `annualEarnings` is missing or empty, or
/// [`DataError::Parse`] if the body does not have the expected structure.
pub fn parse_earnings(body: &Value, symbol: &Symbol) -> Result<EarningsHistory> {
    let response: AvEarningsResponse = serde_json::from_value(body.clone())
        .map_err(|e| DataError::Parse(format!("earnings: {e}")))?;
    if response.annual_earnings.is_empty() {
        return Err(DataError::Shape("no annualEarnings".to_string()));
    }

    Ok(EarningsHistory {
        symbol: response.symbol.map_or_else(|| symbol.clone(), Symbol::new),
        annual: response
            .annual_earnings
            .into_iter()
            .map(|e| AnnualEarnings {
                fiscal_date_ending: e.fiscal_date_ending.as_deref().and_then(parse_date),
                reported_eps: e.reported_eps.as_deref().and_then(parse_number),
            })
            .collect(),
        quarterly: response
            .quarterly_earnings
            .into_iter()
            .map(|e| QuarterlyEarnings {
                fiscal_date_ending: e.fiscal_date_ending.as_deref().and_then(parse_date),
                reported_date: e.reported_date.as_deref().and_then(parse_date),
                reported_eps: e.reported_eps.as_deref().and_then(parse_number),
                estimated_eps: e.estimated_eps.as_deref().and_then(parse_number),
                surprise: e.surprise.as_deref().and_then(parse_number),
                surprise_percentage: e.surprise_percentage.as_deref().and_then(parse_number),
            })
            .collect(),
    })
}

// ============================================================================
// Alpha Vantage API Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AvEarningsResponse {
    #[serde(default)]
    symbol: Option<String>,
    #[serde(default)]
    annual_earnings: Vec<AvAnnualEarnings>,
    #[serde(default)]
    quarterly_earnings: Vec<AvQuarterlyEarnings>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AvAnnualEarnings {
    #[serde(default)]
    fiscal_date_ending: Option<String>,
    #[serde(default, rename = "reportedEPS")]
    reported_eps: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AvQuarterlyEarnings {
    #[serde(default)]
    fiscal_date_ending: Option<String>,
    #[serde(default)]
    reported_date: Option<String>,
    #[serde(default, rename = "reportedEPS")]
    reported_eps: Option<String>,
    #[serde(default, rename = "estimatedEPS")]
    estimated_eps: Option<String>,
    #[serde(default)]
    surprise: Option<String>,
    #[serde(default)]
    surprise_percentage: Option<String>,
}
