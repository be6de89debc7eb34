//! Insider transactions.

use serde::Deserialize;
use serde_json::Value;
use ticker_core::{
    ApiFunction, DataError, InsiderTransaction, Result, Symbol, TransactionKind, parse_number,
};
use tracing::debug;

use crate::{client::AlphaVantageClient, indicators::parse_date};

impl AlphaVantageClient {
    /// Fetches insider transactions, in upstream order.
    ///
    /// # Errors
    /// Returns [`DataError::Shape`] if there is no non-empty transaction list.
    pub async fn fetch_insider_transactions(
        &self,
        symbol: &Symbol,
    ) -> Result<Vec<InsiderTransaction>> {
        let body = self
            .get_function(ApiFunction::InsiderTransactions, symbol)
            .await?;
        let transactions = parse_insider_transactions(&body)?;
        debug!(%symbol, count = transactions.len(), "Fetched insider transactions");
        Ok(transactions)
    }
}

/// Parses an `INSIDER_TRANSACTIONS` body.
///
/// Accepts the list under `data` or `transactions`, with either the snake_case
/// field names of the live API (`acquisition_or_disposal`, `share_price`, ...)
/// or camelCase ones (`transactionType`, `transactionPrice`, ...). Entries
/// that do not deserialize are dropped and counted in a debug log.
///
/// # Errors
/// Returns [`DataError::Shape`] if the list is missing or empty.
pub fn parse_insider_transactions(body: &Value) -> Result<Vec<InsiderTransaction>> {
    let list = body
        .get("data")
        .or_else(|| body.get("transactions"))
        .and_then(Value::as_array)
        .filter(|list| !list.is_empty())
        .ok_or_else(|| DataError::Shape("no insider transactions".to_string()))?;

    let transactions: Vec<InsiderTransaction> = list
        .iter()
        .filter_map(|item| serde_json::from_value::<AvInsiderTransaction>(item.clone()).ok())
        .map(|raw| InsiderTransaction {
            date: raw.date.as_deref().and_then(parse_date),
            kind: TransactionKind::parse(raw.kind.as_deref().unwrap_or_default()),
            shares: raw.shares.and_then(TextOrNumber::number),
            price: raw.price.and_then(TextOrNumber::number),
            reporter_name: raw.reporter_name,
            reporter_title: raw.reporter_title,
        })
        .collect();

    if transactions.len() < list.len() {
        debug!(
            dropped = list.len() - transactions.len(),
            "Dropped unparseable insider transactions"
        );
    }
    Ok(transactions)
}

// ============================================================================
// Alpha Vantage API Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TextOrNumber {
    Number(f64),
    Text(String),
}

impl TextOrNumber {
    fn number(self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(n),
            Self::Text(s) => parse_number(&s),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AvInsiderTransaction {
    #[serde(default, rename = "transaction_date", alias = "transactionDate")]
    date: Option<String>,
    #[serde(
        default,
        rename = "acquisition_or_disposal",
        alias = "transactionType"
    )]
    kind: Option<String>,
    #[serde(default, alias = "transactionShares")]
    shares: Option<TextOrNumber>,
    #[serde(default, rename = "share_price", alias = "transactionPrice")]
    price: Option<TextOrNumber>,
    #[serde(default, rename = "executive", alias = "reporterName")]
    reporter_name: Option<String>,
    #[serde(default, rename = "executive_title", alias = "reporterTitle")]
    reporter_title: Option<String>,
}
