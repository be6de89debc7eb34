//! Summary of recent insider activity.

use serde::Serialize;
use ticker_core::{InsiderTransaction, TransactionKind};

/// Number of transactions summarized when no limit is configured.
pub const DEFAULT_RECENT_LIMIT: usize = 10;

/// The most recent insider transactions with buy/sell counts.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct InsiderSummary {
    /// Most recent transactions, newest first.
    pub recent: Vec<InsiderTransaction>,
    /// Buys among `recent`.
    pub buys: usize,
    /// Sells among `recent`.
    pub sells: usize,
}

impl InsiderSummary {
    /// Sorts transactions newest first and summarizes the first `limit`.
    ///
    /// Transactions without a date sort last.
    #[must_use]
    pub fn from_transactions(transactions: &[InsiderTransaction], limit: usize) -> Self {
        let mut recent = transactions.to_vec();
        recent.sort_by(|a, b| b.date.cmp(&a.date));
        recent.truncate(limit);

        let buys = recent
            .iter()
            .filter(|t| t.kind == TransactionKind::Buy)
            .count();
        let sells = recent
            .iter()
            .filter(|t| t.kind == TransactionKind::Sell)
            .count();

        Self {
            recent,
            buys,
            sells,
        }
    }

    /// Buys per sell, two decimals, or `"∞"` when there are no sells.
    #[must_use]
    pub fn buy_sell_ratio(&self) -> String {
        if self.sells == 0 {
            "∞".to_string()
        } else {
            format!("{:.2}", self.buys as f64 / self.sells as f64)
        }
    }
}
