//! Display highlights of the latest balance sheet.

use serde::Serialize;
use std::collections::BTreeMap;
use ticker_core::{DisplayValue, FinancialStatement};

use crate::format::format_with_suffix;

/// Balance sheet line items shown as highlights, with their display keys.
pub const BALANCE_SHEET_HIGHLIGHTS: [(&str, &str); 5] = [
    ("totalAssets", "TotalAssetsFormatted"),
    ("totalLiabilities", "TotalLiabilitiesFormatted"),
    ("totalShareholderEquity", "TotalShareholderEquityFormatted"),
    ("longTermDebt", "LongTermDebtFormatted"),
    ("intangibleAssets", "IntangibleAssetsFormatted"),
];

/// Dollar-suffixed line items from the most recent annual balance sheet.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct StatementHighlights {
    /// Display key to value.
    pub values: BTreeMap<String, DisplayValue>,
}

impl StatementHighlights {
    /// Builds the highlights. Every key is present; missing items are `N/A`.
    #[must_use]
    pub fn from_balance_sheet(balance_sheet: &FinancialStatement) -> Self {
        let latest = balance_sheet.latest_annual();
        let values = BALANCE_SHEET_HIGHLIGHTS
            .iter()
            .map(|(item, key)| {
                let value = latest
                    .and_then(|report| report.get(item))
                    .map_or(DisplayValue::NotAvailable, |v| {
                        DisplayValue::new(format_with_suffix(v, "$"))
                    });
                ((*key).to_string(), value)
            })
            .collect();
        Self { values }
    }

    /// Value for a display key.
    #[must_use]
    pub fn get(&self, key: &str) -> DisplayValue {
        self.values.get(key).cloned().unwrap_or_default()
    }
}
