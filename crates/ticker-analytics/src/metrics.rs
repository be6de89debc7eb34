//! Financial ratios from the latest annual statements.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ticker_core::AnnualReport;

/// Ratios derived from the latest annual income statement, balance sheet and
/// cash flow statement.
///
/// A ratio whose denominator is missing or not positive is absent.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CalculatedMetrics {
    /// Net income over revenue, in percent.
    pub profit_margin: Option<f64>,
    /// Gross profit over revenue, in percent.
    pub gross_margin: Option<f64>,
    /// Net income over total assets, in percent.
    pub return_on_assets: Option<f64>,
    /// Net income over shareholder equity, in percent.
    pub return_on_equity: Option<f64>,
    /// Total liabilities over shareholder equity.
    pub debt_to_equity: Option<f64>,
    /// Operating cash flow plus capital expenditures (reported negative).
    pub free_cash_flow: Option<f64>,
    /// Operating cash flow over revenue, in percent.
    pub cash_flow_to_revenue: Option<f64>,
}

impl CalculatedMetrics {
    /// The computed metrics by name. Absent metrics are omitted.
    #[must_use]
    pub fn to_map(&self) -> BTreeMap<&'static str, f64> {
        [
            ("profit_margin", self.profit_margin),
            ("gross_margin", self.gross_margin),
            ("return_on_assets", self.return_on_assets),
            ("return_on_equity", self.return_on_equity),
            ("debt_to_equity", self.debt_to_equity),
            ("free_cash_flow", self.free_cash_flow),
            ("cash_flow_to_revenue", self.cash_flow_to_revenue),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name, v)))
        .collect()
    }

    /// Returns true if no metric could be computed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_map().is_empty()
    }
}

/// Computes ratios from the latest annual reports.
///
/// Missing or non-numeric line items count as zero, which the guards then
/// treat as an unusable denominator.
#[must_use]
pub fn calculate_metrics(
    income: &AnnualReport,
    balance: &AnnualReport,
    cash_flow: Option<&AnnualReport>,
) -> CalculatedMetrics {
    let revenue = income.value_or_zero("totalRevenue");
    let net_income = income.value_or_zero("netIncome");
    let gross_profit = income.value_or_zero("grossProfit");
    let total_assets = balance.value_or_zero("totalAssets");
    let total_liabilities = balance.value_or_zero("totalLiabilities");
    let equity = balance.value_or_zero("totalShareholderEquity");

    let mut metrics = CalculatedMetrics::default();

    if revenue > 0.0 {
        metrics.profit_margin = Some(net_income / revenue * 100.0);
        metrics.gross_margin = Some(gross_profit / revenue * 100.0);
    }
    if total_assets > 0.0 {
        metrics.return_on_assets = Some(net_income / total_assets * 100.0);
    }
    if equity > 0.0 {
        metrics.return_on_equity = Some(net_income / equity * 100.0);
        metrics.debt_to_equity = Some(total_liabilities / equity);
    }

    if let Some(cash_flow) = cash_flow {
        let operating = cash_flow.value_or_zero("operatingCashflow");
        let capex = cash_flow.value_or_zero("capitalExpenditures");
        if operating != 0.0 {
            metrics.free_cash_flow = Some(operating + capex);
            if revenue > 0.0 {
                metrics.cash_flow_to_revenue = Some(operating / revenue * 100.0);
            }
        }
    }

    metrics
}
