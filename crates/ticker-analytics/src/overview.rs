//! Company overview normalization.
//!
//! Upstream overview values are strings, `"None"` for missing data, with
//! percentages in two conventions (fractions for margins and yields, whole
//! percents for ownership). [`normalize_overview`] turns them into display
//! values that are either a formatted string or `N/A`, never a fake zero.

use serde::Serialize;
use std::collections::BTreeMap;
use ticker_core::{CompanyOverview, DisplayValue};
use tracing::debug;

use crate::format::{format_decimal, format_percent, format_whole_percent, format_with_suffix};

/// Keys of the derived fields.
pub mod keys {
    /// `PercentInsiders` as a whole percent.
    pub const INSIDER_OWNERSHIP: &str = "InsiderOwnership";
    /// `PercentInstitutions` as a whole percent.
    pub const INSTITUTIONAL_OWNERSHIP: &str = "InstitutionalOwnership";
    /// Float shares with a suffix.
    pub const FLOAT: &str = "FloatFormatted";
    /// Shares outstanding with a suffix.
    pub const SHARES_OUTSTANDING: &str = "SharesOutstandingFormatted";
    /// Market capitalization in dollars with a suffix.
    pub const MARKET_CAP: &str = "MarketCapFormatted";
    /// Enterprise value in dollars with a suffix.
    pub const ENTERPRISE_VALUE: &str = "EnterpriseValueFormatted";
    /// Current ratio, two decimals.
    pub const CURRENT_RATIO: &str = "CurrentRatioFormatted";
    /// PEG ratio, two decimals.
    pub const PEG_RATIO: &str = "PEGRatioFormatted";
    /// Forward P/E, two decimals.
    pub const FORWARD_PE: &str = "ForwardPEFormatted";
}

/// Percentage fields sent as fractions (`0.25` is 25%).
pub const FRACTION_PERCENT_FIELDS: [&str; 7] = [
    "ProfitMargin",
    "OperatingMarginTTM",
    "ReturnOnAssetsTTM",
    "ReturnOnEquityTTM",
    "DividendYield",
    "QuarterlyEarningsGrowthYOY",
    "QuarterlyRevenueGrowthYOY",
];

const MONEY_FIELDS: [(&str, &str); 5] = [
    ("MarketCapitalization", keys::MARKET_CAP),
    ("EnterpriseValue", keys::ENTERPRISE_VALUE),
    ("RevenueTTM", "RevenueTTMFormatted"),
    ("GrossProfitTTM", "GrossProfitTTMFormatted"),
    ("EBITDA", "EBITDAFormatted"),
];

const RATIO_FIELDS: [(&str, &str); 3] = [
    ("CurrentRatio", keys::CURRENT_RATIO),
    ("PEGRatio", keys::PEG_RATIO),
    ("ForwardPE", keys::FORWARD_PE),
];

/// Company overview plus derived display fields.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct NormalizedOverview {
    /// Raw upstream fields.
    pub raw: CompanyOverview,
    /// Float shares, from `SharesFloat` or estimated from insider ownership.
    pub float_shares: Option<f64>,
    formatted: BTreeMap<String, DisplayValue>,
}

impl NormalizedOverview {
    /// Display value of a field.
    ///
    /// Derived fields are looked up first, then raw fields.
    #[must_use]
    pub fn get(&self, key: &str) -> DisplayValue {
        self.formatted
            .get(key)
            .cloned()
            .unwrap_or_else(|| self.raw.text(key))
    }

    /// Derived fields only.
    #[must_use]
    pub const fn formatted(&self) -> &BTreeMap<String, DisplayValue> {
        &self.formatted
    }

    /// Raw fields with derived fields layered on top, rendered as strings.
    #[must_use]
    pub fn to_map(&self) -> BTreeMap<String, String> {
        let mut map = self.raw.fields().clone();
        for (key, value) in &self.formatted {
            map.insert(key.clone(), value.to_string());
        }
        map
    }
}

/// Normalizes a raw overview.
#[must_use]
pub fn normalize_overview(raw: &CompanyOverview) -> NormalizedOverview {
    let mut formatted = BTreeMap::new();

    formatted.insert(
        keys::INSIDER_OWNERSHIP.to_string(),
        whole_percent(raw.get("PercentInsiders")),
    );
    formatted.insert(
        keys::INSTITUTIONAL_OWNERSHIP.to_string(),
        whole_percent(raw.get("PercentInstitutions")),
    );

    let float_shares = float_shares(raw);
    formatted.insert(
        keys::FLOAT.to_string(),
        float_shares.map_or(DisplayValue::NotAvailable, |v| {
            DisplayValue::new(format_with_suffix(v, ""))
        }),
    );
    formatted.insert(
        keys::SHARES_OUTSTANDING.to_string(),
        suffixed(raw.number("SharesOutstanding"), ""),
    );

    for (field, key) in MONEY_FIELDS {
        formatted.insert(key.to_string(), suffixed(raw.number(field), "$"));
    }
    for (field, key) in RATIO_FIELDS {
        formatted.insert(
            key.to_string(),
            raw.number(field)
                .map_or(DisplayValue::NotAvailable, |v| DisplayValue::new(format_decimal(v))),
        );
    }
    for field in FRACTION_PERCENT_FIELDS {
        formatted.insert(format!("{field}Formatted"), fraction_percent(raw.get(field)));
    }

    debug!(
        symbol = raw.get("Symbol").unwrap_or_default(),
        fields = raw.len(),
        "Normalized company overview"
    );

    NormalizedOverview {
        raw: raw.clone(),
        float_shares,
        formatted,
    }
}

/// Float shares: `SharesFloat` when numeric, else `SharesOutstanding` less insider holdings.
#[must_use]
pub fn float_shares(raw: &CompanyOverview) -> Option<f64> {
    raw.number("SharesFloat").or_else(|| {
        let outstanding = raw.number("SharesOutstanding")?;
        let insiders = raw.number("PercentInsiders")?;
        Some(outstanding * (1.0 - insiders / 100.0))
    })
}

fn suffixed(value: Option<f64>, prefix: &str) -> DisplayValue {
    value.map_or(DisplayValue::NotAvailable, |v| {
        DisplayValue::new(format_with_suffix(v, prefix))
    })
}

fn whole_percent(raw: Option<&str>) -> DisplayValue {
    percent_with(raw, format_whole_percent)
}

fn fraction_percent(raw: Option<&str>) -> DisplayValue {
    percent_with(raw, format_percent)
}

fn percent_with(raw: Option<&str>, format: fn(f64) -> String) -> DisplayValue {
    let Some(raw) = raw.map(str::trim) else {
        return DisplayValue::NotAvailable;
    };
    if raw.ends_with('%') {
        return DisplayValue::new(raw);
    }
    ticker_core::parse_number(raw).map_or(DisplayValue::NotAvailable, |v| DisplayValue::new(format(v)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overview(pairs: &[(&str, &str)]) -> CompanyOverview {
        CompanyOverview::new(
            pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_ownership() {
        let normalized = normalize_overview(&overview(&[
            ("PercentInsiders", "15"),
            ("PercentInstitutions", "None"),
        ]));
        assert_eq!(normalized.get(keys::INSIDER_OWNERSHIP), DisplayValue::new("15.00%"));
        assert_eq!(normalized.get(keys::INSTITUTIONAL_OWNERSHIP), DisplayValue::NotAvailable);
        assert_eq!(normalized.get(keys::INSTITUTIONAL_OWNERSHIP).to_string(), "N/A");

        let passthrough = normalize_overview(&overview(&[("PercentInsiders", "3.5%")]));
        assert_eq!(passthrough.get(keys::INSIDER_OWNERSHIP), DisplayValue::new("3.5%"));
    }

    #[test]
    fn test_float_shares() {
        let estimated = overview(&[("SharesOutstanding", "100000000"), ("PercentInsiders", "15")]);
        assert_eq!(float_shares(&estimated), Some(85_000_000.0));
        assert_eq!(
            normalize_overview(&estimated).get(keys::FLOAT),
            DisplayValue::new("85.00M")
        );

        let reported = overview(&[
            ("SharesFloat", "90000000"),
            ("SharesOutstanding", "100000000"),
            ("PercentInsiders", "15"),
        ]);
        assert_eq!(float_shares(&reported), Some(90_000_000.0));

        let missing = overview(&[("SharesFloat", "None"), ("SharesOutstanding", "100")]);
        assert_eq!(float_shares(&missing), None);
        assert_eq!(normalize_overview(&missing).get(keys::FLOAT), DisplayValue::NotAvailable);
    }

    #[test]
    fn test_money_and_ratios() {
        let normalized = normalize_overview(&overview(&[
            ("MarketCapitalization", "1234000000"),
            ("PEGRatio", "1.456"),
            ("ForwardPE", "-"),
            ("CurrentRatio", "abc"),
        ]));
        assert_eq!(normalized.get(keys::MARKET_CAP), DisplayValue::new("$1.23B"));
        assert_eq!(normalized.get(keys::PEG_RATIO), DisplayValue::new("1.46"));
        assert_eq!(normalized.get(keys::FORWARD_PE), DisplayValue::NotAvailable);
        assert_eq!(normalized.get(keys::CURRENT_RATIO), DisplayValue::NotAvailable);
        assert_eq!(normalized.get(keys::ENTERPRISE_VALUE), DisplayValue::NotAvailable);
    }

    #[test]
    fn test_fraction_percentages() {
        let normalized = normalize_overview(&overview(&[
            ("ProfitMargin", "0.246"),
            ("DividendYield", "None"),
            ("ReturnOnEquityTTM", "1.47"),
            ("OperatingMarginTTM", "30%"),
        ]));
        assert_eq!(normalized.get("ProfitMarginFormatted"), DisplayValue::new("24.60%"));
        assert_eq!(normalized.get("DividendYieldFormatted"), DisplayValue::NotAvailable);
        assert_eq!(normalized.get("ReturnOnEquityTTMFormatted"), DisplayValue::new("1.47%"));
        assert_eq!(normalized.get("OperatingMarginTTMFormatted"), DisplayValue::new("30%"));
    }

    #[test]
    fn test_to_map_layers_derived_fields() {
        let normalized = normalize_overview(&overview(&[
            ("Symbol", "IBM"),
            ("Name", "International Business Machines"),
            ("MarketCapitalization", "None"),
        ]));
        let map = normalized.to_map();
        assert_eq!(map["Symbol"], "IBM");
        assert_eq!(map["MarketCapitalization"], "None");
        assert_eq!(map[keys::MARKET_CAP], "N/A");
        assert_eq!(normalized.get("Name"), DisplayValue::new("International Business Machines"));
        assert_eq!(normalized.get("Sector"), DisplayValue::NotAvailable);
    }
}
