//! Quote, volume and valuation figures assembled from already-fetched resources.

use serde::Serialize;
use ticker_core::{DisplayValue, GlobalQuote, PriceSeries};

use crate::{
    format::{format_decimal, format_thousands},
    overview::{NormalizedOverview, keys},
    technical::SHORT_WINDOW,
};

/// Display-ready supplementary figures. Every field defaults to `N/A`.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SupplementaryData {
    /// Float shares with a suffix.
    pub float: DisplayValue,
    /// Short interest as a percent of float.
    pub short_float: DisplayValue,
    /// 52-week high in dollars.
    #[serde(rename = "52_week_high")]
    pub week_52_high: DisplayValue,
    /// 52-week low in dollars.
    #[serde(rename = "52_week_low")]
    pub week_52_low: DisplayValue,
    /// PEG ratio.
    pub peg_ratio: DisplayValue,
    /// Forward P/E.
    pub forward_pe: DisplayValue,
    /// Trailing operating margin.
    pub operating_margin: DisplayValue,
    /// Trailing revenue per share in dollars.
    pub revenue_per_share: DisplayValue,
    /// Enterprise value in dollars with a suffix.
    pub enterprise_value: DisplayValue,
    /// Current ratio.
    pub current_ratio: DisplayValue,
    /// Volume of the latest session, with thousands separators.
    pub current_volume: DisplayValue,
    /// Mean volume over the last 20 bars, with thousands separators.
    pub average_volume: DisplayValue,
    /// Current volume over average volume (`"1.15x"`).
    pub relative_volume: DisplayValue,
}

impl SupplementaryData {
    /// Derives the figures from whatever resources were fetched.
    #[must_use]
    pub fn derive(
        overview: Option<&NormalizedOverview>,
        quote: Option<&GlobalQuote>,
        series: Option<&PriceSeries>,
    ) -> Self {
        let mut data = Self::default();

        if let Some(overview) = overview {
            data.float = overview.get(keys::FLOAT);
            data.short_float = overview
                .raw
                .number("ShortPercentFloat")
                .map_or(DisplayValue::NotAvailable, |v| {
                    DisplayValue::new(format!("{:.2}%", v * 100.0))
                });
            data.week_52_high = dollars(overview.raw.number("52WeekHigh"));
            data.week_52_low = dollars(overview.raw.number("52WeekLow"));
            data.peg_ratio = overview.get(keys::PEG_RATIO);
            data.forward_pe = overview.get(keys::FORWARD_PE);
            data.operating_margin = overview.get("OperatingMarginTTMFormatted");
            data.revenue_per_share = dollars(overview.raw.number("RevenuePerShareTTM"));
            data.enterprise_value = overview.get(keys::ENTERPRISE_VALUE);
            data.current_ratio = overview.get(keys::CURRENT_RATIO);
        }

        if let Some(volume) = quote.and_then(|q| q.volume) {
            let volume = volume as f64;
            data.current_volume = DisplayValue::new(format_thousands(volume));

            if let Some(average) = series.and_then(average_volume) {
                data.average_volume = DisplayValue::new(format_thousands(average));
                if average > 0.0 {
                    data.relative_volume = DisplayValue::new(format!("{:.2}x", volume / average));
                }
            }
        }

        data
    }
}

/// Mean volume of the last 20 bars, absent for shorter series.
fn average_volume(series: &PriceSeries) -> Option<f64> {
    let volumes = series.volumes();
    if volumes.len() < SHORT_WINDOW {
        return None;
    }
    let tail = &volumes[volumes.len() - SHORT_WINDOW..];
    Some(tail.iter().sum::<f64>() / SHORT_WINDOW as f64)
}

fn dollars(value: Option<f64>) -> DisplayValue {
    value.map_or(DisplayValue::NotAvailable, |v| {
        DisplayValue::new(format!("${}", format_decimal(v)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overview::normalize_overview;
    use chrono::{Days, NaiveDate};
    use ticker_core::{CompanyOverview, OhlcvBar};

    fn series(volumes: &[u64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        PriceSeries::new(
            volumes
                .iter()
                .enumerate()
                .map(|(i, &v)| {
                    let date = start.checked_add_days(Days::new(i as u64)).unwrap();
                    OhlcvBar::new(date, 1.0, 1.0, 1.0, 1.0, v)
                })
                .collect(),
        )
    }

    #[test]
    fn test_everything_missing() {
        let data = SupplementaryData::derive(None, None, None);
        assert_eq!(data, SupplementaryData::default());
        assert_eq!(data.relative_volume.to_string(), "N/A");
    }

    #[test]
    fn test_volume_figures() {
        let quote = GlobalQuote {
            volume: Some(5_500_000),
            ..GlobalQuote::default()
        };
        let mut volumes = vec![1u64; 5];
        volumes.extend(std::iter::repeat_n(5_000_000u64, 20));
        let data = SupplementaryData::derive(None, Some(&quote), Some(&series(&volumes)));

        assert_eq!(data.current_volume, DisplayValue::new("5,500,000"));
        assert_eq!(data.average_volume, DisplayValue::new("5,000,000"));
        assert_eq!(data.relative_volume, DisplayValue::new("1.10x"));

        let short = SupplementaryData::derive(None, Some(&quote), Some(&series(&[10, 20])));
        assert_eq!(short.current_volume, DisplayValue::new("5,500,000"));
        assert_eq!(short.average_volume, DisplayValue::NotAvailable);
    }

    #[test]
    fn test_overview_figures() {
        let raw = CompanyOverview::new(
            [
                ("ShortPercentFloat", "0.0235"),
                ("52WeekHigh", "180.75"),
                ("52WeekLow", "None"),
                ("SharesFloat", "85000000"),
                ("PEGRatio", "1.5"),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        );
        let overview = normalize_overview(&raw);
        let data = SupplementaryData::derive(Some(&overview), None, None);

        assert_eq!(data.short_float, DisplayValue::new("2.35%"));
        assert_eq!(data.week_52_high, DisplayValue::new("$180.75"));
        assert_eq!(data.week_52_low, DisplayValue::NotAvailable);
        assert_eq!(data.float, DisplayValue::new("85.00M"));
        assert_eq!(data.peg_ratio, DisplayValue::new("1.50"));
        assert_eq!(data.current_volume, DisplayValue::NotAvailable);
    }
}
