//! Time series granularity and output size definitions.
//!
//! [`DataFrequency`] selects which time-series function is requested upstream,
//! and with it the name of the key the series arrives under.
//! [`OutputSize`] selects between the latest 100 bars and the full history.

use serde::{Deserialize, Serialize};

/// Frequency/granularity of a time series request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataFrequency {
    /// One-minute bars.
    Minute,
    /// Five-minute bars.
    FiveMinute,
    /// Fifteen-minute bars.
    FifteenMinute,
    /// Thirty-minute bars.
    ThirtyMinute,
    /// Hourly bars.
    Hourly,
    /// Daily bars.
    #[default]
    Daily,
    /// Daily bars with split/dividend adjusted close.
    DailyAdjusted,
    /// Weekly bars.
    Weekly,
    /// Monthly bars.
    Monthly,
}

impl DataFrequency {
    /// Returns true if this is an intraday frequency.
    #[must_use]
    pub const fn is_intraday(&self) -> bool {
        matches!(
            self,
            Self::Minute | Self::FiveMinute | Self::FifteenMinute | Self::ThirtyMinute | Self::Hourly
        )
    }

    /// Upstream `function` parameter for this frequency.
    #[must_use]
    pub const fn function(&self) -> &'static str {
        match self {
            Self::Minute
            | Self::FiveMinute
            | Self::FifteenMinute
            | Self::ThirtyMinute
            | Self::Hourly => "TIME_SERIES_INTRADAY",
            Self::Daily => "TIME_SERIES_DAILY",
            Self::DailyAdjusted => "TIME_SERIES_DAILY_ADJUSTED",
            Self::Weekly => "TIME_SERIES_WEEKLY",
            Self::Monthly => "TIME_SERIES_MONTHLY",
        }
    }

    /// Upstream `interval` parameter, only meaningful for intraday requests.
    #[must_use]
    pub const fn interval(&self) -> Option<&'static str> {
        match self {
            Self::Minute => Some("1min"),
            Self::FiveMinute => Some("5min"),
            Self::FifteenMinute => Some("15min"),
            Self::ThirtyMinute => Some("30min"),
            Self::Hourly => Some("60min"),
            _ => None,
        }
    }

    /// Upstream `interval` parameter for indicator requests on this granularity.
    #[must_use]
    pub const fn indicator_interval(&self) -> &'static str {
        match self {
            Self::Minute => "1min",
            Self::FiveMinute => "5min",
            Self::FifteenMinute => "15min",
            Self::ThirtyMinute => "30min",
            Self::Hourly => "60min",
            Self::Daily | Self::DailyAdjusted => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }
}

/// How much history a time series request returns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputSize {
    /// The latest 100 data points.
    Compact,
    /// The full available history.
    #[default]
    Full,
}

impl OutputSize {
    /// Upstream `outputsize` parameter value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Compact => "compact",
            Self::Full => "full",
        }
    }
}
