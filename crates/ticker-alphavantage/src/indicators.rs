//! Server-side technical indicators (BBANDS, STOCHRSI, STOCHF, APO).

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::Value;
use ticker_core::{
    ApiFunction, ApiQuery, DataError, DataFrequency, IndicatorSeries, Result, Symbol, columns,
};
use tracing::debug;

use crate::client::AlphaVantageClient;

/// An indicator series computed by the API and merged onto the time series.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExternalIndicator {
    /// Bollinger bands, 20 periods on close.
    Bbands,
    /// Stochastic RSI, 14 periods on close, %K 5, %D 3, SMA smoothing.
    StochRsi,
    /// Fast stochastic, %K 5, %D 3, SMA smoothing.
    StochFast,
    /// Absolute price oscillator, 12/26 on close, EMA.
    Apo,
}

impl ExternalIndicator {
    /// Every indicator, in merge order.
    pub const ALL: [Self; 4] = [Self::Bbands, Self::StochRsi, Self::StochFast, Self::Apo];

    /// Upstream function.
    #[must_use]
    pub const fn function(&self) -> ApiFunction {
        match self {
            Self::Bbands => ApiFunction::Bbands,
            Self::StochRsi => ApiFunction::StochRsi,
            Self::StochFast => ApiFunction::StochFast,
            Self::Apo => ApiFunction::Apo,
        }
    }

    /// Request for `symbol` on the bars of `frequency`, with the fixed
    /// parameters of this indicator.
    #[must_use]
    pub fn query(&self, symbol: &Symbol, frequency: DataFrequency) -> ApiQuery {
        let query = ApiQuery::new(self.function(), symbol.clone())
            .param("interval", frequency.indicator_interval());
        match self {
            Self::Bbands => query.param("time_period", "20").param("series_type", "close"),
            Self::StochRsi => query
                .param("time_period", "14")
                .param("series_type", "close")
                .param("fastkperiod", "5")
                .param("fastdperiod", "3")
                .param("fastdmatype", "0"),
            Self::StochFast => query
                .param("fastkperiod", "5")
                .param("fastdperiod", "3")
                .param("fastdmatype", "0"),
            Self::Apo => query
                .param("series_type", "close")
                .param("fastperiod", "12")
                .param("slowperiod", "26")
                .param("matype", "1"),
        }
    }

    /// Upstream value labels and the column each maps to.
    #[must_use]
    pub const fn labels(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::Bbands => &[
                ("Real Upper Band", columns::BB_UPPER),
                ("Real Middle Band", columns::BB_MIDDLE),
                ("Real Lower Band", columns::BB_LOWER),
            ],
            Self::StochRsi => &[
                ("FastK", columns::STOCH_RSI_FASTK),
                ("FastD", columns::STOCH_RSI_FASTD),
            ],
            Self::StochFast => &[
                ("FastK", columns::STOCH_FASTK),
                ("FastD", columns::STOCH_FASTD),
            ],
            Self::Apo => &[("APO", columns::APO)],
        }
    }
}

impl AlphaVantageClient {
    /// Fetches one indicator series computed on the bars of `frequency`.
    ///
    /// # Errors
    /// Returns the transport error, or [`DataError::Shape`] if the body has no
    /// `Technical Analysis: <FUNCTION>` table.
    pub async fn fetch_indicator(
        &self,
        symbol: &Symbol,
        indicator: ExternalIndicator,
        frequency: DataFrequency,
    ) -> Result<IndicatorSeries> {
        let body = self.get(indicator.query(symbol, frequency)).await?;
        let series = parse_indicator(&body, indicator)?;
        debug!(
            %symbol,
            function = %indicator.function(),
            interval = frequency.indicator_interval(),
            rows = series.len(),
            "Fetched indicator"
        );
        Ok(series)
    }
}

/// Parses an indicator body into a timestamp-keyed table.
///
/// Unparseable values are absent; rows with an unparseable timestamp are dropped.
///
/// # Errors
/// Returns [`DataError::Shape`] if the table is missing or empty.
pub fn parse_indicator(body: &Value, indicator: ExternalIndicator) -> Result<IndicatorSeries> {
    let key = format!("Technical Analysis: {}", indicator.function());
    let table = body
        .get(&key)
        .and_then(Value::as_object)
        .filter(|table| !table.is_empty())
        .ok_or_else(|| DataError::Shape(format!("missing {key}")))?;

    let labels = indicator.labels();
    let column_names: Vec<&str> = labels.iter().map(|(_, column)| *column).collect();
    let mut series = IndicatorSeries::new(&column_names);

    for (stamp, values) in table {
        let Some(timestamp) = parse_timestamp(stamp) else {
            continue;
        };
        let row = labels
            .iter()
            .map(|(label, _)| values.get(*label).and_then(value_number))
            .collect();
        series.rows.insert(timestamp, row);
    }

    Ok(series)
}

/// Date part of `YYYY-MM-DD` or `YYYY-MM-DD HH:MM[:SS]`.
pub(crate) fn parse_date(raw: &str) -> Option<NaiveDate> {
    let date = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// `YYYY-MM-DD HH:MM[:SS]`, or `YYYY-MM-DD` at midnight.
pub(crate) fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}

/// Number from a JSON string or number.
pub(crate) fn value_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => ticker_core::parse_number(s),
        _ => None,
    }
}
