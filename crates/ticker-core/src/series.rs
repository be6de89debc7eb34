//! Time-indexed price table with derived indicator columns.
//!
//! [`PriceSeries`] holds ascending, de-duplicated OHLCV bars and any number of
//! derived columns aligned to them. [`IndicatorSeries`] is a separately indexed
//! table (one fetched indicator) that is merged onto a price series with
//! [`PriceSeries::join_left`].

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use polars::prelude::*;
use std::collections::BTreeMap;

use crate::{
    error::{DataError, Result},
    types::OhlcvBar,
};

/// Canonical column names.
pub mod columns {
    /// 20-row moving average of close.
    pub const MA20: &str = "MA20";
    /// 50-row moving average of close.
    pub const MA50: &str = "MA50";
    /// 200-row moving average of close.
    pub const MA200: &str = "MA200";
    /// Percent change of close.
    pub const DAILY_RETURN: &str = "daily_return";
    /// 20-row mean volume.
    pub const AVG_VOLUME: &str = "avg_volume";
    /// Volume over its 20-row mean.
    pub const RELATIVE_VOLUME: &str = "relative_volume";
    /// 20-row sample standard deviation of close.
    pub const MA20_STD: &str = "MA20_std";
    /// Upper Bollinger band.
    pub const UPPER_BAND: &str = "upper_band";
    /// Lower Bollinger band.
    pub const LOWER_BAND: &str = "lower_band";
    /// 14-row RSI.
    pub const RSI: &str = "RSI";
    /// MACD line.
    pub const MACD: &str = "MACD";
    /// MACD signal line.
    pub const MACD_SIGNAL: &str = "MACD_signal";
    /// MACD histogram.
    pub const MACD_HIST: &str = "MACD_hist";
    /// 14-row average true range.
    pub const ATR: &str = "ATR";
    /// On-balance volume.
    pub const OBV: &str = "OBV";
    /// Fetched upper Bollinger band.
    pub const BB_UPPER: &str = "bb_upper";
    /// Fetched middle Bollinger band.
    pub const BB_MIDDLE: &str = "bb_middle";
    /// Fetched lower Bollinger band.
    pub const BB_LOWER: &str = "bb_lower";
    /// Fetched stochastic RSI %K.
    pub const STOCH_RSI_FASTK: &str = "stoch_rsi_fastk";
    /// Fetched stochastic RSI %D.
    pub const STOCH_RSI_FASTD: &str = "stoch_rsi_fastd";
    /// Fetched fast stochastic %K.
    pub const STOCH_FASTK: &str = "stoch_fastk";
    /// Fetched fast stochastic %D.
    pub const STOCH_FASTD: &str = "stoch_fastd";
    /// Fetched absolute price oscillator.
    pub const APO: &str = "apo";
}

/// A derived numeric column aligned to the bars of a [`PriceSeries`].
#[derive(Clone, Debug, PartialEq)]
pub struct DerivedColumn {
    /// Column name.
    pub name: String,
    /// One value per bar; `None` where the value is undefined.
    pub values: Vec<Option<f64>>,
}

/// OHLCV bars sorted ascending by timestamp, plus derived columns.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PriceSeries {
    bars: Vec<OhlcvBar>,
    derived: Vec<DerivedColumn>,
}

impl PriceSeries {
    /// Creates a series from bars in any order.
    ///
    /// Bars are sorted ascending by timestamp; when a timestamp repeats, the
    /// last bar wins. Several intraday bars of one date are all kept.
    #[must_use]
    pub fn new(bars: Vec<OhlcvBar>) -> Self {
        let by_time: BTreeMap<NaiveDateTime, OhlcvBar> =
            bars.into_iter().map(|bar| (bar.timestamp, bar)).collect();
        Self {
            bars: by_time.into_values().collect(),
            derived: Vec::new(),
        }
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Returns true if there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// The bars, ascending by timestamp.
    #[must_use]
    pub fn bars(&self) -> &[OhlcvBar] {
        &self.bars
    }

    /// The most recent bar.
    #[must_use]
    pub fn last_bar(&self) -> Option<&OhlcvBar> {
        self.bars.last()
    }

    /// Close prices, ascending by timestamp.
    #[must_use]
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Volumes as floats, ascending by timestamp.
    #[must_use]
    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume as f64).collect()
    }

    /// Names of the derived columns, in insertion order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.derived.iter().map(|c| c.name.as_str())
    }

    /// Values of a derived column.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.derived
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    /// Value of a derived column on the last row.
    #[must_use]
    pub fn last_value(&self, name: &str) -> Option<f64> {
        self.column(name).and_then(|values| values.last().copied().flatten())
    }

    /// Adds or replaces a derived column.
    ///
    /// # Errors
    /// Returns [`DataError::InvalidParameter`] if the column length does not match.
    pub fn set_column(&mut self, name: impl Into<String>, values: Vec<Option<f64>>) -> Result<()> {
        let name = name.into();
        if values.len() != self.bars.len() {
            return Err(DataError::InvalidParameter(format!(
                "column {name} has {} values for {} rows",
                values.len(),
                self.bars.len()
            )));
        }
        match self.derived.iter_mut().find(|c| c.name == name) {
            Some(existing) => existing.values = values,
            None => self.derived.push(DerivedColumn { name, values }),
        }
        Ok(())
    }

    /// Left-joins an indicator table on timestamp.
    ///
    /// Every row of this series is kept. Indicator columns take the value from
    /// the matching timestamp, or stay absent when the indicator has none.
    /// Indicator rows with no matching bar are dropped.
    pub fn join_left(&mut self, indicator: &IndicatorSeries) {
        for (idx, name) in indicator.columns.iter().enumerate() {
            let values = self
                .bars
                .iter()
                .map(|bar| {
                    indicator
                        .rows
                        .get(&bar.timestamp)
                        .and_then(|row| row.get(idx).copied().flatten())
                })
                .collect();
            // Lengths match by construction.
            let _ = self.set_column(name.clone(), values);
        }
    }

    /// Exports the series as a DataFrame.
    ///
    /// Columns: `date`, `open`, `high`, `low`, `close`, `volume`, then every
    /// derived column in insertion order. `date` is a Date when every bar sits
    /// at midnight, otherwise a millisecond Datetime.
    ///
    /// # Errors
    /// Returns [`DataError::Other`] if polars rejects the frame.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)
            .ok_or_else(|| DataError::Other("invalid epoch".to_string()))?;

        let date_col = if self.bars.iter().all(|b| b.timestamp.time() == NaiveTime::MIN) {
            let days: Vec<i32> = self
                .bars
                .iter()
                .map(|b| (b.date() - epoch).num_days() as i32)
                .collect();
            Column::new("date".into(), days).cast(&DataType::Date)
        } else {
            let epoch = epoch.and_time(NaiveTime::MIN);
            let millis: Vec<i64> = self
                .bars
                .iter()
                .map(|b| (b.timestamp - epoch).num_milliseconds())
                .collect();
            Column::new("date".into(), millis)
                .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
        }
        .map_err(|e| DataError::Other(e.to_string()))?;

        let mut frame_columns = vec![
            date_col,
            Column::new("open".into(), self.bars.iter().map(|b| b.open).collect::<Vec<f64>>()),
            Column::new("high".into(), self.bars.iter().map(|b| b.high).collect::<Vec<f64>>()),
            Column::new("low".into(), self.bars.iter().map(|b| b.low).collect::<Vec<f64>>()),
            Column::new("close".into(), self.closes()),
            Column::new("volume".into(), self.bars.iter().map(|b| b.volume).collect::<Vec<u64>>()),
        ];
        for derived in &self.derived {
            frame_columns.push(Column::new(derived.name.as_str().into(), derived.values.clone()));
        }

        DataFrame::new(frame_columns).map_err(|e| DataError::Other(e.to_string()))
    }
}

/// A fetched indicator table keyed by timestamp.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IndicatorSeries {
    /// Canonical column names, in the order values are stored in each row.
    pub columns: Vec<String>,
    /// One row of values per timestamp; daily rows sit at midnight.
    pub rows: BTreeMap<NaiveDateTime, Vec<Option<f64>>>,
}

impl IndicatorSeries {
    /// Creates an empty table with the given columns.
    #[must_use]
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| (*c).to_string()).collect(),
            rows: BTreeMap::new(),
        }
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
