//! Technical indicators computed from an ascending OHLCV series.
//!
//! Every function returns one value per input row. Rows where the indicator is
//! undefined (incomplete window, missing previous close, zero denominator) are
//! `None`.

use ticker_core::{PriceSeries, Result, columns};
use tracing::debug;

/// Window of the short moving average, the Bollinger bands and average volume.
pub const SHORT_WINDOW: usize = 20;
/// Window of the medium moving average.
pub const MEDIUM_WINDOW: usize = 50;
/// Window of the long moving average.
pub const LONG_WINDOW: usize = 200;
/// Window of RSI and ATR.
pub const OSCILLATOR_WINDOW: usize = 14;
/// Bollinger band width in standard deviations.
pub const BAND_WIDTH: f64 = 2.0;

/// Trailing mean over `window` rows.
///
/// Undefined for the first `window - 1` rows and wherever the window holds an
/// undefined value.
#[must_use]
pub fn rolling_mean(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| {
            let slice = trailing(values, i, window)?;
            let sum = slice.iter().try_fold(0.0, |acc, v| v.map(|x| acc + x))?;
            Some(sum / window as f64)
        })
        .collect()
}

/// Trailing sample standard deviation (n - 1 denominator) over `window` rows.
#[must_use]
pub fn rolling_std(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| {
            if window < 2 {
                return None;
            }
            let slice: Vec<f64> = trailing(values, i, window)?
                .iter()
                .copied()
                .collect::<Option<Vec<f64>>>()?;
            let mean = slice.iter().sum::<f64>() / window as f64;
            let variance =
                slice.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (window - 1) as f64;
            Some(variance.sqrt())
        })
        .collect()
}

fn trailing(values: &[Option<f64>], i: usize, window: usize) -> Option<&[Option<f64>]> {
    if window == 0 || i + 1 < window {
        return None;
    }
    Some(&values[i + 1 - window..=i])
}

/// Simple moving average of a fully-defined series.
#[must_use]
pub fn sma(data: &[f64], period: usize) -> Vec<Option<f64>> {
    let values: Vec<Option<f64>> = data.iter().copied().map(Some).collect();
    rolling_mean(&values, period)
}

/// Exponential moving average with `alpha = 2 / (span + 1)`, seeded with the
/// first value and without bias adjustment.
#[must_use]
pub fn ema(data: &[f64], span: usize) -> Vec<f64> {
    let alpha = 2.0 / (span as f64 + 1.0);
    let mut result = Vec::with_capacity(data.len());
    for (i, &value) in data.iter().enumerate() {
        let next = if i == 0 {
            value
        } else {
            alpha * value + (1.0 - alpha) * result[i - 1]
        };
        result.push(next);
    }
    result
}

/// Percent change from the previous row, times 100.
#[must_use]
pub fn daily_return(closes: &[f64]) -> Vec<Option<f64>> {
    (0..closes.len())
        .map(|i| {
            if i == 0 || closes[i - 1] == 0.0 {
                return None;
            }
            Some((closes[i] / closes[i - 1] - 1.0) * 100.0)
        })
        .collect()
}

/// Volume over its trailing average; undefined where the average is undefined or zero.
#[must_use]
pub fn relative_volume(volumes: &[f64], avg_volume: &[Option<f64>]) -> Vec<Option<f64>> {
    volumes
        .iter()
        .zip(avg_volume)
        .map(|(volume, avg)| match avg {
            Some(avg) if *avg != 0.0 => Some(volume / avg),
            _ => None,
        })
        .collect()
}

/// Relative Strength Index over `period` rows, using simple rolling means of
/// gains and losses.
///
/// The first row has no previous close; its gain and loss count as zero, so
/// the first defined value is at row `period - 1`. A zero loss average is not
/// clamped: the division yields an infinite RS (RSI 100) or, when the gain
/// average is also zero, NaN.
#[must_use]
pub fn rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut gains = Vec::with_capacity(closes.len());
    let mut losses = Vec::with_capacity(closes.len());
    for i in 0..closes.len() {
        let delta = if i == 0 { 0.0 } else { closes[i] - closes[i - 1] };
        gains.push(Some(delta.max(0.0)));
        losses.push(Some((-delta).max(0.0)));
    }

    let avg_gain = rolling_mean(&gains, period);
    let avg_loss = rolling_mean(&losses, period);

    avg_gain
        .into_iter()
        .zip(avg_loss)
        .map(|(gain, loss)| {
            let rs = gain? / loss?;
            Some(100.0 - 100.0 / (1.0 + rs))
        })
        .collect()
}

/// MACD line, signal line and histogram.
#[derive(Clone, Debug, PartialEq)]
pub struct MacdResult {
    /// Fast EMA minus slow EMA.
    pub macd_line: Vec<f64>,
    /// EMA of the MACD line.
    pub signal_line: Vec<f64>,
    /// MACD line minus signal line.
    pub histogram: Vec<f64>,
}

/// MACD (Moving Average Convergence Divergence).
#[must_use]
pub fn macd(closes: &[f64], fast_span: usize, slow_span: usize, signal_span: usize) -> MacdResult {
    let fast = ema(closes, fast_span);
    let slow = ema(closes, slow_span);
    let macd_line: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
    let signal_line = ema(&macd_line, signal_span);
    let histogram = macd_line
        .iter()
        .zip(&signal_line)
        .map(|(m, s)| m - s)
        .collect();

    MacdResult {
        macd_line,
        signal_line,
        histogram,
    }
}

/// True range per row. The first row has no previous close and uses high - low.
#[must_use]
pub fn true_range(highs: &[f64], lows: &[f64], closes: &[f64]) -> Vec<f64> {
    (0..closes.len())
        .map(|i| {
            let high_low = highs[i] - lows[i];
            if i == 0 {
                return high_low;
            }
            let prev_close = closes[i - 1];
            high_low
                .max((highs[i] - prev_close).abs())
                .max((lows[i] - prev_close).abs())
        })
        .collect()
}

/// Average True Range over `period` rows.
#[must_use]
pub fn atr(highs: &[f64], lows: &[f64], closes: &[f64], period: usize) -> Vec<Option<f64>> {
    sma(&true_range(highs, lows, closes), period)
}

/// On-Balance Volume, starting at zero on the first row.
#[must_use]
pub fn obv(closes: &[f64], volumes: &[f64]) -> Vec<f64> {
    let mut result = Vec::with_capacity(closes.len());
    let mut running = 0.0;
    for i in 0..closes.len() {
        if i > 0 {
            let change = closes[i] - closes[i - 1];
            if change > 0.0 {
                running += volumes[i];
            } else if change < 0.0 {
                running -= volumes[i];
            }
        }
        result.push(running);
    }
    result
}

/// Adds every derived column to a series.
///
/// Columns added: `MA20`, `MA50`, `MA200`, `avg_volume`, `relative_volume`,
/// `daily_return`, `MA20_std`, `upper_band`, `lower_band`, `RSI`, `MACD`,
/// `MACD_signal`, `MACD_hist`, `ATR`, `OBV`.
///
/// # Errors
/// Only fails if a computed column does not match the series length.
pub fn add_technical_indicators(series: &mut PriceSeries) -> Result<()> {
    let closes = series.closes();
    let volumes = series.volumes();
    let highs: Vec<f64> = series.bars().iter().map(|b| b.high).collect();
    let lows: Vec<f64> = series.bars().iter().map(|b| b.low).collect();

    let ma20 = sma(&closes, SHORT_WINDOW);
    let std20 = rolling_std(
        &closes.iter().copied().map(Some).collect::<Vec<_>>(),
        SHORT_WINDOW,
    );
    let upper: Vec<Option<f64>> = ma20
        .iter()
        .zip(&std20)
        .map(|(m, s)| Some(m.as_ref()? + BAND_WIDTH * s.as_ref()?))
        .collect();
    let lower: Vec<Option<f64>> = ma20
        .iter()
        .zip(&std20)
        .map(|(m, s)| Some(m.as_ref()? - BAND_WIDTH * s.as_ref()?))
        .collect();

    let avg_volume = sma(&volumes, SHORT_WINDOW);
    let rel_volume = relative_volume(&volumes, &avg_volume);
    let macd = macd(&closes, 12, 26, 9);

    series.set_column(columns::MA20, ma20)?;
    series.set_column(columns::MA50, sma(&closes, MEDIUM_WINDOW))?;
    series.set_column(columns::MA200, sma(&closes, LONG_WINDOW))?;
    series.set_column(columns::AVG_VOLUME, avg_volume)?;
    series.set_column(columns::RELATIVE_VOLUME, rel_volume)?;
    series.set_column(columns::DAILY_RETURN, daily_return(&closes))?;
    series.set_column(columns::MA20_STD, std20)?;
    series.set_column(columns::UPPER_BAND, upper)?;
    series.set_column(columns::LOWER_BAND, lower)?;
    series.set_column(columns::RSI, rsi(&closes, OSCILLATOR_WINDOW))?;
    series.set_column(columns::MACD, defined(macd.macd_line))?;
    series.set_column(columns::MACD_SIGNAL, defined(macd.signal_line))?;
    series.set_column(columns::MACD_HIST, defined(macd.histogram))?;
    series.set_column(
        columns::ATR,
        atr(&highs, &lows, &closes, OSCILLATOR_WINDOW),
    )?;
    series.set_column(columns::OBV, defined(obv(&closes, &volumes)))?;

    debug!(rows = series.len(), "Added technical indicators");
    Ok(())
}

fn defined(values: Vec<f64>) -> Vec<Option<f64>> {
    values.into_iter().map(Some).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Days, NaiveDate};
    use ticker_core::OhlcvBar;

    fn make_series(closes: &[f64], volumes: &[u64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        let bars = closes
            .iter()
            .zip(volumes)
            .enumerate()
            .map(|(i, (&close, &volume))| {
                let date = start.checked_add_days(Days::new(i as u64)).unwrap();
                OhlcvBar::new(date, close, close + 1.0, close - 1.0, close, volume)
            })
            .collect();
        PriceSeries::new(bars)
    }

    #[test]
    fn test_ma200_window() {
        let closes: Vec<f64> = (0..260).map(|i| 100.0 + (i as f64 * 0.37).sin() * 5.0).collect();
        let volumes = vec![1_000u64; closes.len()];
        let mut series = make_series(&closes, &volumes);
        add_technical_indicators(&mut series).unwrap();

        let ma200 = series.column(columns::MA200).unwrap();
        for (i, value) in ma200.iter().enumerate() {
            if i < 199 {
                assert!(value.is_none(), "row {i} should be undefined");
            } else {
                let expected = closes[i + 1 - 200..=i].iter().sum::<f64>() / 200.0;
                assert!((value.unwrap() - expected).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_relative_volume() {
        let volumes: Vec<f64> = (0..30).map(|i| if i == 25 { 0.0 } else { 100.0 + i as f64 }).collect();
        let mut avg: Vec<Option<f64>> = sma(&volumes, 20);
        avg[22] = Some(0.0);
        let rel = relative_volume(&volumes, &avg);

        for i in 0..volumes.len() {
            match avg[i] {
                Some(a) if a != 0.0 => assert_eq!(rel[i], Some(volumes[i] / a)),
                _ => assert!(rel[i].is_none()),
            }
        }
        assert!(rel[..19].iter().all(Option::is_none));
    }

    #[test]
    fn test_rsi_extremes() {
        let rising: Vec<f64> = (0..20).map(|i| i as f64).collect();
        let values = rsi(&rising, 14);
        assert!(values[..13].iter().all(Option::is_none));
        assert_eq!(values[13], Some(100.0));

        let flat = vec![5.0; 20];
        let values = rsi(&flat, 14);
        assert!(values[15].unwrap().is_nan());
    }

    #[test]
    fn test_rsi_mixed() {
        let closes = [
            44.0, 44.5, 44.0, 45.0, 45.5, 45.0, 46.0, 46.5, 46.0, 47.0, 47.5, 47.0, 48.0, 48.5,
            48.0,
        ];
        let values = rsi(&closes, 14);
        let deltas: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();
        let gain: f64 = deltas.iter().map(|d| d.max(0.0)).sum::<f64>() / 14.0;
        let loss: f64 = deltas.iter().map(|d| (-d).max(0.0)).sum::<f64>() / 14.0;
        let expected = 100.0 - 100.0 / (1.0 + gain / loss);
        assert!((values[14].unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_ema_seeded_with_first_value() {
        let values = ema(&[10.0, 20.0], 3);
        assert_eq!(values[0], 10.0);
        assert!((values[1] - 15.0).abs() < 1e-12);
    }

    #[test]
    fn test_macd_constant_series() {
        let result = macd(&[50.0; 40], 12, 26, 9);
        assert!(result.macd_line.iter().all(|v| v.abs() < 1e-12));
        assert!(result.histogram.iter().all(|v| v.abs() < 1e-12));
    }

    #[test]
    fn test_true_range_and_atr() {
        let highs = [11.0, 15.0, 12.0];
        let lows = [9.0, 12.0, 8.0];
        let closes = [10.0, 14.0, 9.0];
        assert_eq!(true_range(&highs, &lows, &closes), vec![2.0, 5.0, 6.0]);
        assert_eq!(atr(&highs, &lows, &closes, 2), vec![None, Some(3.5), Some(5.5)]);
    }

    #[test]
    fn test_obv() {
        let closes = [10.0, 11.0, 11.0, 9.0];
        let volumes = [100.0, 200.0, 300.0, 50.0];
        assert_eq!(obv(&closes, &volumes), vec![0.0, 200.0, 200.0, 150.0]);
    }

    #[test]
    fn test_daily_return() {
        let values = daily_return(&[100.0, 110.0, 0.0, 5.0]);
        assert_eq!(values[0], None);
        assert!((values[1].unwrap() - 10.0).abs() < 1e-9);
        assert!((values[2].unwrap() + 100.0).abs() < 1e-9);
        assert_eq!(values[3], None);
    }

    #[test]
    fn test_bollinger_bands() {
        let closes: Vec<f64> = (1..=25).map(f64::from).collect();
        let volumes = vec![10u64; closes.len()];
        let mut series = make_series(&closes, &volumes);
        add_technical_indicators(&mut series).unwrap();

        let ma20 = series.column(columns::MA20).unwrap()[19].unwrap();
        let std = series.column(columns::MA20_STD).unwrap()[19].unwrap();
        let upper = series.column(columns::UPPER_BAND).unwrap()[19].unwrap();
        assert!((ma20 - 10.5).abs() < 1e-12);
        // Sample stdev of 1..=20.
        assert!((std - 5.916_079_783_099_616).abs() < 1e-9);
        assert!((upper - (ma20 + 2.0 * std)).abs() < 1e-12);
        assert!(series.column(columns::LOWER_BAND).unwrap()[18].is_none());
    }
}
