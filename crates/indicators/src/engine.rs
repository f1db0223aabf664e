use crate::error::IndicatorError;
use configuration::IndicatorParams;
use core_types::{IndicatorRow, PriceSeries};
use ta::Next;
use ta::indicators::SimpleMovingAverage as Sma;

/// Derives per-day feature rows from a price series.
///
/// A row is emitted only for bars where every rolling window is full. With the
/// default 200-bar long trend the first 199 bars are warmup, so a series of `n`
/// bars yields `n - 199` rows.
#[derive(Debug, Clone)]
pub struct IndicatorEngine {
    params: IndicatorParams,
}

impl IndicatorEngine {
    pub fn new(params: IndicatorParams) -> Result<Self, IndicatorError> {
        if params.short_trend_period == 0 || params.long_trend_period == 0 || params.rsi_period == 0
        {
            return Err(IndicatorError::InvalidParameters(
                "Indicator periods cannot be zero".to_string(),
            ));
        }
        if params.rsi_period >= params.long_trend_period
            || params.short_trend_period > params.long_trend_period
        {
            return Err(IndicatorError::InvalidParameters(
                "The long trend window must be the longest window".to_string(),
            ));
        }
        Ok(Self { params })
    }

    /// Minimum number of bars for a series to produce any row.
    pub fn min_history(&self) -> usize {
        self.params.long_trend_period
    }

    /// Number of leading bars that never produce a row.
    pub fn warmup(&self) -> usize {
        self.params.long_trend_period - 1
    }

    pub fn params(&self) -> &IndicatorParams {
        &self.params
    }

    pub fn compute(&self, series: &PriceSeries) -> Result<Vec<IndicatorRow>, IndicatorError> {
        if series.len() < self.min_history() {
            return Err(IndicatorError::InsufficientHistory {
                available: series.len(),
                required: self.min_history(),
            });
        }

        let mut short_mean = sma(self.params.short_trend_period)?;
        let mut long_mean = sma(self.params.long_trend_period)?;
        let mut avg_gain = sma(self.params.rsi_period)?;
        let mut avg_loss = sma(self.params.rsi_period)?;

        let warmup = self.warmup();
        let mut rows = Vec::with_capacity(series.len() - warmup);
        let mut prev_close: Option<f64> = None;

        for (i, bar) in series.bars().iter().enumerate() {
            let close = bar.close_f64()?;
            let short = short_mean.next(close);
            let long = long_mean.next(close);

            // The first bar has no delta, so the RSI averages start one bar late.
            let rsi = prev_close.map(|prev| {
                let delta = close - prev;
                let gain = avg_gain.next(delta.max(0.0));
                let loss = avg_loss.next((-delta).max(0.0));
                rsi_norm(gain, loss)
            });
            prev_close = Some(close);

            if i < warmup {
                continue;
            }

            let row = IndicatorRow {
                date: bar.date,
                close,
                short_trend: close / short,
                long_trend: close / long,
                rsi_norm: rsi.unwrap_or(NEUTRAL_RSI),
                volatility: (bar.high_f64()? - bar.low_f64()?) / close,
            };
            ensure_finite(&row)?;
            rows.push(row);
        }

        tracing::trace!(symbol = series.symbol(), rows = rows.len(), "Indicators computed.");
        Ok(rows)
    }
}

/// RSI value used when neither gains nor losses occurred in the window.
pub const NEUTRAL_RSI: f64 = 0.5;

/// Relative strength index scaled to [0, 1] from the window's average gain and loss.
///
/// `1 - 1 / (1 + gain / loss)` is undefined when the average loss is zero. That
/// case resolves to 1.0 when there were gains and to `NEUTRAL_RSI` when the
/// window was completely flat.
pub fn rsi_norm(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss <= 0.0 {
        return if avg_gain > 0.0 { 1.0 } else { NEUTRAL_RSI };
    }
    let rs = avg_gain / avg_loss;
    (1.0 - 1.0 / (1.0 + rs)).clamp(0.0, 1.0)
}

/// Mean volume over the last `window` bars.
pub fn average_volume(series: &PriceSeries, window: usize) -> Result<f64, IndicatorError> {
    if window == 0 || series.len() < window {
        return Err(IndicatorError::InsufficientHistory {
            available: series.len(),
            required: window.max(1),
        });
    }
    let recent = &series.bars()[series.len() - window..];
    let total = recent
        .iter()
        .map(|bar| bar.volume_f64())
        .sum::<Result<f64, _>>()?;
    Ok(total / window as f64)
}

fn sma(period: usize) -> Result<Sma, IndicatorError> {
    Sma::new(period).map_err(|e| {
        IndicatorError::InvalidParameters(format!("Failed to initialize SMA({}): {:?}", period, e))
    })
}

fn ensure_finite(row: &IndicatorRow) -> Result<(), IndicatorError> {
    let fields = [
        ("short_trend", row.short_trend),
        ("long_trend", row.long_trend),
        ("rsi_norm", row.rsi_norm),
        ("volatility", row.volatility),
    ];
    match fields.iter().find(|(_, value)| !value.is_finite()) {
        Some(&(field, _)) => Err(IndicatorError::NonFiniteValue {
            date: row.date,
            field,
        }),
        None => Ok(()),
    }
}
