use crate::error::StrategyError;
use crate::{EligibilityStrategy, Verdict, base_candidate};
use configuration::{EligibilityMode, StaticFilterParams};
use core_types::{IndicatorRow, PriceSeries, Rejection};
use indicators::average_volume;
use rand::RngCore;

/// Technical filter: long-term uptrend, RSI not stretched, enough traded volume.
///
/// No learning is involved; the generator is never used.
#[derive(Debug, Clone)]
pub struct StaticFilter {
    params: StaticFilterParams,
}

impl StaticFilter {
    pub fn new(params: StaticFilterParams) -> Result<Self, StrategyError> {
        if params.volume_window == 0 {
            return Err(StrategyError::InvalidParameters(
                "volume_window must be at least 1".to_string(),
            ));
        }
        if !(0.0..=100.0).contains(&params.max_rsi) {
            return Err(StrategyError::InvalidParameters(format!(
                "max_rsi must be on the 0-100 scale, got {}",
                params.max_rsi
            )));
        }
        Ok(Self { params })
    }

    /// First failing condition, checked in order trend, momentum, liquidity.
    fn screen(
        &self,
        series: &PriceSeries,
        today: &IndicatorRow,
    ) -> Result<Option<Rejection>, StrategyError> {
        // long_trend is close / long rolling mean.
        if today.long_trend < 1.0 {
            return Ok(Some(Rejection::Downtrend));
        }
        if today.rsi_norm * 100.0 > self.params.max_rsi {
            return Ok(Some(Rejection::Overextended));
        }
        let avg_volume = average_volume(series, self.params.volume_window)?;
        if avg_volume < self.params.min_avg_volume {
            return Ok(Some(Rejection::LowLiquidity));
        }
        Ok(None)
    }
}

impl EligibilityStrategy for StaticFilter {
    fn mode(&self) -> EligibilityMode {
        EligibilityMode::Static
    }

    fn evaluate(
        &self,
        series: &PriceSeries,
        rows: &[IndicatorRow],
        _rng: &mut dyn RngCore,
    ) -> Result<Verdict, StrategyError> {
        let today = rows
            .last()
            .ok_or_else(|| StrategyError::NoIndicatorRows(series.symbol().to_string()))?;

        if let Some(reason) = self.screen(series, today)? {
            tracing::debug!(
                symbol = series.symbol(),
                %reason,
                "Static filter rejected instrument."
            );
            return Ok(Verdict::Ineligible(reason));
        }

        tracing::debug!(
            symbol = series.symbol(),
            long_trend = today.long_trend,
            rsi = today.rsi_norm * 100.0,
            "Static filter passed."
        );
        Ok(Verdict::Eligible(base_candidate(series)?))
    }
}
