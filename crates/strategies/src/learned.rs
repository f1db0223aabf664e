use crate::error::StrategyError;
use crate::{EligibilityStrategy, Verdict, base_candidate};
use configuration::{EligibilityMode, GeneticParams, LearnedParams};
use core_types::{IndicatorRow, PriceSeries, Rejection};
use optimizer::{GeneticOptimizer, TrainingSet};
use rand::RngCore;

/// Learned signal: trains a genome on the instrument's own history and requires
/// it to be profitable in-sample and firing today.
#[derive(Debug, Clone)]
pub struct LearnedSignal {
    optimizer: GeneticOptimizer,
    params: LearnedParams,
}

impl LearnedSignal {
    pub fn new(genetic: GeneticParams, params: LearnedParams) -> Result<Self, StrategyError> {
        if !params.min_fitness.is_finite() || !params.min_notional_volume.is_finite() {
            return Err(StrategyError::InvalidParameters(
                "learned thresholds must be finite".to_string(),
            ));
        }
        Ok(Self {
            optimizer: GeneticOptimizer::new(genetic)?,
            params,
        })
    }

    fn notional_volume(series: &PriceSeries) -> Result<f64, StrategyError> {
        let latest = series
            .latest()
            .ok_or_else(|| StrategyError::NoIndicatorRows(series.symbol().to_string()))?;
        Ok(latest.volume_f64()? * latest.close_f64()?)
    }
}

impl EligibilityStrategy for LearnedSignal {
    fn mode(&self) -> EligibilityMode {
        EligibilityMode::Learned
    }

    fn evaluate(
        &self,
        series: &PriceSeries,
        rows: &[IndicatorRow],
        rng: &mut dyn RngCore,
    ) -> Result<Verdict, StrategyError> {
        let symbol = series.symbol();
        let today = rows
            .last()
            .ok_or_else(|| StrategyError::NoIndicatorRows(symbol.to_string()))?;

        // Liquidity does not depend on the genome, so illiquid names skip training.
        let notional = Self::notional_volume(series)?;
        if notional < self.params.min_notional_volume {
            tracing::debug!(symbol, notional, "Learned strategy rejected: low liquidity.");
            return Ok(Verdict::Ineligible(Rejection::LowLiquidity));
        }

        let training = TrainingSet::from_rows(rows)?;
        let outcome = self.optimizer.optimize(&training, rng)?;

        if !outcome.is_viable() {
            tracing::debug!(symbol, "No genome ever fired on the training data.");
            return Ok(Verdict::Ineligible(Rejection::NoViableGenome));
        }
        if outcome.fitness < self.params.min_fitness {
            tracing::debug!(
                symbol,
                fitness = outcome.fitness,
                "Learned strategy rejected: weak fitness."
            );
            return Ok(Verdict::Ineligible(Rejection::WeakFitness));
        }

        let signal = outcome.genome.signal(today);
        if !outcome.genome.triggers(today) {
            tracing::debug!(
                symbol,
                signal,
                threshold = outcome.genome.threshold(),
                "Learned strategy rejected: no live signal."
            );
            return Ok(Verdict::Ineligible(Rejection::NoLiveSignal));
        }

        tracing::debug!(
            symbol,
            fitness = outcome.fitness,
            trade_days = outcome.trade_days,
            signal,
            "Learned strategy passed."
        );
        let candidate = base_candidate(series)?.with_genome(outcome.genome, outcome.fitness);
        Ok(Verdict::Eligible(candidate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::series;
    use chrono::{Days, NaiveDate};
    use configuration::IndicatorParams;
    use indicators::IndicatorEngine;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn run(closes: &[f64], volume: u64, seed: u64) -> Verdict {
        let series = series(closes, volume);
        let rows = IndicatorEngine::new(IndicatorParams::default())
            .unwrap()
            .compute(&series)
            .unwrap();
        LearnedSignal::new(GeneticParams::default(), LearnedParams::default())
            .unwrap()
            .evaluate(&series, &rows, &mut StdRng::seed_from_u64(seed))
            .unwrap()
    }

    fn compounding(daily: f64) -> Vec<f64> {
        (0..260).map(|i| 100.0 * daily.powi(i)).collect()
    }

    #[test]
    fn low_notional_volume_is_rejected_before_training() {
        // 1 000 shares at ~100 is far below the 10M notional floor.
        assert_eq!(
            run(&compounding(1.01), 1_000, 1),
            Verdict::Ineligible(Rejection::LowLiquidity)
        );
    }

    #[test]
    fn steady_gains_produce_a_live_candidate() {
        // Every training day returns +1%, so a genome that fires everywhere
        // earns well above the 0.10 floor and also fires on the last row.
        let Verdict::Eligible(candidate) = run(&compounding(1.01), 1_000_000, 7) else {
            panic!("expected an eligible verdict");
        };
        let fitness = candidate.fitness.unwrap();
        assert!(fitness >= 0.10);
        assert!(candidate.genome.is_some());
        assert_eq!(candidate.returns.len(), 259);
    }

    #[test]
    fn steady_losses_never_pass() {
        let verdict = run(&compounding(0.99), 10_000_000, 3);
        assert!(matches!(
            verdict,
            Verdict::Ineligible(Rejection::WeakFitness | Rejection::NoViableGenome)
        ));
    }

    #[test]
    fn same_seed_same_verdict() {
        let closes: Vec<f64> = (0..300)
            .map(|i| {
                let t = i as f64;
                100.0 + 0.05 * t + 3.0 * (0.3 * t).sin()
            })
            .collect();
        assert_eq!(run(&closes, 1_000_000, 21), run(&closes, 1_000_000, 21));
    }

    /// Only `short_trend` carries information: 1.0 in the "on" regime, 0.0 otherwise.
    fn regime_rows(regimes: &[(bool, f64)]) -> Vec<IndicatorRow> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let mut close = 100.0;
        regimes
            .iter()
            .enumerate()
            .map(|(i, &(on, next_return))| {
                let row = IndicatorRow {
                    date: start.checked_add_days(Days::new(i as u64)).unwrap(),
                    close,
                    short_trend: if on { 1.0 } else { 0.0 },
                    long_trend: 0.0,
                    rsi_norm: 0.0,
                    volatility: 0.0,
                };
                close *= 1.0 + next_return;
                row
            })
            .collect()
    }

    fn evaluate_rows(rows: &[IndicatorRow], seed: u64) -> Verdict {
        let genetic = GeneticParams {
            population_size: 60,
            ..GeneticParams::default()
        };
        LearnedSignal::new(genetic, LearnedParams::default())
            .unwrap()
            .evaluate(
                &series(&[100.0; 5], 1_000_000),
                rows,
                &mut StdRng::seed_from_u64(seed),
            )
            .unwrap()
    }

    #[test]
    fn profitable_genome_silent_today_has_no_live_signal() {
        // 30 "on" days each followed by +1%, then 30 "off" days each followed by -2%,
        // and today is an "off" day. The best genome fires only on "on" days
        // (fitness 0.30); firing on both regimes nets -0.30.
        let mut regimes = vec![(true, 0.01); 30];
        regimes.extend(vec![(false, -0.02); 30]);
        regimes.push((false, 0.0));
        let rows = regime_rows(&regimes);

        assert_eq!(
            evaluate_rows(&rows, 17),
            Verdict::Ineligible(Rejection::NoLiveSignal)
        );
    }

    #[test]
    fn fitness_just_under_the_floor_is_weak() {
        // Nine +1% training days: the best any genome can earn is about 0.09.
        let mut regimes = vec![(true, 0.01); 9];
        regimes.push((true, 0.0));
        let rows = regime_rows(&regimes);

        assert_eq!(
            evaluate_rows(&rows, 4),
            Verdict::Ineligible(Rejection::WeakFitness)
        );
    }

    #[test]
    fn rejects_bad_genetic_parameters() {
        let genetic = GeneticParams {
            generations: 0,
            ..GeneticParams::default()
        };
        assert!(matches!(
            LearnedSignal::new(genetic, LearnedParams::default()),
            Err(StrategyError::Optimizer(_))
        ));
    }
}
