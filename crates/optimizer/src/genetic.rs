use crate::error::OptimizerError;
use crate::fitness::{Evaluation, TrainingSet};
use crate::population::{random_population, repopulate};
use configuration::GeneticParams;
use core_types::Genome;
use rand::Rng;
use rand_distr::Normal;

/// The best genome found for one instrument.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationOutcome {
    pub genome: Genome,
    pub fitness: f64,
    /// Days the best genome fired on the training set. Zero means no generation
    /// ever produced a genome that trades.
    pub trade_days: usize,
    /// Best fitness recorded so far, one entry per generation.
    pub history: Vec<f64>,
}

impl OptimizationOutcome {
    pub fn is_viable(&self) -> bool {
        self.trade_days > 0
    }
}

/// Evolves `Genome`s with truncation selection and Gaussian mutation.
#[derive(Debug, Clone)]
pub struct GeneticOptimizer {
    params: GeneticParams,
    noise: Normal<f64>,
}

impl GeneticOptimizer {
    pub fn new(params: GeneticParams) -> Result<Self, OptimizerError> {
        if params.population_size < 2 {
            return Err(OptimizerError::InvalidParameters(
                "population_size must be at least 2 so that one genome survives".to_string(),
            ));
        }
        if params.generations == 0 {
            return Err(OptimizerError::InvalidParameters(
                "generations must be at least 1".to_string(),
            ));
        }
        if !(params.mutation_sigma.is_finite() && params.mutation_sigma >= 0.0) {
            return Err(OptimizerError::InvalidParameters(format!(
                "mutation_sigma must be a non-negative number, got {}",
                params.mutation_sigma
            )));
        }
        let noise = Normal::new(0.0, params.mutation_sigma).map_err(|e| {
            OptimizerError::InvalidParameters(format!(
                "mutation_sigma {}: {}",
                params.mutation_sigma, e
            ))
        })?;
        Ok(Self { params, noise })
    }

    pub fn params(&self) -> &GeneticParams {
        &self.params
    }

    /// Runs the full search and returns the best genome seen in any generation.
    ///
    /// Each generation evaluates the whole population, records a new best only when
    /// the generation's leader strictly beats it, keeps the top half (ties resolved
    /// in population order) and refills the rest with mutated survivors.
    pub fn optimize<R: Rng + ?Sized>(
        &self,
        training: &TrainingSet,
        rng: &mut R,
    ) -> Result<OptimizationOutcome, OptimizerError> {
        let size = self.params.population_size;
        let survivor_count = size / 2;

        let mut population = random_population(size, rng);
        let mut best: Option<(Genome, Evaluation)> = None;
        let mut history = Vec::with_capacity(self.params.generations);

        for generation in 0..self.params.generations {
            let mut scored: Vec<(Genome, Evaluation)> = population
                .iter()
                .map(|genome| (*genome, training.evaluate(genome)))
                .collect();

            // Stable sort, so equal fitness keeps population order.
            scored.sort_by(|a, b| b.1.fitness.total_cmp(&a.1.fitness));

            let leader = scored[0];
            let improved = best.is_none_or(|(_, recorded)| leader.1.fitness > recorded.fitness);
            if improved {
                best = Some(leader);
            }
            let best_fitness = best.map_or(leader.1.fitness, |(_, e)| e.fitness);
            history.push(best_fitness);

            tracing::trace!(
                generation,
                leader = leader.1.fitness,
                best = best_fitness,
                "Generation evaluated."
            );

            let survivors: Vec<Genome> = scored
                .into_iter()
                .take(survivor_count)
                .map(|(genome, _)| genome)
                .collect();
            population = repopulate(&survivors, size, &self.noise, rng);
        }

        let (genome, evaluation) = best.ok_or_else(|| {
            OptimizerError::InvalidParameters("no generation was evaluated".to_string())
        })?;

        Ok(OptimizationOutcome {
            genome,
            fitness: evaluation.fitness,
            trade_days: evaluation.trade_days,
            history,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fitness::NO_TRADE_FITNESS;
    use chrono::{Days, NaiveDate};
    use core_types::IndicatorRow;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn training_set() -> TrainingSet {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let rows: Vec<IndicatorRow> = (0..120u64)
            .map(|i| {
                let t = i as f64;
                IndicatorRow {
                    date: start.checked_add_days(Days::new(i)).unwrap(),
                    close: 100.0 + 10.0 * (t * 0.2).sin() + 0.1 * t,
                    short_trend: 1.0 + 0.05 * (t * 0.2).cos(),
                    long_trend: 1.0 + 0.02 * (t * 0.05).sin(),
                    rsi_norm: 0.5 + 0.4 * (t * 0.2 + 1.0).sin(),
                    volatility: 0.02 + 0.01 * (t * 0.3).cos().abs(),
                }
            })
            .collect();
        TrainingSet::from_rows(&rows).unwrap()
    }

    fn optimizer() -> GeneticOptimizer {
        GeneticOptimizer::new(GeneticParams::default()).unwrap()
    }

    #[test]
    fn same_seed_same_result() {
        let set = training_set();
        let first = optimizer()
            .optimize(&set, &mut StdRng::seed_from_u64(42))
            .unwrap();
        let second = optimizer()
            .optimize(&set, &mut StdRng::seed_from_u64(42))
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn best_fitness_never_decreases() {
        let set = training_set();
        for seed in 0..5 {
            let outcome = optimizer()
                .optimize(&set, &mut StdRng::seed_from_u64(seed))
                .unwrap();
            assert_eq!(outcome.history.len(), GeneticParams::default().generations);
            assert!(outcome.history.windows(2).all(|w| w[1] >= w[0]));
            assert_eq!(*outcome.history.last().unwrap(), outcome.fitness);
        }
    }

    #[test]
    fn reported_fitness_matches_reported_genome() {
        let set = training_set();
        let outcome = optimizer()
            .optimize(&set, &mut StdRng::seed_from_u64(9))
            .unwrap();
        let eval = set.evaluate(&outcome.genome);
        assert_eq!(eval.fitness, outcome.fitness);
        assert_eq!(eval.trade_days, outcome.trade_days);
    }

    #[test]
    fn flat_prices_score_zero_or_sentinel() {
        // All features are zero, so a genome fires only when its threshold is
        // negative, and any trade on a flat price earns exactly nothing.
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let rows: Vec<IndicatorRow> = (0..10)
            .map(|i| IndicatorRow {
                date: start.checked_add_days(Days::new(i)).unwrap(),
                close: 10.0,
                short_trend: 0.0,
                long_trend: 0.0,
                rsi_norm: 0.0,
                volatility: 0.0,
            })
            .collect();
        let set = TrainingSet::from_rows(&rows).unwrap();
        let outcome = optimizer()
            .optimize(&set, &mut StdRng::seed_from_u64(5))
            .unwrap();
        if outcome.is_viable() {
            assert_eq!(outcome.fitness, 0.0);
            assert!(outcome.genome.threshold() < 0.0);
        } else {
            assert_eq!(outcome.fitness, NO_TRADE_FITNESS);
        }
    }

    #[test]
    fn rejects_single_genome_population() {
        let params = GeneticParams {
            population_size: 1,
            ..GeneticParams::default()
        };
        assert!(GeneticOptimizer::new(params).is_err());
    }

    #[test]
    fn rejects_negative_or_non_finite_sigma() {
        for sigma in [-0.1, f64::NAN, f64::INFINITY] {
            let params = GeneticParams {
                mutation_sigma: sigma,
                ..GeneticParams::default()
            };
            assert!(matches!(
                GeneticOptimizer::new(params),
                Err(OptimizerError::InvalidParameters(_))
            ));
        }
    }

    #[test]
    fn zero_sigma_is_allowed() {
        let params = GeneticParams {
            mutation_sigma: 0.0,
            ..GeneticParams::default()
        };
        assert!(GeneticOptimizer::new(params).is_ok());
    }
}
