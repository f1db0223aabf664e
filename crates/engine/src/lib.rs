//! # Screener Engine
//!
//! Wires the per-instrument pipeline together: indicators, the configured
//! eligibility strategy, and the Monte Carlo risk simulator. Instruments are
//! independent, so they are screened in parallel; every instrument gets its own
//! generator seeded from the run's master seed, which makes a run reproducible
//! regardless of scheduling.

use api_client::MarketDataProvider;
use configuration::{Config, EligibilityMode};
use core_types::{PriceSeries, ScoredCandidate};
use indicatif::{ProgressBar, ProgressStyle};
use indicators::IndicatorEngine;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use risk::MonteCarloSimulator;
use std::time::{Duration, Instant};
use strategies::{EligibilityStrategy, Verdict, create_strategy};
use uuid::Uuid;

pub mod error;
pub mod summary;

pub use error::{EngineError, ScreeningError};
pub use summary::{InstrumentOutcome, InstrumentResult, ScreeningSummary};

/// The per-run orchestrator.
pub struct ScreeningEngine {
    indicators: IndicatorEngine,
    strategy: Box<dyn EligibilityStrategy>,
    simulator: MonteCarloSimulator,
    budget: Option<Duration>,
    show_progress: bool,
}

impl ScreeningEngine {
    pub fn new(
        indicators: IndicatorEngine,
        strategy: Box<dyn EligibilityStrategy>,
        simulator: MonteCarloSimulator,
    ) -> Self {
        Self {
            indicators,
            strategy,
            simulator,
            budget: None,
            show_progress: true,
        }
    }

    /// Builds every component from the master configuration.
    pub fn from_config(config: &Config, mode: EligibilityMode) -> Result<Self, EngineError> {
        let indicators = IndicatorEngine::new(config.indicators.clone())?;
        let strategy = create_strategy(mode, config)?;
        let simulator = MonteCarloSimulator::new(config.simulation.clone())?;
        let budget = config.screening.max_run_seconds.map(Duration::from_secs);

        Ok(Self::new(indicators, strategy, simulator).with_budget(budget))
    }

    /// Instruments not yet started once `budget` has elapsed are skipped.
    pub fn with_budget(mut self, budget: Option<Duration>) -> Self {
        self.budget = budget;
        self
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn mode(&self) -> EligibilityMode {
        self.strategy.mode()
    }

    pub fn simulation_count(&self) -> usize {
        self.simulator.params().simulation_count
    }

    /// Retrieves the universe and screens every instrument that came back.
    ///
    /// When `seed` is `None` a fresh one is drawn; it is logged and stored in the
    /// summary so the run can be replayed.
    pub async fn run(
        &self,
        provider: &dyn MarketDataProvider,
        symbols: &[String],
        seed: Option<u64>,
    ) -> Result<ScreeningSummary, EngineError> {
        let seed = seed.unwrap_or_else(rand::random);
        let run_id = Uuid::new_v4();
        tracing::info!(%run_id, seed, strategy = %self.mode(), "Screening run started.");

        let batch = provider.fetch_history(symbols).await?;

        // Screening is pure CPU work; keep it off the async workers.
        let results = tokio::task::block_in_place(|| self.screen(&batch.series, seed))?;

        Ok(ScreeningSummary {
            run_id,
            seed,
            strategy: self.mode(),
            results,
            failures: batch.failures,
        })
    }

    /// Screens every series in parallel. Results keep the input order.
    pub fn screen(
        &self,
        series: &[PriceSeries],
        seed: u64,
    ) -> Result<Vec<InstrumentResult>, EngineError> {
        // Child seeds are drawn in input order before the fan-out.
        let mut master = StdRng::seed_from_u64(seed);
        let seeds: Vec<u64> = series.iter().map(|_| master.random()).collect();

        let progress = self.progress_bar(series.len())?;
        let started = Instant::now();

        let results = series
            .par_iter()
            .zip(seeds.par_iter())
            .map(|(series, &child_seed)| {
                let outcome = match self.budget {
                    Some(budget) if started.elapsed() >= budget => InstrumentOutcome::Skipped(
                        ScreeningError::BudgetExhausted(budget.as_secs()),
                    ),
                    _ => self.screen_instrument(series, child_seed),
                };
                progress.inc(1);
                InstrumentResult {
                    symbol: series.symbol().to_string(),
                    seed: child_seed,
                    outcome,
                }
            })
            .collect();

        progress.finish_and_clear();
        Ok(results)
    }

    /// Runs one instrument through the pipeline with its own generator.
    ///
    /// Errors never escape: they become `InstrumentOutcome::Skipped`.
    pub fn screen_instrument(&self, series: &PriceSeries, seed: u64) -> InstrumentOutcome {
        let span = tracing::info_span!("instrument", symbol = series.symbol());
        let _enter = span.enter();

        match self.evaluate(series, seed) {
            Ok(outcome) => outcome,
            Err(error) => {
                tracing::debug!(%error, "Instrument could not be evaluated.");
                InstrumentOutcome::Skipped(error)
            }
        }
    }

    fn evaluate(
        &self,
        series: &PriceSeries,
        seed: u64,
    ) -> Result<InstrumentOutcome, ScreeningError> {
        let mut rng = StdRng::seed_from_u64(seed);

        let rows = self.indicators.compute(series)?;
        let candidate = match self.strategy.evaluate(series, &rows, &mut rng)? {
            Verdict::Eligible(candidate) => candidate,
            Verdict::Ineligible(reason) => return Ok(InstrumentOutcome::Ineligible(reason)),
        };

        let simulation = self.simulator.evaluate(&candidate, &mut rng)?;
        let accepted = self.simulator.accepts(&simulation);
        let scored = ScoredCandidate {
            candidate,
            simulation,
        };

        Ok(if accepted {
            InstrumentOutcome::Accepted(scored)
        } else {
            InstrumentOutcome::RejectedByRisk(scored)
        })
    }

    fn progress_bar(&self, len: usize) -> Result<ProgressBar, EngineError> {
        if !self.show_progress {
            return Ok(ProgressBar::hidden());
        }
        let progress_bar = ProgressBar::new(len as u64);
        progress_bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
                .map_err(|e| EngineError::ProgressBarTemplate(e.to_string()))?
                .progress_chars("=>-"),
        );
        Ok(progress_bar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use api_client::{FetchFailure, HistoryBatch, error::ApiError};
    use async_trait::async_trait;
    use chrono::{Days, NaiveDate};
    use configuration::{IndicatorParams, SimulationParams};
    use core_types::{Candidate, IndicatorRow, PriceBar, Rejection};
    use indicators::IndicatorError;
    use rand::RngCore;
    use rust_decimal::Decimal;
    use rust_decimal::prelude::FromPrimitive;

    fn series(symbol: &str, closes: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                let close = Decimal::from_f64(c).unwrap();
                PriceBar {
                    date: start.checked_add_days(Days::new(i as u64)).unwrap(),
                    open: close,
                    high: close * Decimal::from_f64(1.01).unwrap(),
                    low: close * Decimal::from_f64(0.99).unwrap(),
                    close,
                    volume: Decimal::from(250_000),
                }
            })
            .collect();
        PriceSeries::new(symbol, bars).unwrap()
    }

    fn flat(symbol: &str) -> PriceSeries {
        series(symbol, &[25.0; 260])
    }

    fn falling(symbol: &str) -> PriceSeries {
        let closes: Vec<f64> = (0..260).map(|i| 200.0 - 0.4 * i as f64).collect();
        series(symbol, &closes)
    }

    fn short(symbol: &str) -> PriceSeries {
        series(symbol, &[10.0; 50])
    }

    fn small_simulation() -> SimulationParams {
        SimulationParams {
            simulation_count: 500,
            ..SimulationParams::default()
        }
    }

    fn engine_with(strategy: Box<dyn EligibilityStrategy>) -> ScreeningEngine {
        ScreeningEngine::new(
            IndicatorEngine::new(IndicatorParams::default()).unwrap(),
            strategy,
            MonteCarloSimulator::new(small_simulation()).unwrap(),
        )
        .with_progress(false)
    }

    fn static_engine() -> ScreeningEngine {
        let mut config = Config::default();
        config.simulation = small_simulation();
        ScreeningEngine::from_config(&config, EligibilityMode::Static)
            .unwrap()
            .with_progress(false)
    }

    /// Passes everything through so the simulator decides.
    struct PassThrough;

    impl EligibilityStrategy for PassThrough {
        fn mode(&self) -> EligibilityMode {
            EligibilityMode::Static
        }

        fn evaluate(
            &self,
            series: &PriceSeries,
            _rows: &[IndicatorRow],
            _rng: &mut dyn RngCore,
        ) -> Result<Verdict, strategies::StrategyError> {
            let last = series.latest().unwrap().close;
            Ok(Verdict::Eligible(Candidate::new(
                series.symbol(),
                last,
                series.daily_returns()?,
            )))
        }
    }

    #[test]
    fn one_bad_instrument_does_not_stop_the_run() {
        let input = vec![flat("A.IS"), short("B.IS"), falling("C.IS")];
        let results = static_engine().screen(&input, 1).unwrap();

        let symbols: Vec<&str> = results.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["A.IS", "B.IS", "C.IS"]);

        // Flat prices: on the long mean, neutral RSI, zero volatility, zero loss.
        let InstrumentOutcome::Accepted(scored) = &results[0].outcome else {
            panic!("expected the flat series to be accepted");
        };
        assert_eq!(scored.simulation.loss_probability, 0.0);

        assert_eq!(
            results[1].outcome,
            InstrumentOutcome::Skipped(ScreeningError::Indicator(
                IndicatorError::InsufficientHistory {
                    available: 50,
                    required: 200
                }
            ))
        );
        assert_eq!(
            results[2].outcome,
            InstrumentOutcome::Ineligible(Rejection::Downtrend)
        );
    }

    #[test]
    fn steady_decline_is_rejected_by_risk() {
        let closes: Vec<f64> = (0..260).map(|i| 100.0 * 0.995_f64.powi(i)).collect();
        let engine = engine_with(Box::new(PassThrough));
        let outcome = engine.screen_instrument(&series("D.IS", &closes), 5);
        let InstrumentOutcome::RejectedByRisk(scored) = outcome else {
            panic!("expected a risk rejection");
        };
        assert_eq!(scored.simulation.loss_probability, 100.0);
    }

    #[test]
    fn same_seed_same_results() {
        let input = vec![flat("A.IS"), falling("C.IS"), flat("E.IS")];
        let engine = engine_with(Box::new(PassThrough));
        assert_eq!(engine.screen(&input, 99).unwrap(), engine.screen(&input, 99).unwrap());
    }

    #[test]
    fn parallel_result_matches_isolated_replay() {
        let wavy: Vec<f64> = (0..300)
            .map(|i| 50.0 + 5.0 * (i as f64 * 0.2).sin() + 0.02 * i as f64)
            .collect();
        let input = vec![flat("A.IS"), series("W.IS", &wavy), falling("C.IS")];
        let engine = engine_with(Box::new(PassThrough));

        let results = engine.screen(&input, 7).unwrap();
        let replay = engine.screen_instrument(&input[1], results[1].seed);
        assert_eq!(results[1].outcome, replay);
    }

    #[test]
    fn exhausted_budget_skips_remaining_instruments() {
        let engine = static_engine().with_budget(Some(Duration::ZERO));
        let results = engine.screen(&[flat("A.IS"), flat("B.IS")], 3).unwrap();
        assert!(results.iter().all(|r| r.outcome
            == InstrumentOutcome::Skipped(ScreeningError::BudgetExhausted(0))));
    }

    struct InMemory {
        series: Vec<PriceSeries>,
        missing: Vec<String>,
    }

    #[async_trait]
    impl MarketDataProvider for InMemory {
        async fn fetch_history(&self, symbols: &[String]) -> Result<HistoryBatch, ApiError> {
            if self.series.is_empty() {
                return Err(ApiError::NoData {
                    requested: symbols.len(),
                });
            }
            Ok(HistoryBatch {
                series: self.series.clone(),
                failures: self
                    .missing
                    .iter()
                    .map(|symbol| FetchFailure {
                        symbol: symbol.clone(),
                        error: ApiError::InvalidData("no complete bars".to_string()),
                    })
                    .collect(),
            })
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn run_summarizes_every_stage() {
        let provider = InMemory {
            series: vec![flat("A.IS"), falling("C.IS"), short("B.IS")],
            missing: vec!["Z.IS".to_string()],
        };
        let symbols: Vec<String> = ["A.IS", "C.IS", "B.IS", "Z.IS"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let summary = static_engine()
            .run(&provider, &symbols, Some(11))
            .await
            .unwrap();

        assert_eq!(summary.seed, 11);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.fetched(), 3);
        assert_eq!(summary.skipped(), 1);
        assert_eq!(summary.ineligible(), 1);
        assert_eq!(summary.eligible(), 1);
        assert_eq!(summary.accepted(), 1);
        assert_eq!(summary.accepted_candidates()[0].candidate.symbol, "A.IS");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn total_retrieval_failure_aborts_the_run() {
        let provider = InMemory {
            series: vec![],
            missing: vec![],
        };
        let result = static_engine()
            .run(&provider, &["A.IS".to_string()], Some(1))
            .await;
        assert!(matches!(
            result,
            Err(EngineError::ApiClient(ApiError::NoData { requested: 1 }))
        ));
    }
}
