use crate::error::RiskError;
use configuration::SimulationParams;
use core_types::{Candidate, SimulationResult};
use rand::Rng;
use rand_distr::{Distribution, Normal};
use rust_decimal::prelude::ToPrimitive;

/// Normal model of daily returns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReturnModel {
    pub mu: f64,
    pub sigma: f64,
}

impl ReturnModel {
    /// Sample mean and sample standard deviation (n - 1 denominator).
    pub fn estimate(returns: &[f64]) -> Result<Self, RiskError> {
        if returns.len() < 2 {
            return Err(RiskError::NotEnoughReturns(returns.len()));
        }
        if returns.iter().any(|r| !r.is_finite()) {
            return Err(RiskError::NonFiniteReturns);
        }

        let n = returns.len() as f64;
        let mu = returns.iter().sum::<f64>() / n;
        let variance = returns.iter().map(|r| (r - mu).powi(2)).sum::<f64>() / (n - 1.0);

        Ok(Self {
            mu,
            sigma: variance.sqrt(),
        })
    }
}

/// Monte Carlo projection of terminal prices.
#[derive(Debug, Clone)]
pub struct MonteCarloSimulator {
    params: SimulationParams,
}

impl MonteCarloSimulator {
    pub fn new(params: SimulationParams) -> Result<Self, RiskError> {
        if params.simulation_count == 0 || params.horizon_days == 0 {
            return Err(RiskError::InvalidParameters(
                "simulation_count and horizon_days must be at least 1".to_string(),
            ));
        }
        if i32::try_from(params.horizon_days).is_err() {
            return Err(RiskError::InvalidParameters(format!(
                "horizon_days {} is too large",
                params.horizon_days
            )));
        }
        let threshold = params.max_loss_probability;
        if !(threshold > 0.0 && threshold <= 100.0) {
            return Err(RiskError::InvalidParameters(format!(
                "max_loss_probability must be within (0, 100], got {}",
                threshold
            )));
        }
        Ok(Self { params })
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    /// Simulates the candidate from its own return history and latest price.
    pub fn evaluate<R: Rng + ?Sized>(
        &self,
        candidate: &Candidate,
        rng: &mut R,
    ) -> Result<SimulationResult, RiskError> {
        let start_price = candidate
            .last_price
            .to_f64()
            .ok_or_else(|| RiskError::InvalidStartPrice(candidate.last_price.to_string()))?;
        self.simulate(&candidate.returns, start_price, rng)
    }

    pub fn simulate<R: Rng + ?Sized>(
        &self,
        returns: &[f64],
        start_price: f64,
        rng: &mut R,
    ) -> Result<SimulationResult, RiskError> {
        let model = ReturnModel::estimate(returns)?;
        self.simulate_model(model, start_price, rng)
    }

    /// Compounds `horizon_days` normal daily returns over `simulation_count`
    /// independent paths and summarizes the terminal prices.
    ///
    /// With `sigma == 0` every path is `start * (1 + mu)^horizon` and the generator
    /// is not touched.
    pub fn simulate_model<R: Rng + ?Sized>(
        &self,
        model: ReturnModel,
        start_price: f64,
        rng: &mut R,
    ) -> Result<SimulationResult, RiskError> {
        if !(start_price.is_finite() && start_price > 0.0) {
            return Err(RiskError::InvalidStartPrice(start_price.to_string()));
        }

        let paths = self.params.simulation_count;
        let horizon = self.params.horizon_days;

        let terminal_prices = if model.sigma == 0.0 {
            let exponent = i32::try_from(horizon)
                .map_err(|_| RiskError::InvalidParameters("horizon_days is too large".into()))?;
            let terminal = start_price * (1.0 + model.mu).powi(exponent);
            vec![terminal; paths]
        } else {
            let daily = Normal::new(model.mu, model.sigma)
                .map_err(|e| RiskError::Distribution(e.to_string()))?;
            (0..paths)
                .map(|_| {
                    (0..horizon).fold(start_price, |price, _| price * (1.0 + daily.sample(rng)))
                })
                .collect()
        };

        let result = summarize(terminal_prices, start_price);
        tracing::trace!(
            mu = model.mu,
            sigma = model.sigma,
            loss_probability = result.loss_probability,
            upside = result.expected_upside_pct,
            "Simulation finished."
        );
        Ok(result)
    }

    /// True when the loss probability is strictly below the configured threshold.
    pub fn accepts(&self, result: &SimulationResult) -> bool {
        result.loss_probability < self.params.max_loss_probability
    }
}

fn summarize(mut terminal_prices: Vec<f64>, start_price: f64) -> SimulationResult {
    let n = terminal_prices.len() as f64;
    let losses = terminal_prices.iter().filter(|&&p| p < start_price).count();
    let mean = terminal_prices.iter().sum::<f64>() / n;

    terminal_prices.sort_by(|a, b| a.total_cmp(b));

    SimulationResult {
        loss_probability: 100.0 * losses as f64 / n,
        expected_upside_pct: 100.0 * (mean - start_price) / start_price,
        mean_terminal_price: mean,
        median_terminal_price: percentile(&terminal_prices, 50.0),
        percentile_5: percentile(&terminal_prices, 5.0),
        percentile_95: percentile(&terminal_prices, 95.0),
    }
}

/// Nearest-rank percentile of an ascending, non-empty slice.
fn percentile(sorted: &[f64], pct: f64) -> f64 {
    let rank = (pct / 100.0 * (sorted.len() - 1) as f64).round() as usize;
    sorted[rank.min(sorted.len() - 1)]
}
