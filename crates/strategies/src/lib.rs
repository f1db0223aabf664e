//! # Screener Eligibility Strategies
//!
//! This crate decides which instruments move on to the risk simulation. It defines a
//! universal `EligibilityStrategy` trait and provides two concrete implementations.
//!
//! ## Architectural Principles
//!
//! - **Pure logic:** No I/O. A strategy is handed one instrument's history and its
//!   indicator rows and returns a `Verdict`.
//! - **Strategy agnostic engine:** The engine only holds a `Box<dyn EligibilityStrategy>`,
//!   so the simulator and the ranking never know which strategy produced a `Candidate`.
//! - **Extensibility:** Adding a strategy means a new module, a new `EligibilityMode`
//!   variant and one arm in the `factory`.
//!
//! ## Public API
//!
//! - `EligibilityStrategy`: The core trait all strategies implement.
//! - `Verdict`: The outcome of evaluating one instrument.
//! - `create_strategy`: The factory function to construct a strategy instance.
//! - `StaticFilter` and `LearnedSignal`: the concrete strategies.

pub mod error;
pub mod factory;
pub mod learned;
pub mod static_filter;

pub use error::StrategyError;
pub use factory::create_strategy;
pub use learned::LearnedSignal;
pub use static_filter::StaticFilter;

use configuration::EligibilityMode;
use core_types::{Candidate, IndicatorRow, PriceSeries, Rejection};
use rand::RngCore;

/// Outcome of the eligibility stage for one instrument.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Eligible(Candidate),
    Ineligible(Rejection),
}

impl Verdict {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Verdict::Eligible(_))
    }
}

/// The core trait every eligibility strategy implements.
///
/// `evaluate` takes `&self` so one instance can be shared by every worker thread;
/// the `Send + Sync` bounds are what allow that. Strategies that need randomness
/// draw exclusively from `rng`.
pub trait EligibilityStrategy: Send + Sync {
    fn mode(&self) -> EligibilityMode;

    /// Evaluates one instrument.
    ///
    /// # Arguments
    ///
    /// * `series` - The instrument's full, chronological price history.
    /// * `rows` - Indicator rows computed from `series`; the last one is "today".
    /// * `rng` - The instrument's own random source.
    ///
    /// # Returns
    ///
    /// * `Ok(Verdict::Eligible(_))` - the candidate proceeds to simulation.
    /// * `Ok(Verdict::Ineligible(_))` - the instrument is filtered out, with the reason.
    /// * `Err(StrategyError)` - the instrument could not be evaluated at all.
    fn evaluate(
        &self,
        series: &PriceSeries,
        rows: &[IndicatorRow],
        rng: &mut dyn RngCore,
    ) -> Result<Verdict, StrategyError>;
}

/// Builds the simulator's input from the latest close and the full return history.
pub(crate) fn base_candidate(series: &PriceSeries) -> Result<Candidate, StrategyError> {
    let latest = series
        .latest()
        .ok_or_else(|| StrategyError::NoIndicatorRows(series.symbol().to_string()))?;
    let returns = series.daily_returns()?;
    Ok(Candidate::new(series.symbol(), latest.close, returns))
}
