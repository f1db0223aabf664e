//! # Screener Genetic Optimizer
//!
//! Searches, per instrument, for the weight vector and threshold that maximize the
//! total next-day return realized on the days the weighted indicator signal fires.
//!
//! - `TrainingSet` pairs each feature row with the following day's return, so a
//!   signal on day `t` is only ever scored against day `t + 1`.
//! - `GeneticOptimizer` runs truncation selection with Gaussian mutation and keeps
//!   the best genome seen across all generations.
//! - Every random draw goes through the caller's generator.

pub mod error;
pub mod fitness;
pub mod genetic;
pub mod population;

pub use error::OptimizerError;
pub use fitness::{Evaluation, NO_TRADE_FITNESS, TrainingSet};
pub use genetic::{GeneticOptimizer, OptimizationOutcome};
