//! # Screener Risk Simulator
//!
//! Projects a year of daily prices for each eligible instrument from its own
//! historical return distribution and summarizes how often the price ends below
//! where it started.
//!
//! ## Public API
//!
//! - `MonteCarloSimulator`: runs the simulation and applies the acceptance threshold.
//! - `ReturnModel`: the (mu, sigma) pair estimated from a return series.
//! - `RiskError`: the specific error types that can be returned from this crate.

pub mod error;
pub mod monte_carlo;

pub use error::RiskError;
pub use monte_carlo::{MonteCarloSimulator, ReturnModel};
