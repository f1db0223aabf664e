//! # Screener Indicator Engine
//!
//! Turns raw daily bars into the feature rows consumed by the optimizer and the
//! eligibility strategies: short and long trend ratios, a normalized RSI, and the
//! intraday range. Pure calculation, no I/O.

pub mod engine;
pub mod error;

pub use engine::{IndicatorEngine, NEUTRAL_RSI, average_volume, rsi_norm};
pub use error::IndicatorError;
