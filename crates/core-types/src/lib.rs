//! # Screener Core Types
//!
//! Layer 0 of the workspace. Every other crate speaks in terms of the records
//! defined here: raw market data (`PriceBar`, `PriceSeries`), derived features
//! (`IndicatorRow`), the optimizer's candidate solution (`Genome`), and the
//! records that flow from eligibility through simulation into the report.

pub mod enums;
pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{Rejection, RiskTier};
pub use error::CoreError;
pub use structs::{
    Candidate, GENE_DIMENSION, Genome, IndicatorRow, PriceBar, PriceSeries, ReportEntry,
    ScoredCandidate, SimulationResult,
};
