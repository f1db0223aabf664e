//! # Screener Ranking & Reporting
//!
//! Orders the candidates that survived the risk simulation, keeps the safest few,
//! and renders the run's single report message.
//!
//! The report always distinguishes "nothing was eligible" from "everything eligible
//! was rejected by the simulation"; see `ReportBody`.

pub mod error;
pub mod ranking;
pub mod report;

pub use error::AnalyzerError;
pub use ranking::Ranker;
pub use report::{Report, ReportBody, escape_markdown, start_notice};
