use chrono::NaiveDate;
use core_types::CoreError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndicatorError {
    #[error("Indicator received invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Insufficient history: {available} bars available, {required} required")]
    InsufficientHistory { available: usize, required: usize },

    #[error("Non-finite {field} computed on {date}")]
    NonFiniteValue { date: NaiveDate, field: &'static str },

    #[error(transparent)]
    Core(#[from] CoreError),
}
