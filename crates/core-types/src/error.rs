use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Price series for '{symbol}' is not strictly chronological at {date}")]
    NotChronological { symbol: String, date: NaiveDate },

    #[error("Failed to convert {0} to a floating point value")]
    Conversion(String),

    #[error("Calculation error: {0}")]
    Calculation(String),
}
