use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RiskError {
    #[error("Simulation parameters from configuration are invalid: {0}")]
    InvalidParameters(String),

    #[error("At least 2 daily returns are required to estimate volatility, got {0}")]
    NotEnoughReturns(usize),

    #[error("The return series contains a non-finite value")]
    NonFiniteReturns,

    #[error("The starting price ({0}) is zero, negative or not representable.")]
    InvalidStartPrice(String),

    #[error("Failed to build the return distribution: {0}")]
    Distribution(String),
}
