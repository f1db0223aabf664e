use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum OptimizerError {
    #[error("Optimizer received invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Not enough indicator rows to measure forward returns: {0} available, at least 2 required")]
    NotEnoughData(usize),

    #[error("Non-finite forward return at row {0}")]
    NonFiniteReturn(usize),
}
