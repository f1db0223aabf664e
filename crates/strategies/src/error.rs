use core_types::CoreError;
use indicators::IndicatorError;
use optimizer::OptimizerError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StrategyError {
    #[error("Strategy received invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("No indicator rows were supplied for {0}")]
    NoIndicatorRows(String),

    #[error("An error occurred during indicator calculation: {0}")]
    Indicator(#[from] IndicatorError),

    #[error("Genome optimization failed: {0}")]
    Optimizer(#[from] OptimizerError),

    #[error(transparent)]
    Core(#[from] CoreError),
}
