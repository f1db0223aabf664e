use thiserror::Error;

/// Failure that aborts the whole run.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("API client error: {0}")]
    ApiClient(#[from] api_client::error::ApiError),

    #[error("Strategy error: {0}")]
    Strategy(#[from] strategies::StrategyError),

    #[error("Indicator error: {0}")]
    Indicator(#[from] indicators::IndicatorError),

    #[error("Risk simulation error: {0}")]
    Risk(#[from] risk::RiskError),

    #[error("Failed to create progress bar template: {0}")]
    ProgressBarTemplate(String),
}

/// Failure confined to one instrument. The instrument is skipped, the run continues.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScreeningError {
    #[error("Indicator error: {0}")]
    Indicator(#[from] indicators::IndicatorError),

    #[error("Strategy error: {0}")]
    Strategy(#[from] strategies::StrategyError),

    #[error("Risk simulation error: {0}")]
    Risk(#[from] risk::RiskError),

    #[error("Run budget of {0} seconds exhausted before the instrument was started")]
    BudgetExhausted(u64),
}
