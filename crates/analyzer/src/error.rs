use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyzerError {
    #[error("Ranking received invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("{accepted} candidates were accepted but only {eligible} were eligible")]
    InconsistentCounts { eligible: usize, accepted: usize },
}
