use crate::error::ScreeningError;
use api_client::FetchFailure;
use configuration::EligibilityMode;
use core_types::{Rejection, ScoredCandidate};
use uuid::Uuid;

/// What happened to one instrument.
#[derive(Debug, Clone, PartialEq)]
pub enum InstrumentOutcome {
    /// Eligible and below the loss-probability threshold.
    Accepted(ScoredCandidate),
    /// Eligible, but the simulation found it too risky.
    RejectedByRisk(ScoredCandidate),
    Ineligible(Rejection),
    /// Could not be evaluated; see the error.
    Skipped(ScreeningError),
}

impl InstrumentOutcome {
    pub fn is_eligible(&self) -> bool {
        matches!(
            self,
            InstrumentOutcome::Accepted(_) | InstrumentOutcome::RejectedByRisk(_)
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentResult {
    pub symbol: String,
    /// Seed of the instrument's own generator, for replaying it in isolation.
    pub seed: u64,
    pub outcome: InstrumentOutcome,
}

/// Everything one screening run produced.
#[derive(Debug)]
pub struct ScreeningSummary {
    pub run_id: Uuid,
    pub seed: u64,
    pub strategy: EligibilityMode,
    /// One entry per retrieved instrument, in universe order.
    pub results: Vec<InstrumentResult>,
    /// Symbols whose history could not be retrieved.
    pub failures: Vec<FetchFailure>,
}

impl ScreeningSummary {
    pub fn fetched(&self) -> usize {
        self.results.len()
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, InstrumentOutcome::Skipped(_)))
    }

    pub fn ineligible(&self) -> usize {
        self.count(|o| matches!(o, InstrumentOutcome::Ineligible(_)))
    }

    pub fn eligible(&self) -> usize {
        self.count(InstrumentOutcome::is_eligible)
    }

    pub fn accepted(&self) -> usize {
        self.count(|o| matches!(o, InstrumentOutcome::Accepted(_)))
    }

    /// Candidates that passed the risk simulation, in universe order.
    pub fn accepted_candidates(&self) -> Vec<ScoredCandidate> {
        self.results
            .iter()
            .filter_map(|r| match &r.outcome {
                InstrumentOutcome::Accepted(scored) => Some(scored.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn log(&self) {
        for result in &self.results {
            match &result.outcome {
                InstrumentOutcome::Skipped(error) => {
                    tracing::warn!(symbol = %result.symbol, %error, "Instrument skipped.")
                }
                InstrumentOutcome::Ineligible(reason) => {
                    tracing::debug!(symbol = %result.symbol, %reason, "Instrument ineligible.")
                }
                InstrumentOutcome::RejectedByRisk(scored) => tracing::info!(
                    symbol = %result.symbol,
                    loss_probability = scored.simulation.loss_probability,
                    "Rejected by risk simulation."
                ),
                InstrumentOutcome::Accepted(scored) => tracing::info!(
                    symbol = %result.symbol,
                    loss_probability = scored.simulation.loss_probability,
                    upside = scored.simulation.expected_upside_pct,
                    "Accepted."
                ),
            }
        }

        tracing::info!(
            run_id = %self.run_id,
            seed = self.seed,
            strategy = %self.strategy,
            fetch_failures = self.failures.len(),
            fetched = self.fetched(),
            skipped = self.skipped(),
            ineligible = self.ineligible(),
            eligible = self.eligible(),
            accepted = self.accepted(),
            "Screening run finished."
        );
    }

    fn count(&self, pred: impl Fn(&InstrumentOutcome) -> bool) -> usize {
        self.results.iter().filter(|r| pred(&r.outcome)).count()
    }
}
