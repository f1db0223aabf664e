use crate::error::AnalyzerError;
use configuration::RankingParams;
use core_types::{ReportEntry, RiskTier, ScoredCandidate};

/// Orders accepted candidates by simulated loss probability and keeps the top N.
#[derive(Debug, Clone)]
pub struct Ranker {
    params: RankingParams,
    display_suffix: String,
}

impl Ranker {
    pub fn new(
        params: RankingParams,
        display_suffix: impl Into<String>,
    ) -> Result<Self, AnalyzerError> {
        if params.top_n == 0 {
            return Err(AnalyzerError::InvalidParameters(
                "top_n must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            params,
            display_suffix: display_suffix.into(),
        })
    }

    pub fn params(&self) -> &RankingParams {
        &self.params
    }

    /// Ascending by loss probability; upside never affects the order.
    ///
    /// The sort is stable, so equal risks keep their input order.
    pub fn rank(&self, mut accepted: Vec<ScoredCandidate>) -> Vec<ReportEntry> {
        accepted.sort_by(|a, b| {
            a.simulation
                .loss_probability
                .total_cmp(&b.simulation.loss_probability)
        });

        accepted
            .into_iter()
            .take(self.params.top_n)
            .map(|scored| self.entry(scored))
            .collect()
    }

    pub fn classify(&self, risk: f64) -> RiskTier {
        if risk < self.params.very_safe_below {
            RiskTier::VerySafe
        } else {
            RiskTier::Safe
        }
    }

    fn entry(&self, scored: ScoredCandidate) -> ReportEntry {
        let ScoredCandidate {
            candidate,
            simulation,
        } = scored;
        let symbol = candidate
            .symbol
            .strip_suffix(self.display_suffix.as_str())
            .unwrap_or(&candidate.symbol)
            .to_string();

        ReportEntry {
            symbol,
            price: candidate.last_price,
            risk: simulation.loss_probability,
            upside: simulation.expected_upside_pct,
            score: candidate.fitness,
            tier: self.classify(simulation.loss_probability),
            high_upside: simulation.expected_upside_pct > self.params.high_upside_above,
        }
    }
}
