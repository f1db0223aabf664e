use std::fmt;

use serde::{Deserialize, Serialize};

/// Qualitative risk bucket shown next to a shortlisted instrument.
///
/// Purely cosmetic: it never influences ranking or inclusion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskTier {
    VerySafe,
    Safe,
}

impl RiskTier {
    /// Returns the icon used in the formatted report.
    pub fn icon(&self) -> &'static str {
        match self {
            RiskTier::VerySafe => "💎",
            RiskTier::Safe => "🛡️",
        }
    }
}

/// Reason an instrument did not pass the eligibility stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rejection {
    /// Average or notional volume is under the liquidity floor.
    LowLiquidity,
    /// Latest close is below the long rolling mean.
    Downtrend,
    /// RSI is above the momentum bound.
    Overextended,
    /// Best genome's fitness is under the profitability threshold.
    WeakFitness,
    /// Best genome does not fire on the most recent row.
    NoLiveSignal,
    /// No genome in any generation ever fired on the training data.
    NoViableGenome,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Rejection::LowLiquidity => "low liquidity",
            Rejection::Downtrend => "downtrend",
            Rejection::Overextended => "overextended",
            Rejection::WeakFitness => "weak fitness",
            Rejection::NoLiveSignal => "no live signal",
            Rejection::NoViableGenome => "no viable genome",
        };
        f.write_str(reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_reads_as_a_phrase() {
        assert_eq!(Rejection::NoLiveSignal.to_string(), "no live signal");
        assert_eq!(RiskTier::VerySafe.icon(), "💎");
    }
}
