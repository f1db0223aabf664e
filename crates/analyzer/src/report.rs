use crate::error::AnalyzerError;
use crate::ranking::Ranker;
use chrono::NaiveDate;
use configuration::EligibilityMode;
use core_types::{ReportEntry, ScoredCandidate};
use std::fmt::Write;

/// What the run found, including the two distinct empty outcomes.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportBody {
    /// Nothing passed the eligibility stage.
    NoEligible,
    /// `eligible` instruments passed eligibility, none passed the simulation.
    AllRejected { eligible: usize },
    Shortlist(Vec<ReportEntry>),
}

impl ReportBody {
    /// Plain-text notice for the two empty outcomes; `None` for a shortlist.
    pub fn notice(&self) -> Option<String> {
        match self {
            ReportBody::NoEligible => Some(
                "⚠️ No instrument passed the eligibility stage. The market is not trending, stay in cash."
                    .to_string(),
            ),
            ReportBody::AllRejected { eligible } => Some(format!(
                "⚠️ {} instruments passed eligibility but the risk simulation rejected all of them. No trades.",
                eligible
            )),
            ReportBody::Shortlist(_) => None,
        }
    }
}

/// The single message delivered at the end of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub date: NaiveDate,
    pub strategy: EligibilityMode,
    pub simulation_count: usize,
    pub currency: String,
    pub body: ReportBody,
}

impl Report {
    /// Ranks `accepted` and picks the right body for the counts.
    pub fn build(
        ranker: &Ranker,
        eligible: usize,
        accepted: Vec<ScoredCandidate>,
        date: NaiveDate,
        strategy: EligibilityMode,
        simulation_count: usize,
    ) -> Result<Self, AnalyzerError> {
        if accepted.len() > eligible {
            return Err(AnalyzerError::InconsistentCounts {
                eligible,
                accepted: accepted.len(),
            });
        }

        let body = if eligible == 0 {
            ReportBody::NoEligible
        } else if accepted.is_empty() {
            ReportBody::AllRejected { eligible }
        } else {
            ReportBody::Shortlist(ranker.rank(accepted))
        };

        tracing::info!(
            eligible,
            shortlisted = match &body {
                ReportBody::Shortlist(entries) => entries.len(),
                _ => 0,
            },
            "Report built."
        );

        Ok(Self {
            date,
            strategy,
            simulation_count,
            currency: ranker.params().currency.clone(),
            body,
        })
    }

    pub fn entries(&self) -> &[ReportEntry] {
        match &self.body {
            ReportBody::Shortlist(entries) => entries,
            _ => &[],
        }
    }

    /// Renders the report as Telegram MarkdownV2.
    pub fn to_markdown(&self) -> String {
        match &self.body {
            ReportBody::Shortlist(entries) => self.shortlist_markdown(entries),
            body => escape_markdown(&body.notice().unwrap_or_default()),
        }
    }

    fn shortlist_markdown(&self, entries: &[ReportEntry]) -> String {
        let mut msg = String::from("🦅 *WEEKLY SHORTLIST*\n");
        // Writing into a String cannot fail.
        let date = self.date.format("%d-%m-%Y").to_string();
        let _ = writeln!(msg, "📅 {}", escape_markdown(&date));
        let _ = writeln!(
            msg,
            "{}\n",
            escape_markdown(&format!(
                "Analysis: {} eligibility + {} Monte Carlo scenarios",
                self.strategy, self.simulation_count
            ))
        );

        for entry in entries {
            let price = format!("({:.2} {})", entry.price.round_dp(2), self.currency);
            let _ = writeln!(
                msg,
                "{} *{}* {}",
                entry.icon(),
                escape_markdown(&entry.symbol),
                escape_markdown(&price)
            );

            let mut stats = format!("   Risk: %{:.1} | Upside: %{:.0}", entry.risk, entry.upside);
            if let Some(score) = entry.score {
                let _ = write!(stats, " | Score: {:.3}", score);
            }
            let _ = writeln!(msg, "{}", escape_markdown(&stats));
        }

        msg.push_str("\n⚠️ _Automated analysis, not investment advice\\._");
        msg
    }
}

/// Message sent before market data retrieval begins.
pub fn start_notice(strategy: EligibilityMode, universe_size: usize) -> String {
    escape_markdown(&format!(
        "🚀 Weekly screening started: {} strategy over {} instruments...",
        strategy, universe_size
    ))
}

/// Escapes every character with special meaning in Telegram's MarkdownV2.
pub fn escape_markdown(text: &str) -> String {
    const SPECIAL: &str = r"_*[]()~`>#+-=|{}.!\";
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if SPECIAL.contains(c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
