use crate::enums::RiskTier;
use crate::error::CoreError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Number of genes in a `Genome`: four feature weights followed by the decision threshold.
pub const GENE_DIMENSION: usize = 5;

/// One trading day of market data for a single instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

impl PriceBar {
    pub fn close_f64(&self) -> Result<f64, CoreError> {
        to_f64(self.close, "close")
    }

    pub fn high_f64(&self) -> Result<f64, CoreError> {
        to_f64(self.high, "high")
    }

    pub fn low_f64(&self) -> Result<f64, CoreError> {
        to_f64(self.low, "low")
    }

    pub fn volume_f64(&self) -> Result<f64, CoreError> {
        to_f64(self.volume, "volume")
    }
}

fn to_f64(value: Decimal, field: &str) -> Result<f64, CoreError> {
    value
        .to_f64()
        .ok_or_else(|| CoreError::Conversion(format!("{} ({})", field, value)))
}

/// The full daily history of one instrument, ascending by date.
///
/// Construction validates that dates are strictly increasing; once built the
/// series is immutable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, bars: Vec<PriceBar>) -> Result<Self, CoreError> {
        let symbol = symbol.into();
        if let Some(pair) = bars.windows(2).find(|w| w[1].date <= w[0].date) {
            return Err(CoreError::NotChronological {
                symbol,
                date: pair[1].date,
            });
        }
        Ok(Self { symbol, bars })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn latest(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    /// Closing prices as `f64`, in chronological order.
    pub fn closes(&self) -> Result<Vec<f64>, CoreError> {
        self.bars.iter().map(PriceBar::close_f64).collect()
    }

    /// Simple daily percentage returns `(close[t] - close[t-1]) / close[t-1]`.
    ///
    /// The first bar has no previous day and contributes no observation, so the
    /// result has `len() - 1` elements.
    pub fn daily_returns(&self) -> Result<Vec<f64>, CoreError> {
        let closes = self.closes()?;
        closes
            .windows(2)
            .map(|w| {
                if w[0] <= 0.0 {
                    return Err(CoreError::Calculation(format!(
                        "non-positive close {} in '{}'",
                        w[0], self.symbol
                    )));
                }
                Ok((w[1] - w[0]) / w[0])
            })
            .collect()
    }
}

/// Per-day feature vector derived by the indicator engine.
///
/// `date` and `close` identify the bar the features were computed on; the
/// four remaining fields are the optimizer's inputs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRow {
    pub date: NaiveDate,
    pub close: f64,
    /// Close divided by the short (50-bar) rolling mean of close.
    pub short_trend: f64,
    /// Close divided by the long (200-bar) rolling mean of close.
    pub long_trend: f64,
    /// 14-period RSI scaled to [0, 1].
    pub rsi_norm: f64,
    /// Intraday range `(high - low) / close`.
    pub volatility: f64,
}

impl IndicatorRow {
    /// The features in genome weight order.
    pub fn features(&self) -> [f64; GENE_DIMENSION - 1] {
        [self.short_trend, self.long_trend, self.rsi_norm, self.volatility]
    }
}

/// A weight vector plus decision threshold:
/// `[w_short_trend, w_long_trend, w_rsi, w_volatility, threshold]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Genome {
    genes: [f64; GENE_DIMENSION],
}

impl Genome {
    pub fn new(genes: [f64; GENE_DIMENSION]) -> Self {
        Self { genes }
    }

    pub fn genes(&self) -> &[f64; GENE_DIMENSION] {
        &self.genes
    }

    pub fn genes_mut(&mut self) -> &mut [f64; GENE_DIMENSION] {
        &mut self.genes
    }

    pub fn weights(&self) -> &[f64] {
        &self.genes[..GENE_DIMENSION - 1]
    }

    pub fn threshold(&self) -> f64 {
        self.genes[GENE_DIMENSION - 1]
    }

    /// Weighted sum of the row's features.
    pub fn signal(&self, row: &IndicatorRow) -> f64 {
        self.weights()
            .iter()
            .zip(row.features())
            .map(|(w, f)| w * f)
            .sum()
    }

    /// True when the signal strictly exceeds the threshold.
    pub fn triggers(&self, row: &IndicatorRow) -> bool {
        self.signal(row) > self.threshold()
    }
}

/// An instrument that passed the eligibility stage and is handed to the simulator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub symbol: String,
    pub last_price: Decimal,
    /// Best genome found by the optimizer (learned strategy only).
    pub genome: Option<Genome>,
    /// Fitness of `genome` (learned strategy only).
    pub fitness: Option<f64>,
    /// Full daily return history, first day excluded.
    pub returns: Vec<f64>,
}

impl Candidate {
    pub fn new(symbol: impl Into<String>, last_price: Decimal, returns: Vec<f64>) -> Self {
        Self {
            symbol: symbol.into(),
            last_price,
            genome: None,
            fitness: None,
            returns,
        }
    }

    pub fn with_genome(mut self, genome: Genome, fitness: f64) -> Self {
        self.genome = Some(genome);
        self.fitness = Some(fitness);
        self
    }
}

/// Risk and upside statistics of one Monte Carlo run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Share of paths ending strictly below the starting price, in percent.
    pub loss_probability: f64,
    /// Mean terminal price relative to the starting price, in percent.
    pub expected_upside_pct: f64,
    pub mean_terminal_price: f64,
    pub median_terminal_price: f64,
    pub percentile_5: f64,
    pub percentile_95: f64,
}

/// A candidate together with its simulation outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredCandidate {
    pub candidate: Candidate,
    pub simulation: SimulationResult,
}

/// One line of the final shortlist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub symbol: String,
    pub price: Decimal,
    pub risk: f64,
    pub upside: f64,
    pub score: Option<f64>,
    pub tier: RiskTier,
    pub high_upside: bool,
}

impl ReportEntry {
    /// The high-upside rocket takes precedence over the risk tier icon.
    pub fn icon(&self) -> &'static str {
        if self.high_upside {
            "🚀"
        } else {
            self.tier.icon()
        }
    }
}
