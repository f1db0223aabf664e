use crate::error::OptimizerError;
use core_types::{Genome, IndicatorRow};

/// Fitness assigned to a genome whose signal never exceeds its threshold.
pub const NO_TRADE_FITNESS: f64 = -1.0;

/// Result of scoring one genome.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub fitness: f64,
    /// Number of days the genome's signal fired.
    pub trade_days: usize,
}

/// Feature rows aligned with the next day's return.
///
/// The last indicator row has no following day and is left out; it is the
/// "today" row the learned strategy uses for its live trigger.
#[derive(Debug, Clone)]
pub struct TrainingSet {
    rows: Vec<IndicatorRow>,
    forward_returns: Vec<f64>,
}

impl TrainingSet {
    pub fn from_rows(rows: &[IndicatorRow]) -> Result<Self, OptimizerError> {
        if rows.len() < 2 {
            return Err(OptimizerError::NotEnoughData(rows.len()));
        }

        let forward_returns = rows
            .windows(2)
            .enumerate()
            .map(|(i, w)| {
                let ret = (w[1].close - w[0].close) / w[0].close;
                if ret.is_finite() {
                    Ok(ret)
                } else {
                    Err(OptimizerError::NonFiniteReturn(i))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            rows: rows[..rows.len() - 1].to_vec(),
            forward_returns,
        })
    }

    /// Number of (row, forward return) pairs.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sum of forward returns over the days where `genome` triggers, or
    /// `NO_TRADE_FITNESS` when it never does.
    pub fn evaluate(&self, genome: &Genome) -> Evaluation {
        let (total, trade_days) = self
            .rows
            .iter()
            .zip(&self.forward_returns)
            .filter(|(row, _)| genome.triggers(row))
            .fold((0.0, 0usize), |(sum, n), (_, ret)| (sum + ret, n + 1));

        if trade_days == 0 {
            Evaluation {
                fitness: NO_TRADE_FITNESS,
                trade_days,
            }
        } else {
            Evaluation {
                fitness: total,
                trade_days,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Days, NaiveDate};

    fn rows(closes: &[f64], rsi: &[f64]) -> Vec<IndicatorRow> {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        closes
            .iter()
            .zip(rsi)
            .enumerate()
            .map(|(i, (&close, &rsi_norm))| IndicatorRow {
                date: start.checked_add_days(Days::new(i as u64)).unwrap(),
                close,
                short_trend: 1.0,
                long_trend: 1.0,
                rsi_norm,
                volatility: 0.02,
            })
            .collect()
    }

    #[test]
    fn needs_at_least_two_rows() {
        let single = rows(&[10.0], &[0.5]);
        assert_eq!(
            TrainingSet::from_rows(&single).unwrap_err(),
            OptimizerError::NotEnoughData(1)
        );
    }

    #[test]
    fn drops_the_last_row() {
        let set = TrainingSet::from_rows(&rows(&[10.0, 11.0, 12.0], &[0.1, 0.2, 0.3])).unwrap();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn sums_next_day_returns_on_trigger_days() {
        // Returns: day0 -> +10%, day1 -> -10%, day2 -> +50%.
        let data = rows(&[10.0, 11.0, 9.9, 14.85], &[0.9, 0.1, 0.9, 0.9]);
        let set = TrainingSet::from_rows(&data).unwrap();

        // Fires only when rsi_norm > 0.5: days 0 and 2.
        let genome = Genome::new([0.0, 0.0, 1.0, 0.0, 0.5]);
        let eval = set.evaluate(&genome);
        assert_eq!(eval.trade_days, 2);
        assert!((eval.fitness - 0.6).abs() < 1e-9);
    }

    #[test]
    fn silent_genome_scores_the_sentinel() {
        let set = TrainingSet::from_rows(&rows(&[10.0, 20.0, 40.0], &[0.5, 0.5, 0.5])).unwrap();
        let genome = Genome::new([1.0, 1.0, 1.0, 1.0, 1.0e9]);
        let eval = set.evaluate(&genome);
        assert_eq!(eval.fitness, NO_TRADE_FITNESS);
        assert_eq!(eval.trade_days, 0);
    }
}
