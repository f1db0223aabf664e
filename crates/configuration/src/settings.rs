use crate::error::ConfigError;
use crate::universe;
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
///
/// Every section falls back to its defaults, so an empty (or absent) `config.toml`
/// reproduces the weekly BIST 100 screen.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub universe: UniverseConfig,
    pub market_data: MarketDataConfig,
    pub screening: ScreeningConfig,
    pub indicators: IndicatorParams,
    pub genetic: GeneticParams,
    pub static_filter: StaticFilterParams,
    pub learned: LearnedParams,
    pub simulation: SimulationParams,
    pub ranking: RankingParams,
    pub logging: LoggingConfig,
}

impl Config {
    /// Rejects parameter combinations the numeric engine cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fail = |msg: &str| Err(ConfigError::ValidationError(msg.to_string()));

        if self.universe.symbols.is_empty() {
            return fail("universe.symbols must not be empty");
        }
        if self.market_data.max_concurrent_requests == 0 {
            return fail("market_data.max_concurrent_requests must be at least 1");
        }

        let ind = &self.indicators;
        if ind.short_trend_period == 0 || ind.long_trend_period == 0 || ind.rsi_period == 0 {
            return fail("indicator periods cannot be zero");
        }
        if ind.short_trend_period >= ind.long_trend_period {
            return fail("indicators.short_trend_period must be less than long_trend_period");
        }
        if ind.rsi_period >= ind.long_trend_period {
            return fail("indicators.rsi_period must be less than long_trend_period");
        }

        if self.genetic.population_size < 2 {
            return fail("genetic.population_size must be at least 2");
        }
        if self.genetic.generations == 0 {
            return fail("genetic.generations must be at least 1");
        }
        if !self.genetic.mutation_sigma.is_finite() || self.genetic.mutation_sigma < 0.0 {
            return fail("genetic.mutation_sigma must be a non-negative number");
        }

        if self.static_filter.volume_window == 0 {
            return fail("static_filter.volume_window cannot be zero");
        }
        if !(0.0..=100.0).contains(&self.static_filter.max_rsi) {
            return fail("static_filter.max_rsi must be within [0, 100]");
        }

        if self.simulation.simulation_count == 0 || self.simulation.horizon_days == 0 {
            return fail("simulation_count and horizon_days must be at least 1");
        }
        let threshold = self.simulation.max_loss_probability;
        if !(threshold > 0.0 && threshold <= 100.0) {
            return fail("simulation.max_loss_probability must be within (0, 100]");
        }

        if self.ranking.top_n == 0 {
            return fail("ranking.top_n must be at least 1");
        }

        Ok(())
    }
}

/// The fixed set of instruments screened on every run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UniverseConfig {
    pub symbols: Vec<String>,
    /// Exchange suffix stripped from symbols in the report (e.g. ".IS").
    pub display_suffix: String,
}

impl Default for UniverseConfig {
    fn default() -> Self {
        Self {
            symbols: universe::default_symbols(),
            display_suffix: ".IS".to_string(),
        }
    }
}

/// Settings for the market data provider.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MarketDataConfig {
    pub base_url: String,
    /// Lookback period understood by the provider (e.g. "1y").
    pub range: String,
    /// Bar interval (e.g. "1d").
    pub interval: String,
    pub request_timeout_secs: u64,
    pub max_concurrent_requests: usize,
}

impl Default for MarketDataConfig {
    fn default() -> Self {
        Self {
            base_url: "https://query1.finance.yahoo.com".to_string(),
            range: "1y".to_string(),
            interval: "1d".to_string(),
            request_timeout_secs: 20,
            max_concurrent_requests: 8,
        }
    }
}

/// Selects which eligibility strategy gates instruments before simulation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum EligibilityMode {
    /// Moving-average trend, RSI bound and average-volume floor.
    #[default]
    Static,
    /// Genetic signal fitness, live trigger and notional-volume floor.
    Learned,
}

impl fmt::Display for EligibilityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EligibilityMode::Static => write!(f, "static"),
            EligibilityMode::Learned => write!(f, "learned"),
        }
    }
}

/// Run-level settings for the screening pipeline.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScreeningConfig {
    pub strategy: EligibilityMode,
    /// Master seed for every random draw in the run. `None` draws one from the OS.
    pub seed: Option<u64>,
    /// Wall-clock budget for per-instrument processing.
    pub max_run_seconds: Option<u64>,
}

/// Rolling window lengths for the indicator engine.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IndicatorParams {
    pub short_trend_period: usize,
    pub long_trend_period: usize,
    pub rsi_period: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            short_trend_period: 50,
            long_trend_period: 200,
            rsi_period: 14,
        }
    }
}

/// Parameters for the genetic optimizer.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneticParams {
    pub population_size: usize,
    pub generations: usize,
    /// Standard deviation of the Gaussian noise added to each gene of a child.
    pub mutation_sigma: f64,
}

impl Default for GeneticParams {
    fn default() -> Self {
        Self {
            population_size: 20,
            generations: 10,
            mutation_sigma: 0.1,
        }
    }
}

/// Parameters for the static technical-filter eligibility strategy.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StaticFilterParams {
    pub volume_window: usize,
    pub min_avg_volume: f64,
    /// RSI on the 0-100 scale above which an instrument counts as overextended.
    pub max_rsi: f64,
}

impl Default for StaticFilterParams {
    fn default() -> Self {
        Self {
            volume_window: 20,
            min_avg_volume: 10_000.0,
            max_rsi: 80.0,
        }
    }
}

/// Parameters for the learned (genetic signal) eligibility strategy.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LearnedParams {
    pub min_fitness: f64,
    /// Floor on latest volume times latest close.
    pub min_notional_volume: f64,
}

impl Default for LearnedParams {
    fn default() -> Self {
        Self {
            min_fitness: 0.10,
            min_notional_volume: 10_000_000.0,
        }
    }
}

/// Parameters for the Monte Carlo risk simulator.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    pub simulation_count: usize,
    pub horizon_days: usize,
    /// Candidates are accepted only when their loss probability is strictly below this.
    pub max_loss_probability: f64,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            simulation_count: 10_000,
            horizon_days: 252,
            max_loss_probability: 35.0,
        }
    }
}

/// Parameters for ranking and report formatting.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RankingParams {
    pub top_n: usize,
    /// Risk strictly below this is tiered "very safe".
    pub very_safe_below: f64,
    /// Upside strictly above this is flagged as high upside.
    pub high_upside_above: f64,
    pub currency: String,
}

impl Default for RankingParams {
    fn default() -> Self {
        Self {
            top_n: 8,
            very_safe_below: 10.0,
            high_upside_above: 80.0,
            currency: "TL".to_string(),
        }
    }
}

/// Where log files go in addition to the console.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub directory: Option<PathBuf>,
    pub file_prefix: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: None,
            file_prefix: "screener.log".to_string(),
        }
    }
}

/// Telegram credentials. Read from the environment once at startup and handed to
/// the alerter; empty values disable notification.
#[derive(Debug, Clone, Default)]
pub struct TelegramConfig {
    pub token: String,
    pub chat_id: String,
}

impl TelegramConfig {
    pub const TOKEN_VAR: &'static str = "TELEGRAM_TOKEN";
    pub const CHAT_ID_VAR: &'static str = "TELEGRAM_CHAT_ID";

    pub fn from_env() -> Self {
        Self {
            token: std::env::var(Self::TOKEN_VAR).unwrap_or_default(),
            chat_id: std::env::var(Self::CHAT_ID_VAR).unwrap_or_default(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.token.is_empty() && !self.chat_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_weekly_screen() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.universe.symbols.len(), universe::BIST_100.len());
        assert_eq!(config.genetic.population_size, 20);
        assert_eq!(config.genetic.generations, 10);
        assert_eq!(config.simulation.horizon_days, 252);
        assert_eq!(config.simulation.max_loss_probability, 35.0);
        assert_eq!(config.learned.min_fitness, 0.10);
        assert_eq!(config.ranking.top_n, 8);
        assert_eq!(config.screening.strategy, EligibilityMode::Static);
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config: Config = toml::from_str(
            r#"
            [screening]
            strategy = "learned"
            seed = 7

            [simulation]
            simulation_count = 5000
            "#,
        )
        .unwrap();

        assert_eq!(config.screening.strategy, EligibilityMode::Learned);
        assert_eq!(config.screening.seed, Some(7));
        assert_eq!(config.simulation.simulation_count, 5000);
        assert_eq!(config.simulation.horizon_days, 252);
        assert_eq!(config.indicators.long_trend_period, 200);
    }

    #[test]
    fn rejects_degenerate_population() {
        let mut config = Config::default();
        config.genetic.population_size = 1;
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn rejects_out_of_range_risk_threshold() {
        let mut config = Config::default();
        config.simulation.max_loss_probability = 0.0;
        assert!(config.validate().is_err());
        config.simulation.max_loss_probability = 120.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn telegram_requires_both_values() {
        let partial = TelegramConfig {
            token: "abc".into(),
            chat_id: String::new(),
        };
        assert!(!partial.is_complete());
    }
}
