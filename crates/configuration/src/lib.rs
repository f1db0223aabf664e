use crate::error::ConfigError;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;
pub mod universe;

// Re-export the core types to provide a clean public API.
pub use settings::{
    Config, EligibilityMode, GeneticParams, IndicatorParams, LearnedParams, LoggingConfig,
    MarketDataConfig, RankingParams, ScreeningConfig, SimulationParams, StaticFilterParams,
    TelegramConfig, UniverseConfig,
};

/// Environment variable prefix for configuration overrides, e.g.
/// `SCREENER__SIMULATION__SIMULATION_COUNT=5000`.
pub const ENV_PREFIX: &str = "SCREENER";

/// Loads the application configuration.
///
/// Sources are layered: built-in defaults, then the TOML file at `path` (a missing
/// file is not an error), then `SCREENER__*` environment variables. The result is
/// validated before it is returned.
pub fn load_config(path: &str) -> Result<Config, ConfigError> {
    load_layered(path, environment())
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
}

fn load_layered(path: &str, environment: config::Environment) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::with_name(path).required(false))
        .add_source(environment)
        .build()?;

    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    tracing::debug!(path, strategy = %config.screening.strategy, "Configuration loaded.");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(vars: &[(&str, &str)]) -> config::Environment {
        let map: config::Map<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        environment().source(Some(map))
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = load_layered("does-not-exist.toml", env(&[])).unwrap();
        assert_eq!(config.screening.strategy, EligibilityMode::Static);
        assert_eq!(config.simulation.simulation_count, 10_000);
        assert_eq!(config.screening.seed, None);
    }

    #[test]
    fn environment_overrides_the_file() {
        let path = std::env::temp_dir()
            .join(format!("screener-layering-{}.toml", std::process::id()));
        std::fs::write(
            &path,
            "[screening]\nstrategy = \"learned\"\n\n[simulation]\nsimulation_count = 2000\n",
        )
        .unwrap();

        let config = load_layered(
            path.to_str().unwrap(),
            env(&[
                ("SCREENER__SIMULATION__SIMULATION_COUNT", "5000"),
                ("SCREENER__SCREENING__SEED", "42"),
            ]),
        );
        std::fs::remove_file(&path).unwrap();
        let config = config.unwrap();

        assert_eq!(config.simulation.simulation_count, 5000);
        assert_eq!(config.screening.strategy, EligibilityMode::Learned);
        assert_eq!(config.screening.seed, Some(42));
        assert_eq!(config.simulation.horizon_days, 252);
    }

    #[test]
    fn invalid_override_fails_validation() {
        let err = load_layered(
            "does-not-exist.toml",
            env(&[("SCREENER__RANKING__TOP_N", "0")]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }
}
