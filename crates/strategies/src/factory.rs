use crate::EligibilityStrategy;
use crate::error::StrategyError;
use crate::learned::LearnedSignal;
use crate::static_filter::StaticFilter;
use configuration::{Config, EligibilityMode};

/// Creates the eligibility strategy selected by `mode`, parameterized from `config`.
pub fn create_strategy(
    mode: EligibilityMode,
    config: &Config,
) -> Result<Box<dyn EligibilityStrategy>, StrategyError> {
    // The compiler will error here if a new EligibilityMode is added but not handled.
    match mode {
        EligibilityMode::Static => {
            let params = config.static_filter.clone();
            Ok(Box::new(StaticFilter::new(params)?))
        }
        EligibilityMode::Learned => Ok(Box::new(LearnedSignal::new(
            config.genetic.clone(),
            config.learned.clone(),
        )?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_the_requested_mode() {
        let config = Config::default();
        for mode in [EligibilityMode::Static, EligibilityMode::Learned] {
            let strategy = create_strategy(mode, &config).unwrap();
            assert_eq!(strategy.mode(), mode);
        }
    }

    #[test]
    fn propagates_invalid_parameters() {
        let mut config = Config::default();
        config.static_filter.volume_window = 0;
        assert!(matches!(
            create_strategy(EligibilityMode::Static, &config),
            Err(StrategyError::InvalidParameters(_))
        ));
    }
}
