use crate::error::ConfigError;
use rust_decimal::Decimal;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{Analysis, Config, LogFormat, Logging, Provider, Server};

/// Prefix of the environment variables that override file values,
/// e.g. `STOCKLENS__PROVIDER__BASE_URL`.
pub const ENV_PREFIX: &str = "STOCKLENS";

/// Loads the application configuration.
///
/// Values are layered as: built-in defaults, then the optional TOML file at
/// `path`, then `STOCKLENS__SECTION__KEY` environment variables. The merged
/// result is validated before it is returned. List values are written
/// comma-separated in the environment, e.g.
/// `STOCKLENS__ANALYSIS__MOVING_AVERAGE_WINDOWS=20,50`.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let builder = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("analysis.moving_average_windows"),
        )
        .build()?;

    let config = builder.try_deserialize::<Config>()?;
    validate(&config)?;

    tracing::debug!(path = %path.display(), "Configuration loaded.");
    Ok(config)
}

/// Checks the cross-field constraints that serde cannot express.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    config
        .classification
        .validate()
        .map_err(|e| ConfigError::ValidationError(e.to_string()))?;
    config
        .oscillator
        .validate()
        .map_err(|e| ConfigError::ValidationError(e.to_string()))?;

    let analysis = &config.analysis;
    if analysis.moving_average_window == 0 {
        return Err(ConfigError::ValidationError(
            "analysis.moving_average_window must be greater than zero".to_string(),
        ));
    }
    if analysis.moving_average_windows.contains(&0) {
        return Err(ConfigError::ValidationError(
            "analysis.moving_average_windows must not contain zero".to_string(),
        ));
    }
    if analysis.display_padding < Decimal::ZERO || analysis.display_padding >= Decimal::ONE {
        return Err(ConfigError::ValidationError(format!(
            "analysis.display_padding must be in [0, 1), got {}",
            analysis.display_padding
        )));
    }
    if analysis.spread_fraction <= Decimal::ZERO || analysis.spread_fraction >= Decimal::ONE {
        return Err(ConfigError::ValidationError(format!(
            "analysis.spread_fraction must be in (0, 1), got {}",
            analysis.spread_fraction
        )));
    }

    if config.provider.base_url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "provider.base_url must not be empty".to_string(),
        ));
    }
    if config.provider.timeout.is_zero() {
        return Err(ConfigError::ValidationError(
            "provider.timeout must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;
    use std::time::Duration;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn file_values_override_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[provider]
base_url = "http://provider.internal:9000"
timeout = "1500ms"

[analysis]
moving_average_window = 10
moving_average_windows = [20, 50]

[classification]
positive = 0.75
neutral = 0.35

[logging]
format = "compact"
"#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.provider.base_url, "http://provider.internal:9000");
        assert_eq!(config.provider.timeout, Duration::from_millis(1500));
        assert_eq!(config.analysis.moving_average_window, 10);
        assert_eq!(config.analysis.moving_average_windows, vec![20, 50]);
        assert_eq!(config.analysis.spread_fraction, dec!(0.05));
        assert_eq!(config.classification.positive, dec!(0.75));
        assert_eq!(config.logging.format, LogFormat::Compact);
    }

    #[test]
    fn inverted_thresholds_are_rejected() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[classification]\npositive = 0.3\nneutral = 0.6").unwrap();

        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn zero_window_is_rejected() {
        let mut config = Config::default();
        config.analysis.moving_average_window = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn zero_trend_window_is_rejected() {
        let mut config = Config::default();
        config.analysis.moving_average_windows = vec![50, 0];
        assert!(validate(&config).is_err());

        config.analysis.moving_average_windows.clear();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn out_of_range_spread_is_rejected() {
        let mut config = Config::default();
        config.analysis.spread_fraction = dec!(1.2);
        assert!(validate(&config).is_err());
    }
}
