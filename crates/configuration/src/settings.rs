use core_types::{OscillatorBands, SentimentThresholds};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// The root configuration structure for the entire application.
///
/// Every section has defaults, so an empty file (or no file at all) yields a
/// working configuration pointed at a local provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub provider: Provider,
    pub analysis: Analysis,
    pub classification: SentimentThresholds,
    pub oscillator: OscillatorBands,
    pub server: Server,
    pub logging: Logging,
}

/// Where the recommendation and telemetry provider lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Provider {
    /// Base URL without a trailing slash (e.g., "http://localhost:8000/api").
    pub base_url: String,
    /// Per-request timeout, written as "10s" or "1500ms".
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for Provider {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Parameters of the derived display metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Analysis {
    pub moving_average_window: usize,
    /// Trend averages compared against the current price on the detail view.
    pub moving_average_windows: Vec<usize>,
    /// Fraction added below the minimum and above the maximum of the price axis.
    pub display_padding: Decimal,
    /// Distance of the support/resistance levels from the current price.
    pub spread_fraction: Decimal,
    /// How many of the newest error events the telemetry view lists.
    pub recent_error_limit: usize,
}

impl Default for Analysis {
    fn default() -> Self {
        Self {
            moving_average_window: 5,
            moving_average_windows: vec![50, 200],
            display_padding: dec!(0.005),
            spread_fraction: dec!(0.05),
            recent_error_limit: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Server {
    pub addr: SocketAddr,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
        }
    }
}

/// Output format of the stdout log layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Full,
    Compact,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Logging {
    /// Directory of the daily rolling log file.
    pub directory: PathBuf,
    pub file_prefix: String,
    /// An `EnvFilter` directive, used when `RUST_LOG` is not set.
    pub filter: String,
    pub format: LogFormat,
}

impl Default for Logging {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("logs"),
            file_prefix: "stocklens.log".to_string(),
            filter: "info".to_string(),
            format: LogFormat::Full,
        }
    }
}
