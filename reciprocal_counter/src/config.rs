/*!
Configuration management for the reciprocal counter application.
*/

use anyhow::{Context, Result};
use counter_core::constants::TIMEBASE_FREQUENCY;
use counter_core::{CounterError, SchedulerConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub counter: CounterConfig,
    pub display: DisplayConfig,
}

impl AppConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self {
            counter: CounterConfig::default(),
            display: DisplayConfig::default(),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: AppConfig = toml::from_str(&content)
            .with_context(|| "Failed to parse config file as TOML")?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize config to TOML")?;

        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Reject values the counter cannot run with
    pub fn validate(&self) -> counter_core::Result<()> {
        if self.counter.timebase_frequency_hz == 0 {
            return Err(CounterError::config("timebase_frequency_hz must be non-zero"));
        }
        if self.counter.measurement_interval_ms == 0 {
            return Err(CounterError::config("measurement_interval_ms must be non-zero"));
        }
        Ok(())
    }

    /// Scheduler parameters; clock ticks are milliseconds
    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            title: self.display.title.clone(),
            timebase_hz: self.counter.timebase_frequency_hz,
            measurement_interval: self.counter.measurement_interval_ms,
            poll_interval: Duration::from_millis(self.counter.poll_interval_ms),
            show_diagnostics: self.display.show_diagnostics,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Measurement configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterConfig {
    /// Reference timebase frequency in Hz
    pub timebase_frequency_hz: u64,

    /// Time between measurement passes in milliseconds
    pub measurement_interval_ms: u64,

    /// Sleep between input polls in milliseconds
    pub poll_interval_ms: u64,

    /// Input signal fed to the simulated counter
    pub simulated_signal: u64,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            timebase_frequency_hz: TIMEBASE_FREQUENCY,
            measurement_interval_ms: 1000,
            poll_interval_ms: 1,
            simulated_signal: 48_000,
        }
    }
}

/// Display specific configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Title shown at the top of the screen
    pub title: String,

    /// Show register and pipeline internals below the panel
    pub show_diagnostics: bool,

    /// Use terminal colors
    pub use_color: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            title: "Reciprocal Counter".to_string(),
            show_diagnostics: true,
            use_color: true,
        }
    }
}
