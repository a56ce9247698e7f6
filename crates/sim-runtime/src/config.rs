//! Scenario configuration loaded from YAML.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(String),
    #[error("invalid config: {0}")]
    Parse(String),
    #[error("{0} must not be negative")]
    Negative(&'static str),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e.to_string())
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(e: serde_yaml::Error) -> Self {
        ConfigError::Parse(e.to_string())
    }
}

/// Starting conditions and tuning knobs. Missing keys fall back to defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Opening balance.
    pub starting_money: Decimal,
    /// Opening power capacity in watts.
    pub power_capacity: Decimal,
    /// Currency charged per watt-second of room cooling load. Zero disables
    /// the charge.
    ///
    /// The default of 0.001 deliberately scales down the per-second charge of
    /// `(base + units × 10) × (1 − efficiency)`. Set it to 1 to charge that
    /// formula unscaled.
    pub cooling_cost_per_watt: Decimal,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            starting_money: Decimal::from(2000),
            power_capacity: Decimal::from(1000),
            cooling_cost_per_watt: Decimal::new(1, 3),
        }
    }
}

impl GameConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let cfg: GameConfig = serde_yaml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.starting_money < Decimal::ZERO {
            return Err(ConfigError::Negative("starting_money"));
        }
        if self.power_capacity < Decimal::ZERO {
            return Err(ConfigError::Negative("power_capacity"));
        }
        if self.cooling_cost_per_watt < Decimal::ZERO {
            return Err(ConfigError::Negative("cooling_cost_per_watt"));
        }
        Ok(())
    }
}
