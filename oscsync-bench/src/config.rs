//! Bench configuration
//!
//! Loaded from a TOML file. Every section is optional; missing values
//! fall back to an ATtiny2313 at 8 MHz calibrated against 19200 bps.
//!
//! ```toml
//! method = "double"
//! frames = 3
//!
//! [synch]
//! device = "atmega48"
//!
//! [oscillator]
//! base_frequency = 6400000.0
//! step = 26000.0
//! ```

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use oscsync_core::config::TOTAL_ROUNDS;
use oscsync_core::SynchConfig;
use serde::{Deserialize, Serialize};

use crate::oscillator::OscillatorModel;
use crate::reference::ReferenceConfig;

/// Size of the simulated EEPROM
pub const STORE_SIZE: usize = 512;

/// Calibration method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// Binary + neighbor search over two SYNCH bytes
    #[default]
    Double,
    /// Threshold search from a stored default over one SYNCH byte
    Single,
}

impl Method {
    /// SYNCH bytes the method needs per frame
    pub const fn synch_bytes(self) -> u8 {
        match self {
            Method::Double => 2,
            Method::Single => 1,
        }
    }

    /// Most edge pairs measured per frame
    pub const fn rounds(self) -> u8 {
        match self {
            Method::Double => TOTAL_ROUNDS,
            Method::Single => TOTAL_ROUNDS / 2,
        }
    }
}

impl core::fmt::Display for Method {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Method::Double => write!(f, "double"),
            Method::Single => write!(f, "single"),
        }
    }
}

/// Complete bench setup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    pub method: Method,
    /// Reference frames to send
    pub frames: usize,
    /// Put the device to sleep after every frame
    pub sleep: bool,
    /// Trim value the device runs at before the first calibration
    pub initial_trim: u8,
    /// Default trim stored in EEPROM; the middle of the range if unset
    pub default_trim: Option<u8>,
    /// EEPROM polls before a pending write completes
    pub store_busy_polls: u32,
    pub synch: SynchConfig,
    pub oscillator: OscillatorModel,
    pub reference: ReferenceConfig,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            method: Method::default(),
            frames: 3,
            sleep: false,
            initial_trim: 0,
            default_trim: None,
            store_busy_polls: 0,
            synch: SynchConfig::default(),
            oscillator: OscillatorModel::default(),
            reference: ReferenceConfig::default(),
        }
    }
}

impl BenchConfig {
    /// Load and validate a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for values the simulation cannot run
    pub fn validate(&self) -> Result<()> {
        self.synch
            .validate()
            .context("Invalid synchronization settings")?;

        if self.frames == 0 {
            bail!("At least one frame is required");
        }
        if self.oscillator.base_frequency <= 0.0 || self.oscillator.step <= 0.0 {
            bail!("Oscillator frequencies must be positive");
        }
        let address = usize::from(self.synch.default_trim_address);
        if address >= STORE_SIZE {
            bail!("Default trim address {address} outside the {STORE_SIZE} byte store");
        }
        if self.synch_bytes() == 0 {
            bail!("At least one SYNCH byte is required");
        }
        Ok(())
    }

    /// SYNCH bytes per frame
    pub fn synch_bytes(&self) -> u8 {
        self.reference
            .synch_bytes
            .unwrap_or(self.method.synch_bytes())
    }

    /// Default trim programmed into the store
    pub fn stored_default_trim(&self) -> u8 {
        self.default_trim.unwrap_or(self.synch.midpoint_trim())
    }
}

#[cfg(test)]
mod tests {
    use oscsync_core::Device;
    use oscsync_hal::CounterWidth;

    use super::*;

    #[test]
    fn test_parse() {
        let config: BenchConfig = toml::from_str(
            r#"
            method = "single"
            frames = 5
            default_trim = 0x3C

            [synch]
            device = "atmega48"
            counter_width = "nine"

            [reference]
            data = 0x5A
            "#,
        )
        .unwrap();

        assert_eq!(config.method, Method::Single);
        assert_eq!(config.frames, 5);
        assert_eq!(config.synch.device, Device::ATmega48);
        assert_eq!(config.synch.counter_width, CounterWidth::Nine);
        assert_eq!(config.synch.target_frequency, 8_000_000);
        assert_eq!(config.reference.data, 0x5A);
        assert_eq!(config.reference.break_bits, 13);
        assert_eq!(config.stored_default_trim(), 0x3C);
        assert_eq!(config.synch_bytes(), 1);
        config.validate().unwrap();
    }

    #[test]
    fn test_empty_is_default() {
        let config: BenchConfig = toml::from_str("").unwrap();
        assert_eq!(config, BenchConfig::default());
        assert_eq!(config.synch_bytes(), 2);
        assert_eq!(config.stored_default_trim(), 0x40);
    }

    #[test]
    fn test_rejects_invalid_synch() {
        let config = BenchConfig {
            synch: SynchConfig {
                synch_frequency: 0,
                ..SynchConfig::default()
            },
            ..BenchConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_address_outside_store() {
        let config = BenchConfig {
            synch: SynchConfig {
                default_trim_address: 600,
                ..SynchConfig::default()
            },
            ..BenchConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rounds() {
        assert_eq!(Method::Double.rounds(), 10);
        assert_eq!(Method::Single.rounds(), 5);
    }
}
