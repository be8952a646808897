//! Synchronization configuration
//!
//! All parameters are fixed per deployment. Derived values are `const fn`
//! so a firmware can compute and check them at compile time:
//!
//! ```
//! use oscsync_core::config::{Device, SynchConfig};
//!
//! const CONFIG: SynchConfig = SynchConfig::new(Device::ATmega8).validated();
//! const TARGET: u16 = CONFIG.target_count();
//! // 416 cycles per bit, less the 9-bit read delay
//! assert_eq!(TARGET, 397);
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use oscsync_hal::{CounterWidth, CycleCount, ReceiverConfig, Settle, TrimValue};

use super::device::{Device, DeviceProfile};

/// Default oscillator frequency to calibrate towards (Hz)
pub const DEFAULT_TARGET_FREQUENCY: u32 = 8_000_000;

/// Default reference bit rate (bits per second)
pub const DEFAULT_SYNCH_FREQUENCY: u32 = 19_200;

/// Baud rate register value for 19200 bps at 8 MHz
pub const DEFAULT_SYNCH_UBRR: u16 = 25;

/// Default tolerance of the threshold search, in parts per thousand (±1%)
pub const DEFAULT_ACCURACY_PER_MILLE: u16 = 10;

/// Binary + neighbor search rounds available from two SYNCH bytes
///
/// A framed `0x55` has five falling/rising edge pairs, so two bytes give
/// ten measurements in total.
pub const TOTAL_ROUNDS: u8 = 10;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Target or reference frequency is zero
    ZeroFrequency,
    /// Target count does not fit the configured counter width
    TargetCountOverflow,
    /// Counter read delay swallows the whole bit period
    TargetCountUnderflow,
    /// Trim resolution outside 7..=8 bits
    UnsupportedResolution,
    /// Tolerance band reaches zero
    ToleranceTooWide,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::ZeroFrequency => {
                f.write_str("target and reference frequency must be non-zero")
            }
            ConfigError::TargetCountOverflow => {
                f.write_str("target count is larger than the counter can hold")
            }
            ConfigError::TargetCountUnderflow => {
                f.write_str("counter read delay is longer than one bit period")
            }
            ConfigError::UnsupportedResolution => {
                f.write_str("trim resolution must be 7 or 8 bits")
            }
            ConfigError::ToleranceTooWide => f.write_str("tolerance band includes a zero count"),
        }
    }
}

impl core::error::Error for ConfigError {}

/// Synchronization parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SynchConfig {
    /// Part being calibrated
    pub device: Device,
    /// Oscillator frequency to calibrate towards (Hz)
    pub target_frequency: u32,
    /// Bit rate of the reference signal (bits per second)
    pub synch_frequency: u32,
    /// Baud rate register value giving `synch_frequency` at
    /// `target_frequency`
    pub synch_ubrr: u16,
    /// Half-width of the threshold search band, parts per thousand
    pub accuracy_per_mille: u16,
    /// Counter width used for measurements
    pub counter_width: CounterWidth,
    /// Range select bits ORed into the starting trim (0x00 lower range,
    /// 0x80 upper range on parts with two ranges)
    pub trim_range_mask: TrimValue,
    /// Address of the default trim value in the store
    pub default_trim_address: u16,
}

impl Default for SynchConfig {
    fn default() -> Self {
        Self::new(Device::ATtiny2313)
    }
}

impl SynchConfig {
    /// Default parameters for a part
    pub const fn new(device: Device) -> Self {
        Self {
            device,
            target_frequency: DEFAULT_TARGET_FREQUENCY,
            synch_frequency: DEFAULT_SYNCH_FREQUENCY,
            synch_ubrr: DEFAULT_SYNCH_UBRR,
            accuracy_per_mille: DEFAULT_ACCURACY_PER_MILLE,
            counter_width: CounterWidth::Nine,
            trim_range_mask: 0x00,
            default_trim_address: 0x00,
        }
    }

    /// Characteristics of the configured part
    pub const fn profile(&self) -> DeviceProfile {
        self.device.profile()
    }

    /// Significant bits in the trim register
    pub const fn trim_resolution(&self) -> u8 {
        self.device.profile().trim_resolution
    }

    /// Stabilization after a trim write
    pub const fn settle(&self) -> Settle {
        self.device.profile().settle
    }

    /// Cycles lost to reading and restarting the counter
    pub const fn counter_read_delay(&self) -> u16 {
        self.device.profile().read_delay(self.counter_width)
    }

    /// Oscillator cycles per reference bit at the target frequency
    pub const fn cycles_per_bit(&self) -> u32 {
        self.target_frequency / self.synch_frequency
    }

    /// Count expected between two edges at the target frequency
    pub const fn target_count(&self) -> CycleCount {
        self.cycles_per_bit()
            .saturating_sub(self.counter_read_delay() as u32) as CycleCount
    }

    /// Half-width of the threshold search band
    pub const fn synch_limit(&self) -> CycleCount {
        (self.cycles_per_bit() * self.accuracy_per_mille as u32 / 1000) as CycleCount
    }

    /// Lowest count accepted by the threshold search
    pub const fn count_low_limit(&self) -> CycleCount {
        self.target_count().saturating_sub(self.synch_limit())
    }

    /// Highest count accepted by the threshold search
    pub const fn count_high_limit(&self) -> CycleCount {
        self.target_count().saturating_add(self.synch_limit())
    }

    /// Trim value in the middle of the selected range
    pub const fn midpoint_trim(&self) -> TrimValue {
        (1 << (self.trim_resolution() - 1)) | self.trim_range_mask
    }

    /// First binary search step covering the whole trim range
    pub const fn full_range_step(&self) -> u8 {
        1 << (self.trim_resolution() - 2)
    }

    /// Neighbor search rounds left after a full-range binary search
    pub const fn neighbor_rounds(&self) -> u8 {
        TOTAL_ROUNDS - (self.trim_resolution() - 1)
    }

    /// Receiver setup for the reference bit rate
    pub const fn receiver_config(&self) -> ReceiverConfig {
        ReceiverConfig {
            baud_register: self.synch_ubrr,
            receive_interrupt: true,
        }
    }

    /// Check the parameters for consistency
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.target_frequency == 0 || self.synch_frequency == 0 {
            return Err(ConfigError::ZeroFrequency);
        }
        let resolution = self.trim_resolution();
        if resolution < 7 || resolution > 8 {
            return Err(ConfigError::UnsupportedResolution);
        }
        let cycles = self.cycles_per_bit();
        if cycles <= self.counter_read_delay() as u32 {
            return Err(ConfigError::TargetCountUnderflow);
        }
        if cycles - self.counter_read_delay() as u32 > self.counter_width.max_count() as u32 {
            return Err(ConfigError::TargetCountOverflow);
        }
        if self.synch_limit() >= self.target_count() {
            return Err(ConfigError::ToleranceTooWide);
        }
        Ok(())
    }

    /// Return the configuration, refusing to compile (in const context)
    /// or panicking if it is inconsistent
    pub const fn validated(self) -> Self {
        match self.validate() {
            Ok(()) => self,
            Err(ConfigError::ZeroFrequency) => panic!("zero target or reference frequency"),
            Err(ConfigError::TargetCountOverflow) => {
                panic!("target count is larger than the counter")
            }
            Err(ConfigError::TargetCountUnderflow) => {
                panic!("counter read delay longer than one bit period")
            }
            Err(ConfigError::UnsupportedResolution) => panic!("unsupported trim resolution"),
            Err(ConfigError::ToleranceTooWide) => panic!("tolerance band includes zero"),
        }
    }
}
