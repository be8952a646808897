//! Per-part oscillator and counter characteristics
//!
//! Register names differ between parts and live in the platform crate.
//! What the calibration logic needs are the numbers below.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use oscsync_hal::{CounterWidth, Settle};

/// Supported parts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Device {
    ATtiny2313,
    ATmega8,
    ATmega16,
    ATmega32,
    ATmega48,
    ATmega88,
    ATmega168,
    ATmega169,
    ATmega64,
    ATmega128,
}

/// Calibration-relevant characteristics of a part
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceProfile {
    /// Significant bits in the trim register
    pub trim_resolution: u8,
    /// Cycles the counter is stopped for while the 9-bit value is read
    pub read_delay_nine_bit: u16,
    /// Cycles lost between edge and counter reset with the 8-bit counter
    pub read_delay_eight_bit: u16,
    /// Stabilization after a trim write
    pub settle: Settle,
}

impl DeviceProfile {
    /// Counter read delay for the chosen width
    pub const fn read_delay(&self, width: CounterWidth) -> u16 {
        match width {
            CounterWidth::Eight => self.read_delay_eight_bit,
            CounterWidth::Nine => self.read_delay_nine_bit,
        }
    }
}

impl Device {
    /// Look up the characteristics of this part
    pub const fn profile(self) -> DeviceProfile {
        match self {
            Device::ATtiny2313 => DeviceProfile {
                trim_resolution: 7,
                read_delay_nine_bit: 22,
                read_delay_eight_bit: 3,
                settle: Settle::Single,
            },
            Device::ATmega8 | Device::ATmega16 | Device::ATmega32 => DeviceProfile {
                trim_resolution: 8,
                read_delay_nine_bit: 19,
                read_delay_eight_bit: 3,
                settle: Settle::Single,
            },
            Device::ATmega48 | Device::ATmega88 | Device::ATmega168 | Device::ATmega169 => {
                DeviceProfile {
                    trim_resolution: 7,
                    read_delay_nine_bit: 17,
                    read_delay_eight_bit: 3,
                    settle: Settle::Single,
                }
            }
            // OSCCAL write errata: eight cycles before the clock is stable
            Device::ATmega64 | Device::ATmega128 => DeviceProfile {
                trim_resolution: 8,
                read_delay_nine_bit: 19,
                read_delay_eight_bit: 3,
                settle: Settle::Errata,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errata_parts() {
        assert_eq!(Device::ATmega64.profile().settle, Settle::Errata);
        assert_eq!(Device::ATmega128.profile().settle, Settle::Errata);
        assert_eq!(Device::ATmega32.profile().settle, Settle::Single);
        assert_eq!(Device::ATmega128.profile().settle.cycles(), 8);
    }

    #[test]
    fn test_read_delay_by_width() {
        let profile = Device::ATtiny2313.profile();
        assert_eq!(profile.read_delay(CounterWidth::Nine), 22);
        assert_eq!(profile.read_delay(CounterWidth::Eight), 3);
        assert_eq!(Device::ATmega168.profile().read_delay(CounterWidth::Nine), 17);
    }

    #[test]
    fn test_resolutions() {
        assert_eq!(Device::ATtiny2313.profile().trim_resolution, 7);
        assert_eq!(Device::ATmega169.profile().trim_resolution, 7);
        assert_eq!(Device::ATmega8.profile().trim_resolution, 8);
        assert_eq!(Device::ATmega128.profile().trim_resolution, 8);
    }
}
