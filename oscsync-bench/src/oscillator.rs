//! RC oscillator model

use oscsync_hal::TrimValue;
use serde::{Deserialize, Serialize};

/// Trim to frequency mapping of a simulated RC oscillator
///
/// Linear in the trim value. On parts with two overlapping ranges, bit 7
/// selects the upper range, which starts `upper_range_offset` above the
/// lower one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OscillatorModel {
    /// Frequency at trim value 0, in Hz
    pub base_frequency: f64,
    /// Frequency increase per trim step, in Hz
    pub step: f64,
    /// Offset of the upper range, if bit 7 selects a range
    pub upper_range_offset: Option<f64>,
}

impl Default for OscillatorModel {
    /// 7-bit range from 6.4 MHz to 9.7 MHz
    ///
    /// Keeps one bit at 19200 bps below 512 cycles everywhere in the range.
    fn default() -> Self {
        Self {
            base_frequency: 6_400_000.0,
            step: 26_000.0,
            upper_range_offset: None,
        }
    }
}

impl OscillatorModel {
    /// Oscillator frequency in Hz
    pub fn frequency(&self, trim: TrimValue) -> f64 {
        match self.upper_range_offset {
            Some(offset) => {
                let low = f64::from(trim & 0x7F);
                let range = if trim & 0x80 != 0 { offset } else { 0.0 };
                self.base_frequency + range + low * self.step
            }
            None => self.base_frequency + f64::from(trim) * self.step,
        }
    }

    /// Trim value whose frequency is closest to `target`
    pub fn closest_trim(&self, target: f64) -> TrimValue {
        (0..=TrimValue::MAX)
            .min_by(|a, b| {
                let da = (self.frequency(*a) - target).abs();
                let db = (self.frequency(*b) - target).abs();
                da.total_cmp(&db)
            })
            .unwrap_or_default()
    }

    /// Relative deviation of `trim` from `target`
    pub fn error(&self, trim: TrimValue, target: f64) -> f64 {
        self.frequency(trim) / target - 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear() {
        let model = OscillatorModel::default();
        assert_eq!(model.frequency(0), 6_400_000.0);
        assert_eq!(model.frequency(10), 6_660_000.0);
        assert!(model.frequency(0x7F) < 19_200.0 * 512.0);
    }

    #[test]
    fn test_range_split() {
        let model = OscillatorModel {
            upper_range_offset: Some(2_000_000.0),
            ..OscillatorModel::default()
        };
        assert_eq!(model.frequency(0x85), model.frequency(0x05) + 2_000_000.0);
    }

    #[test]
    fn test_closest_trim() {
        let model = OscillatorModel::default();
        // 8 MHz lies between 0x3D (7.986 MHz) and 0x3E (8.012 MHz)
        assert_eq!(model.closest_trim(8_000_000.0), 0x3E);
        assert!(model.error(0x3E, 8_000_000.0).abs() < 0.002);
    }
}
