//! Threshold binary search (one SYNCH byte)
//!
//! A single `0x55` only yields five measurements, too few to search the
//! whole trim range. The search therefore starts from a stored default
//! trim, known to be close, and only corrects while the count is outside
//! a tolerance band around the target.

use oscsync_hal::{CycleCount, DefaultTrimStore, TrimRegister, TrimValue};

use super::{Calibration, Verdict};
use crate::config::SynchConfig;
use crate::state::SynchState;

/// First step of the threshold search: five rounds, 16 down to 1
pub const THRESHOLD_INITIAL_STEP: u8 = 1 << 4;

/// Single-pass binary search against a tolerance band
#[derive(Debug, Clone)]
pub struct ThresholdSearch<D> {
    store: D,
    address: u16,
    low_limit: CycleCount,
    high_limit: CycleCount,
    default_trim: TrimValue,
}

impl<D: DefaultTrimStore> ThresholdSearch<D> {
    /// Create a search reading its starting trim from `store`
    ///
    /// The store is read in [`Calibration::init`]; until then the
    /// midpoint of the trim range is used.
    pub fn new(store: D, config: &SynchConfig) -> Self {
        Self {
            store,
            address: config.default_trim_address,
            low_limit: config.count_low_limit(),
            high_limit: config.count_high_limit(),
            default_trim: config.midpoint_trim(),
        }
    }

    /// Accepted count range
    pub fn band(&self) -> (CycleCount, CycleCount) {
        (self.low_limit, self.high_limit)
    }

    /// Access the default trim store
    pub fn store(&self) -> &D {
        &self.store
    }
}

impl<D: DefaultTrimStore> Calibration for ThresholdSearch<D> {
    fn init(&mut self) {
        self.default_trim = self.store.read_when_ready(self.address);
        debug!("default trim {} loaded from {}", self.default_trim, self.address);
    }

    fn initial_step(&self) -> u8 {
        THRESHOLD_INITIAL_STEP
    }

    fn default_trim(&self) -> TrimValue {
        self.default_trim
    }

    fn restart(&mut self) {}

    fn search_state(&self, _cal_step: u8) -> SynchState {
        SynchState::BinarySearch
    }

    fn round<T: TrimRegister>(
        &mut self,
        _state: SynchState,
        cal_step: &mut u8,
        count: CycleCount,
        trim: &mut T,
    ) -> Verdict {
        if count > self.high_limit {
            trim.set_trim(trim.trim().wrapping_sub(*cal_step));
        } else if count < self.low_limit {
            trim.set_trim(trim.trim().wrapping_add(*cal_step));
        }

        *cal_step >>= 1;

        if *cal_step == 0 {
            Verdict::Converged
        } else {
            Verdict::Continue
        }
    }
}
