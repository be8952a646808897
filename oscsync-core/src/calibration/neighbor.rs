//! Binary + neighbor search (two SYNCH bytes)
//!
//! The binary phase walks the whole trim range in `resolution - 1` rounds,
//! aiming for an exact count match. Because the trim to frequency mapping
//! is only roughly monotonic, the rounds left over from the two SYNCH
//! bytes are spent measuring the neighbors of the binary result in the
//! direction of the last correction. The best trim value seen wins.

use core::cmp::Ordering;

use oscsync_hal::{CycleCount, TrimRegister, TrimValue};

use super::{Calibration, Verdict};
use crate::config::SynchConfig;
use crate::state::SynchState;

/// Best trim value measured so far
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BestCandidate {
    /// Trim value that produced the count
    pub trim: TrimValue,
    /// Absolute deviation of its count from the target count
    pub diff: CycleCount,
}

/// Binary search over the full trim range, refined by neighbor search
#[derive(Debug, Clone)]
pub struct BinaryNeighborSearch {
    target_count: CycleCount,
    default_trim: TrimValue,
    initial_step: u8,
    neighbor_rounds: u8,
    /// Direction of the last binary search correction
    sign: i8,
    best: Option<BestCandidate>,
    neighbors_searched: u8,
}

impl BinaryNeighborSearch {
    /// Create a search for the given configuration
    ///
    /// Starts from the middle of the selected trim range with a step of
    /// a quarter of the range.
    pub const fn new(config: &SynchConfig) -> Self {
        Self {
            target_count: config.target_count(),
            default_trim: config.midpoint_trim(),
            initial_step: config.full_range_step(),
            neighbor_rounds: config.neighbor_rounds(),
            sign: 0,
            best: None,
            neighbors_searched: 0,
        }
    }

    /// Best candidate, once the binary phase has completed
    pub fn best(&self) -> Option<BestCandidate> {
        self.best
    }

    /// Neighbor rounds performed in this cycle
    pub fn neighbors_searched(&self) -> u8 {
        self.neighbors_searched
    }

    /// Neighbor rounds performed before converging
    pub fn neighbor_rounds(&self) -> u8 {
        self.neighbor_rounds
    }

    /// Direction the neighbor search moves in
    pub fn sign(&self) -> i8 {
        self.sign
    }

    fn binary_round<T: TrimRegister>(
        &mut self,
        cal_step: &mut u8,
        count: CycleCount,
        trim: &mut T,
    ) -> Verdict {
        let measured = trim.trim();

        match count.cmp(&self.target_count) {
            Ordering::Greater => {
                self.sign = -1;
                trim.set_trim(measured.wrapping_sub(*cal_step));
            }
            Ordering::Less => {
                self.sign = 1;
                trim.set_trim(measured.wrapping_add(*cal_step));
            }
            Ordering::Equal => {}
        }

        *cal_step >>= 1;

        if *cal_step == 0 {
            // The trim register already holds the first neighbor; the
            // value measured this round is the candidate to beat.
            self.neighbors_searched = 0;
            self.best = Some(BestCandidate {
                trim: measured,
                diff: count.abs_diff(self.target_count),
            });
        }

        Verdict::Continue
    }

    fn neighbor_round<T: TrimRegister>(&mut self, count: CycleCount, trim: &mut T) -> Verdict {
        let current = trim.trim();
        let diff = count.abs_diff(self.target_count);

        let best = match self.best {
            Some(best) if best.diff <= diff => best,
            _ => BestCandidate {
                trim: current,
                diff,
            },
        };
        self.best = Some(best);

        self.neighbors_searched += 1;

        if self.neighbors_searched >= self.neighbor_rounds {
            trim.set_trim(best.trim);
            Verdict::Converged
        } else {
            trim.set_trim(current.wrapping_add_signed(self.sign));
            Verdict::Continue
        }
    }
}

impl Calibration for BinaryNeighborSearch {
    fn initial_step(&self) -> u8 {
        self.initial_step
    }

    fn default_trim(&self) -> TrimValue {
        self.default_trim
    }

    fn restart(&mut self) {
        self.sign = 0;
        self.best = None;
        self.neighbors_searched = 0;
    }

    fn search_state(&self, cal_step: u8) -> SynchState {
        if cal_step == 0 {
            SynchState::NeighborSearch
        } else {
            SynchState::BinarySearch
        }
    }

    fn round<T: TrimRegister>(
        &mut self,
        state: SynchState,
        cal_step: &mut u8,
        count: CycleCount,
        trim: &mut T,
    ) -> Verdict {
        match state {
            SynchState::NeighborSearch => self.neighbor_round(count, trim),
            _ => self.binary_round(cal_step, count, trim),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Device;
    use crate::mock::MockHardware;

    fn search(device: Device) -> (BinaryNeighborSearch, MockHardware) {
        let config = SynchConfig::new(device);
        let search = BinaryNeighborSearch::new(&config);
        let mut hw = MockHardware::new();
        hw.trim = search.default_trim();
        (search, hw)
    }

    #[test]
    fn test_start_values() {
        let (search, _) = search(Device::ATtiny2313);
        assert_eq!(search.default_trim(), 0x40);
        assert_eq!(search.initial_step(), 32);
        assert_eq!(search.neighbor_rounds(), 4);
        assert_eq!(search.search_state(32), SynchState::BinarySearch);
        assert_eq!(search.search_state(0), SynchState::NeighborSearch);
    }

    #[test]
    fn test_binary_direction() {
        let (mut search, mut hw) = search(Device::ATtiny2313);
        let target = SynchConfig::new(Device::ATtiny2313).target_count();

        // Counting too many cycles means the clock is fast
        let mut step = 32;
        search.round(SynchState::BinarySearch, &mut step, target + 50, &mut hw);
        assert_eq!(hw.trim, 0x40 - 32);
        assert_eq!(search.sign(), -1);
        assert_eq!(step, 16);

        search.round(SynchState::BinarySearch, &mut step, target - 50, &mut hw);
        assert_eq!(hw.trim, 0x40 - 32 + 16);
        assert_eq!(search.sign(), 1);
        assert_eq!(step, 8);
    }

    #[test]
    fn test_exact_match_keeps_trim() {
        let (mut search, mut hw) = search(Device::ATtiny2313);
        let target = SynchConfig::new(Device::ATtiny2313).target_count();

        let mut step = 32;
        search.round(SynchState::BinarySearch, &mut step, target, &mut hw);
        assert_eq!(hw.trim, 0x40);
        assert!(hw.trim_writes().is_empty());
        assert_eq!(step, 16);
    }

    #[test]
    fn test_last_binary_round_records_measured_trim() {
        let (mut search, mut hw) = search(Device::ATtiny2313);
        let target = SynchConfig::new(Device::ATtiny2313).target_count();

        hw.trim = 0x37;
        let mut step = 1;
        let verdict = search.round(SynchState::BinarySearch, &mut step, target + 3, &mut hw);

        assert_eq!(verdict, Verdict::Continue);
        assert_eq!(step, 0);
        assert_eq!(hw.trim, 0x36);
        // The value in use while counting
        assert_eq!(
            search.best(),
            Some(BestCandidate {
                trim: 0x37,
                diff: 3
            })
        );
        assert_eq!(search.neighbors_searched(), 0);
    }

    #[test]
    fn test_last_binary_round_exact_match() {
        let (mut search, mut hw) = search(Device::ATtiny2313);
        let target = SynchConfig::new(Device::ATtiny2313).target_count();

        hw.trim = 0x37;
        let mut step = 2;
        search.round(SynchState::BinarySearch, &mut step, target + 5, &mut hw);
        assert_eq!(hw.trim, 0x35);
        assert_eq!(search.sign(), -1);
        assert_eq!(step, 1);

        // Direction stays from the previous round, the register is not touched
        let verdict = search.round(SynchState::BinarySearch, &mut step, target, &mut hw);
        assert_eq!(verdict, Verdict::Continue);
        assert_eq!(step, 0);
        assert_eq!(hw.trim, 0x35);
        assert_eq!(hw.trim_writes().len(), 1);
        assert_eq!(search.sign(), -1);
        assert_eq!(
            search.best(),
            Some(BestCandidate {
                trim: 0x35,
                diff: 0
            })
        );
    }

    #[test]
    fn test_neighbor_search_keeps_best() {
        let (mut search, mut hw) = search(Device::ATtiny2313);
        let target = SynchConfig::new(Device::ATtiny2313).target_count();

        hw.trim = 0x50;
        let mut step = 1;
        search.round(SynchState::BinarySearch, &mut step, target - 6, &mut hw);
        assert_eq!(hw.trim, 0x51);

        // 0x51: better
        let verdict = search.round(SynchState::NeighborSearch, &mut step, target - 2, &mut hw);
        assert_eq!(verdict, Verdict::Continue);
        assert_eq!(search.best().map(|b| b.trim), Some(0x51));
        assert_eq!(hw.trim, 0x52);

        // 0x52: overshoots, worse
        search.round(SynchState::NeighborSearch, &mut step, target + 5, &mut hw);
        assert_eq!(search.best().map(|b| b.diff), Some(2));

        // 0x53: equally good does not replace
        search.round(SynchState::NeighborSearch, &mut step, target + 2, &mut hw);
        assert_eq!(search.best().map(|b| b.trim), Some(0x51));

        // Fourth neighbor round is the last for a 7-bit trim
        let verdict = search.round(SynchState::NeighborSearch, &mut step, target + 9, &mut hw);
        assert_eq!(verdict, Verdict::Converged);
        assert_eq!(hw.trim, 0x51);
        assert_eq!(search.neighbors_searched(), 4);
    }

    #[test]
    fn test_eight_bit_neighbor_rounds() {
        let (mut search, mut hw) = search(Device::ATmega32);
        let target = SynchConfig::new(Device::ATmega32).target_count();

        let mut step = 1;
        search.round(SynchState::BinarySearch, &mut step, target + 1, &mut hw);
        let verdicts: [Verdict; 3] = core::array::from_fn(|_| {
            search.round(SynchState::NeighborSearch, &mut step, target + 1, &mut hw)
        });
        assert_eq!(
            verdicts,
            [Verdict::Continue, Verdict::Continue, Verdict::Converged]
        );
    }

    #[test]
    fn test_restart_discards_candidate() {
        let (mut search, mut hw) = search(Device::ATtiny2313);
        let target = SynchConfig::new(Device::ATtiny2313).target_count();

        let mut step = 1;
        search.round(SynchState::BinarySearch, &mut step, target + 1, &mut hw);
        search.round(SynchState::NeighborSearch, &mut step, target, &mut hw);
        assert!(search.best().is_some());

        search.restart();
        assert_eq!(search.best(), None);
        assert_eq!(search.neighbors_searched(), 0);
        assert_eq!(search.sign(), 0);
    }
}
