//! Calibration strategies
//!
//! Both strategies share the skeleton in
//! [`Synchronizer`](crate::sync::Synchronizer): the opening edge of a
//! round only arms the closing edge, and the closing edge hands one
//! measurement to the strategy, which adjusts the trim register and says
//! whether another round is needed.
//!
//! - [`BinaryNeighborSearch`] - two SYNCH bytes: full-range binary search
//!   followed by a search of neighboring trim values
//! - [`ThresholdSearch`] - one SYNCH byte: binary search from a stored
//!   default that stops moving once inside a tolerance band

pub mod neighbor;
pub mod threshold;

pub use neighbor::{BestCandidate, BinaryNeighborSearch};
pub use threshold::{ThresholdSearch, THRESHOLD_INITIAL_STEP};

use oscsync_hal::{CycleCount, TrimRegister, TrimValue};

use crate::state::SynchState;

/// Outcome of one measurement round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Verdict {
    /// Re-arm for the next opening edge
    Continue,
    /// Trim value is final
    Converged,
}

/// A trim search strategy
///
/// [`round`](Self::round) runs inside the edge interrupt between two
/// measurements. It must do a bounded amount of work and touch the
/// hardware only through [`TrimRegister::set_trim`].
pub trait Calibration {
    /// One-time setup, run from [`Synchronizer::init`](crate::sync::Synchronizer::init)
    fn init(&mut self) {}

    /// Binary search step loaded at every restart
    fn initial_step(&self) -> u8;

    /// Trim value loaded at every restart
    fn default_trim(&self) -> TrimValue;

    /// Discard all progress of the current cycle
    fn restart(&mut self);

    /// Search phase entered after the opening edge of a round
    fn search_state(&self, cal_step: u8) -> SynchState;

    /// Consume one measurement
    ///
    /// `state` is the search phase the closing edge was armed for and
    /// `cal_step` the current binary search step, which the strategy
    /// halves as it goes.
    fn round<T: TrimRegister>(
        &mut self,
        state: SynchState,
        cal_step: &mut u8,
        count: CycleCount,
        trim: &mut T,
    ) -> Verdict;
}
