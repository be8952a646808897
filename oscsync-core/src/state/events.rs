//! Results of the interrupt entry points
//!
//! The handlers return what they did so that callers (and tests) can
//! observe progress without the core keeping any history.

use oscsync_hal::{CycleCount, TrimValue};

use super::machine::SynchState;

/// What an edge interrupt did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EdgeEvent {
    /// Edge outside a calibration cycle: treated as a missed BREAK and
    /// calibration restarted
    Restarted,
    /// Opening edge of a round; the closing edge is armed
    Armed(SynchState),
    /// A measurement was consumed and another round follows
    Measured {
        /// Counter value captured at this edge
        count: CycleCount,
        /// Trim value after the adjustment
        trim: TrimValue,
    },
    /// The final measurement was consumed and the trim value fixed
    Converged {
        /// Counter value captured at this edge
        count: CycleCount,
        /// Final trim value
        trim: TrimValue,
    },
}

/// What a receive interrupt did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReceiveEvent {
    /// Frame error (BREAK): calibration restarted
    Restarted,
    /// Data byte handed to the sink
    Delivered(u8),
    /// Data byte read but the sink had no room
    Dropped(u8),
}

impl EdgeEvent {
    /// Check if this edge completed calibration
    pub fn is_converged(&self) -> bool {
        matches!(self, EdgeEvent::Converged { .. })
    }
}
