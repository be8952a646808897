//! Cycle counter abstraction
//!
//! The counter runs at the CPU clock (prescaler 1) so that its value is a
//! direct measure of oscillator cycles between two edges.

/// Counter ticks elapsed between two edges
///
/// Eight bits wide, or nine bits when the overflow flag is folded in.
pub type CycleCount = u16;

/// Effective counter width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CounterWidth {
    /// Plain 8-bit counter, left running between edges
    Eight,
    /// 8-bit counter with the overflow flag used as bit 8
    Nine,
}

impl CounterWidth {
    /// Number of bits
    pub const fn bits(self) -> u8 {
        match self {
            CounterWidth::Eight => 8,
            CounterWidth::Nine => 9,
        }
    }

    /// Largest count the counter can represent
    pub const fn max_count(self) -> CycleCount {
        (1 << self.bits()) - 1
    }
}

/// Free-running 8-bit hardware counter
///
/// The synchronizer reads and clears the counter on every edge, so the
/// implementations must be plain register accesses with no side effects
/// beyond the ones documented here.
pub trait CycleCounter {
    /// Start counting at the CPU clock rate
    fn start_counter(&mut self);

    /// Stop counting (clock source disconnected)
    fn stop_counter(&mut self);

    /// Current 8-bit counter value
    fn counter_value(&self) -> u8;

    /// Whether the counter wrapped since the last [`reset_counter`](Self::reset_counter)
    fn counter_overflowed(&self) -> bool;

    /// Zero the counter and clear the overflow flag
    fn reset_counter(&mut self);
}
