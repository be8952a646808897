//! External interrupt abstraction
//!
//! The reference signal is wired to both the serial receiver input and an
//! external interrupt pin. The interrupt timestamps the signal edges.

/// External interrupt sense
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EdgeTrigger {
    /// Interrupt while the pin is held low (used to wake from sleep)
    LowLevel,
    /// Interrupt on a high-to-low transition
    Falling,
    /// Interrupt on a low-to-high transition
    Rising,
}

/// Edge-triggered external interrupt
pub trait EdgeInterrupt {
    /// Configure the pin as an input without internal pull-up
    fn configure_input(&mut self);

    /// Select the sense and unmask the interrupt
    ///
    /// Changing the sense may raise a spurious pending flag; callers
    /// follow up with [`clear_edge_pending`](Self::clear_edge_pending).
    fn arm_edge(&mut self, trigger: EdgeTrigger);

    /// Clear the pending interrupt flag
    fn clear_edge_pending(&mut self);

    /// Mask the interrupt
    fn disable_edge(&mut self);
}
