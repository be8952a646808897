//! Serial receiver abstraction
//!
//! Only reception is needed: the receiver detects BREAK conditions through
//! its frame error flag and hands over the data byte that follows the
//! SYNCH byte(s).

/// Receiver setup applied once at initialization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReceiverConfig {
    /// Baud rate register value giving the reference bit rate at the
    /// target oscillator frequency
    pub baud_register: u16,
    /// Raise the receive-complete interrupt for every frame
    pub receive_interrupt: bool,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            baud_register: 25,
            receive_interrupt: true,
        }
    }
}

/// Serial receiver with frame error detection
pub trait SynchReceiver {
    /// Program the baud rate and interrupt enable
    ///
    /// Leaves the receiver enabled.
    fn configure_receiver(&mut self, config: ReceiverConfig);

    /// Enable reception (and the receive interrupt if configured)
    fn enable_receiver(&mut self);

    /// Disable reception
    fn disable_receiver(&mut self);

    /// Whether the frame in the receive buffer had a missing stop bit
    ///
    /// A BREAK on the line always produces a frame error.
    fn frame_error(&self) -> bool;

    /// Read the receive buffer
    ///
    /// Reading is what clears the receive-complete condition, so it must
    /// happen even when the byte is not used.
    fn read_received_byte(&mut self) -> u8;
}
