//! Persisted default trim value
//!
//! The threshold search restarts every calibration from a stored trim
//! value instead of the middle of the range. The value is programmed into
//! EEPROM together with the firmware and only ever read here.

/// Byte-addressed non-volatile store
///
/// There is no error path: after the pending write has completed the read
/// always succeeds.
pub trait DefaultTrimStore {
    /// Busy-wait until any pending write has completed
    fn wait_write_complete(&mut self);

    /// Read one byte
    fn read_byte(&mut self, address: u16) -> u8;

    /// Wait for the store to become idle, then read one byte
    fn read_when_ready(&mut self, address: u16) -> u8 {
        self.wait_write_complete();
        self.read_byte(address)
    }
}
