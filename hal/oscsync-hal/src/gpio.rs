//! GPIO port abstractions

/// Eight-bit parallel output port
///
/// The reference design mirrors every received data byte onto a port so
/// that the result of synchronization can be observed on a logic
/// analyzer.
pub trait OutputPort {
    /// Drive all eight pins
    fn write_port(&mut self, value: u8);
}
