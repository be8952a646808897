//! Post-synchronization data path
//!
//! Once the receiver is re-enabled, the byte following the SYNCH byte(s)
//! is handed to whatever protocol layer consumes it. Sinks are called
//! from the receive interrupt and must not block.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Channel;
use oscsync_hal::OutputPort;

/// Consumer of received data bytes
pub trait ByteSink {
    /// Hand over one byte
    ///
    /// Returns `false` if the byte could not be accepted.
    fn deliver(&mut self, byte: u8) -> bool;
}

impl<S: ByteSink + ?Sized> ByteSink for &mut S {
    fn deliver(&mut self, byte: u8) -> bool {
        (**self).deliver(byte)
    }
}

/// Sink that accepts and drops every byte
#[derive(Debug, Clone, Copy, Default)]
pub struct Discard;

impl ByteSink for Discard {
    fn deliver(&mut self, _byte: u8) -> bool {
        true
    }
}

/// Mirrors every byte onto an output port
#[derive(Debug)]
pub struct EchoPort<P> {
    port: P,
}

impl<P: OutputPort> EchoPort<P> {
    /// Wrap an output port
    pub fn new(port: P) -> Self {
        Self { port }
    }

    /// Access the port
    pub fn port(&self) -> &P {
        &self.port
    }

    /// Release the port
    pub fn into_inner(self) -> P {
        self.port
    }
}

impl<P: OutputPort> ByteSink for EchoPort<P> {
    fn deliver(&mut self, byte: u8) -> bool {
        self.port.write_port(byte);
        true
    }
}

/// Pushes bytes into a channel drained by a protocol task
///
/// Full channels drop the byte; the number of dropped bytes is kept.
pub struct ChannelSink<'a, M: RawMutex, const N: usize> {
    channel: &'a Channel<M, u8, N>,
    dropped: u32,
}

impl<'a, M: RawMutex, const N: usize> ChannelSink<'a, M, N> {
    /// Deliver into `channel`
    pub fn new(channel: &'a Channel<M, u8, N>) -> Self {
        Self {
            channel,
            dropped: 0,
        }
    }

    /// Bytes dropped because the channel was full
    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}

impl<M: RawMutex, const N: usize> ByteSink for ChannelSink<'_, M, N> {
    fn deliver(&mut self, byte: u8) -> bool {
        match self.channel.try_send(byte) {
            Ok(()) => true,
            Err(_) => {
                self.dropped = self.dropped.saturating_add(1);
                false
            }
        }
    }
}
