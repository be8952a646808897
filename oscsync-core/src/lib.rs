//! Board-agnostic RC oscillator synchronization
//!
//! Calibrates the internal RC oscillator of a device against an external
//! BREAK/SYNCH reference signal, using only a cycle counter, an external
//! interrupt and the serial receiver:
//!
//! - Configuration and per-part characteristics
//! - Synchronization state machine driven from interrupt handlers
//! - Binary + neighbor search and threshold search strategies
//! - Hand-over of received data after synchronization
//!
//! Hardware access goes through the traits of `oscsync-hal`.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
#[macro_use]
extern crate std;

// This mod MUST go first, so that the others see its macros.
mod fmt;

pub mod calibration;
pub mod config;
pub mod datapath;
pub mod state;
pub mod sync;

#[cfg(test)]
mod mock;

pub use calibration::{BinaryNeighborSearch, Calibration, ThresholdSearch};
pub use config::{Device, SynchConfig};
pub use datapath::{ByteSink, ChannelSink, Discard, EchoPort};
pub use state::{EdgeEvent, ReceiveEvent, SynchState};
pub use sync::Synchronizer;
