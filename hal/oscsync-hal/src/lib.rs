//! Hardware abstraction for RC oscillator synchronization
//!
//! This crate defines the hardware services the synchronization core
//! consumes. A chip-specific crate maps each trait onto its registers
//! (timer/counter, external interrupt, USART, OSCCAL, EEPROM), and the
//! bench crate maps them onto a simulated oscillator and reference line.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  oscsync-core (state machine, search)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  oscsync-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ chip register │       │ oscsync-bench │
//! │   bindings    │       │  (simulated)  │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`counter::CycleCounter`] - Free-running cycle counter
//! - [`edge::EdgeInterrupt`] - Edge-triggered external interrupt
//! - [`uart::SynchReceiver`] - Serial receiver with frame error detection
//! - [`trim::TrimRegister`] - Oscillator trim register
//! - [`power::SleepControl`] - Interrupt enable and sleep entry
//! - [`store::DefaultTrimStore`] - Persisted default trim value
//! - [`gpio::OutputPort`] - Parallel output port

#![no_std]
#![deny(unsafe_code)]

pub mod counter;
pub mod edge;
pub mod gpio;
pub mod power;
pub mod store;
pub mod trim;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use counter::{CounterWidth, CycleCount, CycleCounter};
pub use edge::{EdgeInterrupt, EdgeTrigger};
pub use gpio::OutputPort;
pub use power::SleepControl;
pub use store::DefaultTrimStore;
pub use trim::{Settle, TrimRegister, TrimValue};
pub use uart::{ReceiverConfig, SynchReceiver};

/// Every hardware service the synchronizer drives from its handlers
///
/// The default trim store is not part of this bundle; it is only read
/// once at initialization by the threshold search.
pub trait SynchHardware:
    CycleCounter + EdgeInterrupt + SynchReceiver + TrimRegister + SleepControl
{
}

// Blanket implementation
impl<T> SynchHardware for T where
    T: CycleCounter + EdgeInterrupt + SynchReceiver + TrimRegister + SleepControl
{
}
