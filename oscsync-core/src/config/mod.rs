//! Configuration types
//!
//! Compile-time synchronization parameters and per-part characteristics.

pub mod device;
pub mod synch;

pub use device::*;
pub use synch::*;
