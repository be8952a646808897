//! Synchronization state machine types
//!
//! The state machine is explicit, finite, and deterministic. It is driven
//! only from the edge and receive interrupt entry points of
//! [`Synchronizer`](crate::sync::Synchronizer).

pub mod events;
pub mod machine;

pub use events::{EdgeEvent, ReceiveEvent};
pub use machine::SynchState;
