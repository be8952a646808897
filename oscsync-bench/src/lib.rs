//! Host-side bench for oscsync
//!
//! Runs the synchronization core against a simulated device: an RC
//! oscillator whose frequency follows the trim register, a cycle counter,
//! an external interrupt and a serial receiver, all fed by a generated
//! BREAK/SYNCH reference signal.
//!
//! ```no_run
//! use oscsync_bench::{run, BenchConfig};
//!
//! let report = run(&BenchConfig::default())?;
//! assert!(report.all_synchronized(0xA7));
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod bench;
pub mod config;
pub mod hardware;
pub mod oscillator;
pub mod reference;

pub use bench::{run, Bench, Convergence, FrameReport, Report};
pub use config::{BenchConfig, Method};
pub use hardware::{SimHardware, SimPort, SimStore};
pub use oscillator::OscillatorModel;
pub use reference::{ReferenceConfig, ReferenceSignal};
