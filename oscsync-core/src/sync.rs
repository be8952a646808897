//! Synchronization state machine
//!
//! [`Synchronizer`] owns the hardware, the calibration strategy and the
//! data sink. The platform calls its entry points from the matching
//! interrupt handlers:
//!
//! | Interrupt                | Entry point                          |
//! |--------------------------|--------------------------------------|
//! | external interrupt       | [`Synchronizer::on_edge`]            |
//! | USART receive complete   | [`Synchronizer::on_receive`]         |
//! | (main loop, idle)        | [`Synchronizer::enter_sleep`]        |
//!
//! The handlers do not nest, so no locking is needed beyond the exclusive
//! borrow.
//!
//! # Timing
//!
//! [`on_edge`](Synchronizer::on_edge) is part of the measurement it takes:
//! the cycles between the edge and the counter reset are compensated by
//! the configured counter read delay. Everything up to the trim write is
//! straight-line code; logging only happens on convergence.

use oscsync_hal::{
    CounterWidth, CycleCount, EdgeTrigger, ReceiverConfig, SynchHardware, TrimValue,
};

use crate::calibration::{Calibration, Verdict};
use crate::config::SynchConfig;
use crate::datapath::ByteSink;
use crate::state::{EdgeEvent, ReceiveEvent, SynchState};

/// Interrupt-driven oscillator synchronizer
#[derive(Debug)]
pub struct Synchronizer<H, C, S> {
    hw: H,
    calibration: C,
    sink: S,
    counter_width: CounterWidth,
    receiver: ReceiverConfig,
    break_detected: bool,
    state: SynchState,
    cal_step: u8,
}

impl<H, C, S> Synchronizer<H, C, S>
where
    H: SynchHardware,
    C: Calibration,
    S: ByteSink,
{
    /// Create a synchronizer
    ///
    /// Nothing touches the hardware until [`init`](Self::init).
    pub fn new(hw: H, calibration: C, sink: S, config: &SynchConfig) -> Self {
        Self {
            hw,
            calibration,
            sink,
            counter_width: config.counter_width,
            receiver: config.receiver_config(),
            break_detected: false,
            state: SynchState::Measuring,
            cal_step: 0,
        }
    }

    /// Set up the receiver, edge pin and counter
    ///
    /// With the threshold search this blocks until the default trim store
    /// is idle. Call once, before enabling interrupts.
    pub fn init(&mut self) {
        self.hw.configure_receiver(self.receiver);
        self.hw.configure_input();

        // The 9-bit capture restarts the counter on every edge
        if self.counter_width == CounterWidth::Eight {
            self.hw.start_counter();
        }

        self.calibration.init();
        info!("synchronizer ready, waiting for BREAK");
    }

    /// Restart calibration from the beginning
    ///
    /// Called for every frame error. Whatever the current phase, progress
    /// is discarded: the receiver is switched off, the falling edge that
    /// starts the first SYNCH byte is armed and the default trim loaded.
    pub fn restart(&mut self) {
        self.break_detected = true;
        self.state = SynchState::Measuring;
        self.cal_step = self.calibration.initial_step();
        self.calibration.restart();

        self.hw.disable_receiver();
        self.hw.arm_edge(EdgeTrigger::Falling);
        self.hw.clear_edge_pending();
        let trim = self.calibration.default_trim();
        self.hw.set_trim(trim);
    }

    /// External interrupt handler
    pub fn on_edge(&mut self) -> EdgeEvent {
        let count = self.capture();

        if !self.break_detected {
            // The BREAK was missed, e.g. while asleep
            self.hw.set_sleep_enable(false);
            self.restart();
            trace!("edge while idle, calibration restarted");
            return EdgeEvent::Restarted;
        }

        match self.state {
            SynchState::Measuring => {
                self.hw.arm_edge(EdgeTrigger::Rising);
                self.hw.clear_edge_pending();
                let next = self.calibration.search_state(self.cal_step);
                self.enter(next);
                EdgeEvent::Armed(next)
            }
            state => {
                let verdict =
                    self.calibration
                        .round(state, &mut self.cal_step, count, &mut self.hw);
                let trim = self.hw.trim();

                match verdict {
                    Verdict::Continue => {
                        self.hw.arm_edge(EdgeTrigger::Falling);
                        self.hw.clear_edge_pending();
                        self.enter(SynchState::Measuring);
                        EdgeEvent::Measured { count, trim }
                    }
                    Verdict::Converged => {
                        self.finish();
                        info!("synchronized, trim {} (last count {})", trim, count);
                        EdgeEvent::Converged { count, trim }
                    }
                }
            }
        }
    }

    /// Receive complete interrupt handler
    pub fn on_receive(&mut self) -> ReceiveEvent {
        if self.hw.frame_error() {
            self.restart();
            trace!("frame error, calibration restarted");
            return ReceiveEvent::Restarted;
        }

        // Must be read even if nobody wants it, to clear the buffer
        let byte = self.hw.read_received_byte();
        if self.sink.deliver(byte) {
            ReceiveEvent::Delivered(byte)
        } else {
            warn!("received byte {} dropped", byte);
            ReceiveEvent::Dropped(byte)
        }
    }

    /// Prepare for sleep and execute the sleep instruction
    ///
    /// Arms the edge interrupt on low level so that the start of a BREAK
    /// wakes the device. Interrupts stay disabled from the re-arm until
    /// the sleep instruction, so a frame error restart cannot interleave.
    pub fn enter_sleep(&mut self) {
        self.hw.disable_interrupts();
        self.hw.arm_edge(EdgeTrigger::LowLevel);
        self.hw.clear_edge_pending();
        self.hw.set_sleep_enable(true);
        self.hw.enable_interrupts_and_sleep();
    }

    /// Whether a calibration cycle is in progress
    pub fn is_synchronizing(&self) -> bool {
        self.break_detected
    }

    /// Current phase
    pub fn state(&self) -> SynchState {
        self.state
    }

    /// Current binary search step
    pub fn cal_step(&self) -> u8 {
        self.cal_step
    }

    /// Current trim register value
    pub fn trim(&self) -> TrimValue {
        self.hw.trim()
    }

    /// Access the hardware
    pub fn hardware(&self) -> &H {
        &self.hw
    }

    /// Mutable access to the hardware
    pub fn hardware_mut(&mut self) -> &mut H {
        &mut self.hw
    }

    /// Access the calibration strategy
    pub fn calibration(&self) -> &C {
        &self.calibration
    }

    /// Access the data sink
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Read and reset the counter
    fn capture(&mut self) -> CycleCount {
        match self.counter_width {
            CounterWidth::Nine => {
                self.hw.stop_counter();
                let count = CycleCount::from(self.hw.counter_value())
                    | (CycleCount::from(self.hw.counter_overflowed()) << 8);
                self.hw.reset_counter();
                self.hw.start_counter();
                count
            }
            CounterWidth::Eight => {
                let count = CycleCount::from(self.hw.counter_value());
                self.hw.reset_counter();
                count
            }
        }
    }

    fn enter(&mut self, next: SynchState) {
        debug_assert!(self.state.can_transition_to(next));
        self.state = next;
    }

    /// Hand the line back to the receiver
    fn finish(&mut self) {
        self.break_detected = false;
        self.state = SynchState::Measuring;
        self.hw.enable_receiver();
        self.hw.disable_edge();
    }
}
