//! Simulated device
//!
//! Implements the `oscsync-hal` traits on top of an [`OscillatorModel`].
//! Time is advanced by the bench before each handler call; the counter
//! accumulates oscillator cycles at whatever frequency the trim register
//! selects.

use oscsync_hal::{
    CycleCounter, DefaultTrimStore, EdgeInterrupt, EdgeTrigger, OutputPort, ReceiverConfig, Settle,
    SleepControl, SynchReceiver, TrimRegister, TrimValue,
};

use crate::oscillator::OscillatorModel;
use crate::reference::CharacterKind;

/// Receiver clock error beyond which an 8N1 frame is no longer sampled
/// correctly
pub const RECEIVER_TOLERANCE: f64 = 0.04;

/// Simulated timer, external interrupt, USART, trim register and sleep
/// controller
#[derive(Debug, Clone)]
pub struct SimHardware {
    oscillator: OscillatorModel,
    settle: Settle,
    now: f64,
    trim: TrimValue,

    // Counter: `cycles` at `since`, plus whatever elapsed while running
    counter_running: bool,
    cycles: f64,
    since: f64,
    reset_latency: f64,

    trigger: Option<EdgeTrigger>,
    edge_enabled: bool,

    receiver: ReceiverConfig,
    receiver_enabled: bool,
    frame_error: bool,
    rx_buffer: u8,

    interrupts_enabled: bool,
    sleep_enable: bool,
    sleeping: bool,

    trim_writes: u32,
    idle_cycles: u32,
}

impl SimHardware {
    /// Device running at `trim`
    ///
    /// `reset_latency` is the number of cycles between an edge and the
    /// counter reset in its handler.
    pub fn new(
        oscillator: OscillatorModel,
        settle: Settle,
        trim: TrimValue,
        reset_latency: u16,
    ) -> Self {
        Self {
            oscillator,
            settle,
            now: 0.0,
            trim,
            counter_running: false,
            cycles: 0.0,
            since: 0.0,
            reset_latency: f64::from(reset_latency),
            trigger: None,
            edge_enabled: false,
            receiver: ReceiverConfig::default(),
            receiver_enabled: false,
            frame_error: false,
            rx_buffer: 0,
            interrupts_enabled: true,
            sleep_enable: false,
            sleeping: false,
            trim_writes: 0,
            idle_cycles: 0,
        }
    }

    /// Advance simulated time to `at` seconds
    pub fn advance(&mut self, at: f64) {
        self.now = self.now.max(at);
    }

    /// Current simulated time, in seconds
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Current oscillator frequency, in Hz
    pub fn frequency(&self) -> f64 {
        self.oscillator.frequency(self.trim)
    }

    /// Whether a line transition to `high` raises the edge interrupt
    pub fn edge_fires(&self, high: bool) -> bool {
        if !self.edge_enabled || !self.interrupts_enabled {
            return false;
        }
        match self.trigger {
            Some(EdgeTrigger::Falling) | Some(EdgeTrigger::LowLevel) => !high,
            Some(EdgeTrigger::Rising) => high,
            None => false,
        }
    }

    /// Whether the receiver is listening
    pub fn receiver_enabled(&self) -> bool {
        self.receiver_enabled
    }

    /// Clear the sleep state; returns whether the device was asleep
    pub fn wake(&mut self) -> bool {
        core::mem::replace(&mut self.sleeping, false)
    }

    /// Complete reception of a character with bit time `bit_time`
    ///
    /// A BREAK always fails the stop bit. A byte is sampled correctly
    /// only while the receiver clock, derived from the oscillator by the
    /// baud rate register, is within [`RECEIVER_TOLERANCE`] of the
    /// reference.
    pub fn complete_frame(&mut self, kind: CharacterKind, bit_time: f64) {
        match kind {
            CharacterKind::Break => {
                self.frame_error = true;
                self.rx_buffer = 0;
            }
            CharacterKind::Byte(byte) => {
                let error = self.receiver_bit_time() / bit_time - 1.0;
                self.frame_error = error.abs() > RECEIVER_TOLERANCE;
                self.rx_buffer = if self.frame_error { 0xFF } else { byte };
            }
        }
    }

    /// Bit time the receiver samples at, in seconds
    pub fn receiver_bit_time(&self) -> f64 {
        16.0 * (f64::from(self.receiver.baud_register) + 1.0) / self.frequency()
    }

    /// Trim register writes so far
    pub fn trim_writes(&self) -> u32 {
        self.trim_writes
    }

    /// Idle cycles spent settling the oscillator
    pub fn idle_cycles(&self) -> u32 {
        self.idle_cycles
    }

    fn elapsed_cycles(&self) -> f64 {
        if self.counter_running {
            self.cycles + (self.now - self.since) * self.frequency()
        } else {
            self.cycles
        }
    }
}

impl CycleCounter for SimHardware {
    fn start_counter(&mut self) {
        if !self.counter_running {
            self.since = self.now;
            self.counter_running = true;
        }
    }

    fn stop_counter(&mut self) {
        self.cycles = self.elapsed_cycles();
        self.counter_running = false;
    }

    fn counter_value(&self) -> u8 {
        (self.elapsed_cycles().max(0.0) as u32 & 0xFF) as u8
    }

    fn counter_overflowed(&self) -> bool {
        self.elapsed_cycles() >= 256.0
    }

    fn reset_counter(&mut self) {
        // Counting resumes once the handler has finished its sequence
        self.cycles = -self.reset_latency;
        self.since = self.now;
    }
}

impl EdgeInterrupt for SimHardware {
    fn configure_input(&mut self) {
        self.edge_enabled = false;
    }

    fn arm_edge(&mut self, trigger: EdgeTrigger) {
        self.trigger = Some(trigger);
        self.edge_enabled = true;
    }

    fn clear_edge_pending(&mut self) {}

    fn disable_edge(&mut self) {
        self.edge_enabled = false;
    }
}

impl SynchReceiver for SimHardware {
    fn configure_receiver(&mut self, config: ReceiverConfig) {
        self.receiver = config;
        self.receiver_enabled = true;
    }

    fn enable_receiver(&mut self) {
        self.receiver_enabled = true;
    }

    fn disable_receiver(&mut self) {
        self.receiver_enabled = false;
    }

    fn frame_error(&self) -> bool {
        self.frame_error
    }

    fn read_received_byte(&mut self) -> u8 {
        self.frame_error = false;
        self.rx_buffer
    }
}

impl TrimRegister for SimHardware {
    fn trim(&self) -> TrimValue {
        self.trim
    }

    fn write_trim(&mut self, value: TrimValue) {
        // Cycles so far were counted at the old frequency
        if self.counter_running {
            self.cycles = self.elapsed_cycles();
            self.since = self.now;
        }
        self.trim = value;
        self.trim_writes += 1;
    }

    fn idle(&mut self, cycles: u8) {
        self.idle_cycles += u32::from(cycles);
    }

    fn settle(&self) -> Settle {
        self.settle
    }
}

impl SleepControl for SimHardware {
    fn disable_interrupts(&mut self) {
        self.interrupts_enabled = false;
    }

    fn set_sleep_enable(&mut self, enable: bool) {
        self.sleep_enable = enable;
    }

    fn enable_interrupts_and_sleep(&mut self) {
        self.interrupts_enabled = true;
        self.sleeping = self.sleep_enable;
    }
}

/// Simulated EEPROM holding the default trim value
#[derive(Debug, Clone)]
pub struct SimStore {
    bytes: Vec<u8>,
    busy_polls: u32,
    polls: u32,
}

impl SimStore {
    /// Erased store of `size` bytes with `value` programmed at `address`
    ///
    /// The store reports a write in progress for the first `busy_polls`
    /// polls.
    pub fn new(size: usize, address: u16, value: u8, busy_polls: u32) -> Self {
        let mut bytes = vec![0xFF; size];
        if let Some(byte) = bytes.get_mut(usize::from(address)) {
            *byte = value;
        }
        Self {
            bytes,
            busy_polls,
            polls: 0,
        }
    }

    /// Busy polls performed
    pub fn polls(&self) -> u32 {
        self.polls
    }
}

impl DefaultTrimStore for SimStore {
    fn wait_write_complete(&mut self) {
        while self.busy_polls > 0 {
            self.busy_polls -= 1;
            self.polls += 1;
        }
    }

    fn read_byte(&mut self, address: u16) -> u8 {
        if self.busy_polls > 0 {
            log::warn!("store read at {address:#06x} while a write is pending");
        }
        self.bytes.get(usize::from(address)).copied().unwrap_or(0xFF)
    }
}

/// Simulated output port, keeping every value written
#[derive(Debug, Clone, Default)]
pub struct SimPort {
    history: Vec<u8>,
}

impl SimPort {
    /// Values written, oldest first
    pub fn history(&self) -> &[u8] {
        &self.history
    }
}

impl OutputPort for SimPort {
    fn write_port(&mut self, value: u8) {
        self.history.push(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hardware() -> SimHardware {
        // Exactly 8 MHz at trim 0
        let oscillator = OscillatorModel {
            base_frequency: 8_000_000.0,
            step: 40_000.0,
            upper_range_offset: None,
        };
        SimHardware::new(oscillator, Settle::Single, 0, 17)
    }

    fn capture(hw: &mut SimHardware) -> u16 {
        hw.stop_counter();
        let count = u16::from(hw.counter_value()) | (u16::from(hw.counter_overflowed()) << 8);
        hw.reset_counter();
        hw.start_counter();
        count
    }

    #[test]
    fn test_nine_bit_measurement() {
        let mut hw = hardware();
        capture(&mut hw);

        // 416.5 cycles at 8 MHz, minus the reset latency
        hw.advance(416.5 / 8e6);
        assert_eq!(capture(&mut hw), 399);
    }

    #[test]
    fn test_counter_truncates_past_nine_bits() {
        let mut hw = hardware();
        capture(&mut hw);

        hw.advance(800.5 / 8e6);
        // 800 - 17 = 783 cycles: low byte 0x0F, overflow set
        assert_eq!(capture(&mut hw), 0x10F);
    }

    #[test]
    fn test_trim_change_mid_count() {
        let mut hw = hardware();
        capture(&mut hw);

        hw.advance(200.5 / 8e6);
        hw.write_trim(25); // 9 MHz
        hw.advance(hw.now() + 225.0 / 9e6);
        // 200.5 + 225 - 17
        assert_eq!(capture(&mut hw), 408);
    }

    #[test]
    fn test_edge_sense() {
        let mut hw = hardware();
        assert!(!hw.edge_fires(false));

        hw.arm_edge(EdgeTrigger::Rising);
        assert!(hw.edge_fires(true));
        assert!(!hw.edge_fires(false));

        hw.arm_edge(EdgeTrigger::LowLevel);
        assert!(hw.edge_fires(false));

        hw.disable_interrupts();
        assert!(!hw.edge_fires(false));
    }

    #[test]
    fn test_receiver_tolerance() {
        let mut hw = hardware();
        hw.configure_receiver(ReceiverConfig::default());
        let bit_time = 1.0 / 19_200.0;

        hw.complete_frame(CharacterKind::Byte(0x3C), bit_time);
        assert!(!hw.frame_error());
        assert_eq!(hw.read_received_byte(), 0x3C);

        hw.write_trim(25);
        hw.complete_frame(CharacterKind::Byte(0x3C), bit_time);
        assert!(hw.frame_error());

        hw.write_trim(0);
        hw.complete_frame(CharacterKind::Break, bit_time);
        assert!(hw.frame_error());
    }

    #[test]
    fn test_sleep_until_woken() {
        let mut hw = hardware();
        hw.disable_interrupts();
        hw.set_sleep_enable(true);
        hw.enable_interrupts_and_sleep();
        assert!(hw.wake());
        assert!(!hw.wake());
    }

    #[test]
    fn test_store_waits() {
        let mut store = SimStore::new(512, 0x10, 0x42, 3);
        assert_eq!(store.read_when_ready(0x10), 0x42);
        assert_eq!(store.polls(), 3);
        assert_eq!(store.read_byte(0x11), 0xFF);
    }
}
