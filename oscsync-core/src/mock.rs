//! Recording hardware double for unit tests

use std::vec::Vec;

use oscsync_hal::{
    CycleCount, CycleCounter, DefaultTrimStore, EdgeInterrupt, EdgeTrigger, OutputPort,
    ReceiverConfig, Settle, SleepControl, SynchReceiver, TrimRegister, TrimValue,
};

/// Hardware operation, in call order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    StartCounter,
    StopCounter,
    ResetCounter,
    ConfigureInput,
    Arm(EdgeTrigger),
    ClearPending,
    DisableEdge,
    ConfigureReceiver(ReceiverConfig),
    EnableReceiver,
    DisableReceiver,
    ReadReceived,
    WriteTrim(TrimValue),
    Idle(u8),
    DisableInterrupts,
    SleepEnable(bool),
    EnableInterruptsAndSleep,
}

#[derive(Debug)]
pub struct MockHardware {
    pub counter: u8,
    pub overflow: bool,
    pub counter_running: bool,
    pub trigger: Option<EdgeTrigger>,
    pub edge_enabled: bool,
    pub receiver_enabled: bool,
    pub frame_error: bool,
    pub rx_byte: u8,
    pub trim: TrimValue,
    pub settle: Settle,
    pub interrupts_enabled: bool,
    pub sleep_enable: bool,
    pub calls: Vec<Call>,
}

impl MockHardware {
    pub fn new() -> Self {
        Self {
            counter: 0,
            overflow: false,
            counter_running: false,
            trigger: None,
            edge_enabled: false,
            receiver_enabled: false,
            frame_error: false,
            rx_byte: 0,
            trim: 0,
            settle: Settle::Single,
            interrupts_enabled: true,
            sleep_enable: false,
            calls: Vec::new(),
        }
    }

    /// Present `count` to the next capture, splitting off bit 8 into the
    /// overflow flag
    pub fn load_count(&mut self, count: CycleCount) {
        self.counter = (count & 0xFF) as u8;
        self.overflow = count > 0xFF;
    }

    pub fn trim_writes(&self) -> Vec<TrimValue> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::WriteTrim(value) => Some(*value),
                _ => None,
            })
            .collect()
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }
}

impl CycleCounter for MockHardware {
    fn start_counter(&mut self) {
        self.counter_running = true;
        self.calls.push(Call::StartCounter);
    }

    fn stop_counter(&mut self) {
        self.counter_running = false;
        self.calls.push(Call::StopCounter);
    }

    fn counter_value(&self) -> u8 {
        self.counter
    }

    fn counter_overflowed(&self) -> bool {
        self.overflow
    }

    fn reset_counter(&mut self) {
        self.counter = 0;
        self.overflow = false;
        self.calls.push(Call::ResetCounter);
    }
}

impl EdgeInterrupt for MockHardware {
    fn configure_input(&mut self) {
        self.calls.push(Call::ConfigureInput);
    }

    fn arm_edge(&mut self, trigger: EdgeTrigger) {
        self.trigger = Some(trigger);
        self.edge_enabled = true;
        self.calls.push(Call::Arm(trigger));
    }

    fn clear_edge_pending(&mut self) {
        self.calls.push(Call::ClearPending);
    }

    fn disable_edge(&mut self) {
        self.edge_enabled = false;
        self.calls.push(Call::DisableEdge);
    }
}

impl SynchReceiver for MockHardware {
    fn configure_receiver(&mut self, config: ReceiverConfig) {
        self.receiver_enabled = true;
        self.calls.push(Call::ConfigureReceiver(config));
    }

    fn enable_receiver(&mut self) {
        self.receiver_enabled = true;
        self.calls.push(Call::EnableReceiver);
    }

    fn disable_receiver(&mut self) {
        self.receiver_enabled = false;
        self.calls.push(Call::DisableReceiver);
    }

    fn frame_error(&self) -> bool {
        self.frame_error
    }

    fn read_received_byte(&mut self) -> u8 {
        self.calls.push(Call::ReadReceived);
        self.rx_byte
    }
}

impl TrimRegister for MockHardware {
    fn trim(&self) -> TrimValue {
        self.trim
    }

    fn write_trim(&mut self, value: TrimValue) {
        self.trim = value;
        self.calls.push(Call::WriteTrim(value));
    }

    fn idle(&mut self, cycles: u8) {
        self.calls.push(Call::Idle(cycles));
    }

    fn settle(&self) -> Settle {
        self.settle
    }
}

impl SleepControl for MockHardware {
    fn disable_interrupts(&mut self) {
        self.interrupts_enabled = false;
        self.calls.push(Call::DisableInterrupts);
    }

    fn set_sleep_enable(&mut self, enable: bool) {
        self.sleep_enable = enable;
        self.calls.push(Call::SleepEnable(enable));
    }

    fn enable_interrupts_and_sleep(&mut self) {
        self.interrupts_enabled = true;
        self.calls.push(Call::EnableInterruptsAndSleep);
    }
}

/// EEPROM double that reports busy for a number of polls
#[derive(Debug)]
pub struct MockStore {
    pub bytes: [u8; 16],
    pub busy_polls: u8,
    pub polls: u32,
    pub reads: Vec<u16>,
}

impl MockStore {
    pub fn with_byte(address: u16, value: u8) -> Self {
        let mut bytes = [0xFF; 16];
        bytes[address as usize] = value;
        Self {
            bytes,
            busy_polls: 0,
            polls: 0,
            reads: Vec::new(),
        }
    }
}

impl DefaultTrimStore for MockStore {
    fn wait_write_complete(&mut self) {
        while self.busy_polls > 0 {
            self.busy_polls -= 1;
            self.polls += 1;
        }
    }

    fn read_byte(&mut self, address: u16) -> u8 {
        // Reading while a write is pending returns garbage on real parts
        assert_eq!(self.busy_polls, 0, "read before write completed");
        self.reads.push(address);
        self.bytes[address as usize]
    }
}

#[derive(Debug, Default)]
pub struct MockPort {
    pub value: u8,
    pub writes: Vec<u8>,
}

impl OutputPort for MockPort {
    fn write_port(&mut self, value: u8) {
        self.value = value;
        self.writes.push(value);
    }
}
