//! Simulation driver
//!
//! Replays reference frames against a [`Synchronizer`] running on
//! [`SimHardware`]. Line transitions raise the edge interrupt when it is
//! armed for them; characters the receiver was listening to at their
//! start bit complete half a bit before their end, raising the receive
//! interrupt.

use anyhow::Result;
use oscsync_core::{
    BinaryNeighborSearch, Calibration, EchoPort, EdgeEvent, ReceiveEvent, Synchronizer,
    ThresholdSearch,
};
use oscsync_hal::{CycleCount, TrimValue};

use crate::config::{BenchConfig, Method, STORE_SIZE};
use crate::hardware::{SimHardware, SimPort, SimStore};
use crate::reference::{Frame, ReferenceSignal, CHARACTER_BITS};

/// Synchronizer on simulated hardware
pub type SimSynchronizer<C> = Synchronizer<SimHardware, C, EchoPort<SimPort>>;

/// Calibration result of one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Convergence {
    /// Trim value left in the register
    pub trim: TrimValue,
    /// Count measured in the last round
    pub count: CycleCount,
    /// Oscillator frequency at `trim`, in Hz
    pub frequency: f64,
    /// Relative deviation from the target frequency
    pub error: f64,
}

/// What happened during one reference frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    pub index: usize,
    /// Set if calibration completed within the frame
    pub converged: Option<Convergence>,
    /// Measurements taken
    pub rounds: u32,
    /// Calibration restarts (frame errors and missed BREAKs)
    pub restarts: u32,
    /// Data bytes handed to the sink
    pub received: Vec<u8>,
    /// Whether the device was woken from sleep by the BREAK
    pub woken: bool,
}

/// Outcome of a bench run
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub method: Method,
    pub target_frequency: f64,
    /// Trim value whose frequency is closest to the target
    pub ideal_trim: TrimValue,
    pub frames: Vec<FrameReport>,
}

impl Report {
    /// Whether every frame converged and delivered its data byte
    pub fn all_synchronized(&self, data: u8) -> bool {
        self.frames
            .iter()
            .all(|frame| frame.converged.is_some() && frame.received == [data])
    }

    /// Largest absolute frequency error over the converged frames
    pub fn worst_error(&self) -> Option<f64> {
        self.frames
            .iter()
            .filter_map(|frame| frame.converged.map(|c| c.error.abs()))
            .reduce(f64::max)
    }
}

#[derive(Debug, Clone, Copy)]
enum Event {
    CharacterStart(usize),
    Transition(bool),
    CharacterEnd(usize),
}

impl Event {
    /// Order of simultaneous events
    fn rank(self) -> u8 {
        match self {
            Event::CharacterStart(_) => 0,
            Event::Transition(_) => 1,
            Event::CharacterEnd(_) => 2,
        }
    }
}

/// Reference generator and device under test
pub struct Bench<C> {
    sync: SimSynchronizer<C>,
    signal: ReferenceSignal,
    config: BenchConfig,
    now: f64,
    frames: usize,
}

impl Bench<BinaryNeighborSearch> {
    /// Bench for the binary + neighbor search
    pub fn double(config: &BenchConfig) -> Result<Self> {
        config.validate()?;
        let calibration = BinaryNeighborSearch::new(&config.synch);
        Ok(Self::with_calibration(config, calibration))
    }
}

impl Bench<ThresholdSearch<SimStore>> {
    /// Bench for the threshold search
    pub fn single(config: &BenchConfig) -> Result<Self> {
        config.validate()?;
        let store = SimStore::new(
            STORE_SIZE,
            config.synch.default_trim_address,
            config.stored_default_trim(),
            config.store_busy_polls,
        );
        let calibration = ThresholdSearch::new(store, &config.synch);
        Ok(Self::with_calibration(config, calibration))
    }
}

impl<C: Calibration> Bench<C> {
    fn with_calibration(config: &BenchConfig, calibration: C) -> Self {
        let synch = &config.synch;
        let hw = SimHardware::new(
            config.oscillator,
            synch.settle(),
            config.initial_trim,
            synch.counter_read_delay(),
        );
        let signal = ReferenceSignal::new(
            config.reference.clone(),
            synch.synch_frequency,
            config.synch_bytes(),
        );

        let sink = EchoPort::new(SimPort::default());
        let mut sync = Synchronizer::new(hw, calibration, sink, synch);
        sync.init();
        if config.sleep {
            sync.enter_sleep();
        }

        Self {
            sync,
            signal,
            config: config.clone(),
            now: 0.0,
            frames: 0,
        }
    }

    /// Access the synchronizer
    pub fn synchronizer(&self) -> &SimSynchronizer<C> {
        &self.sync
    }

    /// Send one reference frame and report what the device made of it
    pub fn run_frame(&mut self) -> FrameReport {
        let frame = self.signal.frame(self.now);
        let mut report = FrameReport {
            index: self.frames,
            ..FrameReport::default()
        };
        let mut listening = vec![false; frame.characters.len()];

        for (at, event) in events(&frame) {
            self.sync.hardware_mut().advance(at);

            match event {
                Event::CharacterStart(index) => {
                    listening[index] = self.sync.hardware().receiver_enabled();
                }
                Event::CharacterEnd(index) => {
                    if !listening[index] || !self.sync.hardware().receiver_enabled() {
                        continue;
                    }
                    let kind = frame.characters[index].kind;
                    self.sync
                        .hardware_mut()
                        .complete_frame(kind, frame.bit_time);
                    match self.sync.on_receive() {
                        ReceiveEvent::Restarted => report.restarts += 1,
                        ReceiveEvent::Delivered(byte) => report.received.push(byte),
                        ReceiveEvent::Dropped(byte) => {
                            log::warn!("frame {}: byte {byte:#04x} dropped", report.index)
                        }
                    }
                }
                Event::Transition(high) => {
                    if !self.sync.hardware().edge_fires(high) {
                        continue;
                    }
                    report.woken |= self.sync.hardware_mut().wake();
                    match self.sync.on_edge() {
                        EdgeEvent::Restarted => report.restarts += 1,
                        EdgeEvent::Armed(_) => {}
                        EdgeEvent::Measured { count, trim } => {
                            report.rounds += 1;
                            log::debug!("round {}: count {count}, trim {trim:#04x}", report.rounds);
                        }
                        EdgeEvent::Converged { count, trim } => {
                            report.rounds += 1;
                            report.converged = Some(self.convergence(count, trim));
                        }
                    }
                }
            }
        }

        self.now = frame.end;
        self.frames += 1;
        if self.config.sleep {
            self.sync.enter_sleep();
        }

        match report.converged {
            Some(c) => log::info!(
                "frame {}: trim {:#04x}, {:.0} Hz ({:+.2}%)",
                report.index,
                c.trim,
                c.frequency,
                c.error * 100.0
            ),
            None => log::warn!("frame {}: not synchronized", report.index),
        }
        report
    }

    /// Send `frames` reference frames
    pub fn run(&mut self, frames: usize) -> Vec<FrameReport> {
        (0..frames).map(|_| self.run_frame()).collect()
    }

    fn convergence(&self, count: CycleCount, trim: TrimValue) -> Convergence {
        let target = f64::from(self.config.synch.target_frequency);
        Convergence {
            trim,
            count,
            frequency: self.config.oscillator.frequency(trim),
            error: self.config.oscillator.error(trim, target),
        }
    }
}

/// Run the configured method for the configured number of frames
pub fn run(config: &BenchConfig) -> Result<Report> {
    let frames = match config.method {
        Method::Double => Bench::double(config)?.run(config.frames),
        Method::Single => Bench::single(config)?.run(config.frames),
    };
    let target_frequency = f64::from(config.synch.target_frequency);
    Ok(Report {
        method: config.method,
        target_frequency,
        ideal_trim: config.oscillator.closest_trim(target_frequency),
        frames,
    })
}

/// Time-ordered events of a frame
fn events(frame: &Frame) -> Vec<(f64, Event)> {
    // The receiver samples the stop bit in the middle of the tenth bit
    let stop_sample = (f64::from(CHARACTER_BITS) - 0.5) * frame.bit_time;

    let mut events: Vec<(f64, Event)> = frame
        .characters
        .iter()
        .enumerate()
        .flat_map(|(index, character)| {
            [
                (character.start, Event::CharacterStart(index)),
                (character.start + stop_sample, Event::CharacterEnd(index)),
            ]
        })
        .chain(
            frame
                .transitions
                .iter()
                .map(|tr| (tr.at, Event::Transition(tr.high))),
        )
        .collect();

    events.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.rank().cmp(&b.1.rank())));
    events
}
