//! BREAK/SYNCH reference signal generator
//!
//! A frame is a BREAK, a short idle gap, one or more SYNCH bytes (`0x55`)
//! and a data byte, all at the reference bit rate with 8N1 framing. The
//! frame is emitted as the list of line transitions the device sees,
//! plus the character boundaries the serial receiver synchronizes to.

use serde::{Deserialize, Serialize};

/// Value of a SYNCH byte: alternating bits, one edge per bit time
pub const SYNCH_BYTE: u8 = 0x55;

/// Bits in an 8N1 character, start and stop bit included
pub const CHARACTER_BITS: u32 = 10;

/// Reference frame layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceConfig {
    /// Length of the BREAK, in bit times
    pub break_bits: u32,
    /// Idle time between BREAK and the first SYNCH byte, in bit times
    pub idle_bits: u32,
    /// SYNCH bytes per frame; by default what the method needs
    pub synch_bytes: Option<u8>,
    /// Data byte following the SYNCH bytes
    pub data: u8,
    /// Idle time after the data byte, in bit times
    pub gap_bits: u32,
    /// Relative deviation of the reference bit rate from nominal
    pub bit_rate_error: f64,
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            break_bits: 13,
            idle_bits: 2,
            synch_bytes: None,
            data: 0xA7,
            gap_bits: 20,
            bit_rate_error: 0.0,
        }
    }
}

/// What a character on the line is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharacterKind {
    /// Line held low past the stop bit
    Break,
    /// Regular 8N1 character
    Byte(u8),
}

/// Character boundary, as seen by the serial receiver
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Character {
    /// Time of the falling edge that starts the character, in seconds
    pub start: f64,
    pub kind: CharacterKind,
}

/// Level change on the line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    /// Time in seconds
    pub at: f64,
    /// Level after the change
    pub high: bool,
}

/// One generated reference frame
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub characters: Vec<Character>,
    pub transitions: Vec<Transition>,
    /// Bit time, in seconds
    pub bit_time: f64,
    /// Time the frame ends, in seconds
    pub end: f64,
}

/// Generator for consecutive reference frames
#[derive(Debug, Clone)]
pub struct ReferenceSignal {
    config: ReferenceConfig,
    synch_bytes: u8,
    bit_time: f64,
}

impl ReferenceSignal {
    /// Generator at `bit_rate` bits per second
    pub fn new(config: ReferenceConfig, bit_rate: u32, synch_bytes: u8) -> Self {
        let bit_rate = f64::from(bit_rate) * (1.0 + config.bit_rate_error);
        Self {
            synch_bytes: config.synch_bytes.unwrap_or(synch_bytes),
            config,
            bit_time: 1.0 / bit_rate,
        }
    }

    /// SYNCH bytes per frame
    pub fn synch_bytes(&self) -> u8 {
        self.synch_bytes
    }

    /// Generate a frame starting at `start`, with the line idle (high)
    pub fn frame(&self, start: f64) -> Frame {
        let mut levels = Vec::new();
        let mut characters = Vec::new();
        let mut bit = 0u32;

        characters.push(Character {
            start,
            kind: CharacterKind::Break,
        });
        levels.extend(core::iter::repeat(false).take(self.config.break_bits as usize));
        levels.extend(core::iter::repeat(true).take(self.config.idle_bits as usize));
        bit += self.config.break_bits + self.config.idle_bits;

        let bytes = core::iter::repeat(SYNCH_BYTE)
            .take(usize::from(self.synch_bytes))
            .chain(core::iter::once(self.config.data));
        for byte in bytes {
            characters.push(Character {
                start: start + f64::from(bit) * self.bit_time,
                kind: CharacterKind::Byte(byte),
            });
            levels.extend(character_levels(byte));
            bit += CHARACTER_BITS;
        }

        levels.extend(core::iter::repeat(true).take(self.config.gap_bits as usize));
        bit += self.config.gap_bits;

        let mut transitions = Vec::new();
        let mut line = true;
        for (index, high) in levels.into_iter().enumerate() {
            if high != line {
                transitions.push(Transition {
                    at: start + index as f64 * self.bit_time,
                    high,
                });
                line = high;
            }
        }

        Frame {
            characters,
            transitions,
            bit_time: self.bit_time,
            end: start + f64::from(bit) * self.bit_time,
        }
    }
}

/// Line levels of one 8N1 character, LSB first
fn character_levels(byte: u8) -> impl Iterator<Item = bool> {
    core::iter::once(false)
        .chain((0..8).map(move |bit| byte & (1 << bit) != 0))
        .chain(core::iter::once(true))
}
