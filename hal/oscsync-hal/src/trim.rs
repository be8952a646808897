//! Oscillator trim register abstraction

/// Trim register value
///
/// Seven or eight significant bits depending on the part. On parts with
/// two frequency ranges bit 7 selects the range.
pub type TrimValue = u8;

/// Oscillator stabilization requirement after a trim write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Settle {
    /// One idle cycle
    Single,
    /// Eight idle cycles, for parts with the OSCCAL write errata
    /// (ATmega64, ATmega128)
    Errata,
}

impl Settle {
    /// Idle cycles to run after a write
    pub const fn cycles(self) -> u8 {
        match self {
            Settle::Single => 1,
            Settle::Errata => 8,
        }
    }
}

/// Byte-wide oscillator trim register
///
/// # Timing contract
///
/// [`set_trim`](Self::set_trim) is called from inside the edge interrupt,
/// between two measurements. It must complete in a fixed number of cycles:
/// one register write followed by exactly [`Settle::cycles`] idle cycles.
/// Implementations must not add logging, retries or waits of their own,
/// because any extra cycles are counted as oscillator error.
pub trait TrimRegister {
    /// Current trim value
    fn trim(&self) -> TrimValue;

    /// Write the trim register
    fn write_trim(&mut self, value: TrimValue);

    /// Execute `cycles` no-op instructions
    fn idle(&mut self, cycles: u8);

    /// Stabilization requirement of this part
    fn settle(&self) -> Settle;

    /// Write the trim register and let the oscillator stabilize
    fn set_trim(&mut self, value: TrimValue) {
        self.write_trim(value);
        let cycles = self.settle().cycles();
        self.idle(cycles);
    }
}
