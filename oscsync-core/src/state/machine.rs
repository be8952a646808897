//! Synchronization states
//!
//! A calibration cycle alternates between waiting for the falling edge
//! that opens a measurement and consuming the rising edge that closes it.

/// Phase of the calibration cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SynchState {
    /// Waiting for the falling edge that starts a measurement
    #[default]
    Measuring,
    /// Next edge closes a binary search measurement
    BinarySearch,
    /// Next edge closes a neighbor search measurement
    NeighborSearch,
}

impl SynchState {
    /// Check if a transition is one the cycle can take
    ///
    /// Every search round returns to `Measuring` before the next search,
    /// and a search phase is only entered from `Measuring`.
    pub fn can_transition_to(self, next: SynchState) -> bool {
        use SynchState::*;

        matches!(
            (self, next),
            (Measuring, BinarySearch)
                | (Measuring, NeighborSearch)
                | (BinarySearch, Measuring)
                | (NeighborSearch, Measuring)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_measuring() {
        assert_eq!(SynchState::default(), SynchState::Measuring);
    }

    #[test]
    fn test_no_search_to_search() {
        assert!(!SynchState::BinarySearch.can_transition_to(SynchState::NeighborSearch));
        assert!(!SynchState::NeighborSearch.can_transition_to(SynchState::BinarySearch));
        assert!(!SynchState::Measuring.can_transition_to(SynchState::Measuring));
        assert!(SynchState::Measuring.can_transition_to(SynchState::NeighborSearch));
        assert!(SynchState::BinarySearch.can_transition_to(SynchState::Measuring));
    }
}
