//! Sequence numbers for identifiers.

use std::sync::atomic::{AtomicU32, Ordering};

use super::codec::MAX_SEQUENCE;

/// Hands out identifier sequence numbers, wrapping after 999.
///
/// Sequences only need to be distinct within a short window so that the two
/// legs of consecutive entries can be told apart in broker history.
#[derive(Debug, Default)]
pub struct SequenceCounter {
    next: AtomicU32,
}

impl SequenceCounter {
    /// Start counting at `start` (reduced into range).
    #[must_use]
    pub fn starting_at(start: u16) -> Self {
        Self {
            next: AtomicU32::new(u32::from(start) % Self::modulus()),
        }
    }

    /// Take the next sequence number.
    pub fn next_sequence(&self) -> u16 {
        let modulus = Self::modulus();
        let value = self
            .next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                Some((current + 1) % modulus)
            })
            .unwrap_or_default();
        (value % modulus) as u16
    }

    const fn modulus() -> u32 {
        MAX_SEQUENCE as u32 + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequences_increment() {
        let counter = SequenceCounter::default();
        assert_eq!(counter.next_sequence(), 0);
        assert_eq!(counter.next_sequence(), 1);
        assert_eq!(counter.next_sequence(), 2);
    }

    #[test]
    fn test_sequences_wrap_after_999() {
        let counter = SequenceCounter::starting_at(998);
        assert_eq!(counter.next_sequence(), 998);
        assert_eq!(counter.next_sequence(), 999);
        assert_eq!(counter.next_sequence(), 0);
    }

    #[test]
    fn test_start_is_reduced_into_range() {
        let counter = SequenceCounter::starting_at(1_005);
        assert_eq!(counter.next_sequence(), 5);
    }
}
