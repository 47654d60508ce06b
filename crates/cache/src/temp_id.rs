//! Temporary ids for optimistically inserted records.

use std::sync::atomic::{AtomicI64, Ordering};

use tasklists_core::types::DbId;

/// Source of placeholder ids for records the server has not confirmed yet.
///
/// Implementations must only hand out negative ids and never repeat one,
/// so a placeholder cannot collide with another placeholder or with a
/// server-assigned (positive) id.
pub trait TempIdGenerator: Send + Sync {
    fn next_id(&self) -> DbId;
}

/// Monotonically decreasing negative counter.
#[derive(Debug)]
pub struct NegativeCounter {
    next: AtomicI64,
}

impl NegativeCounter {
    /// Seed from the current time so ids from separate runs are unlikely to
    /// overlap in logs.
    pub fn from_clock() -> Self {
        Self::starting_at(-chrono::Utc::now().timestamp_millis())
    }

    /// Start at `seed`, clamped to `-1` if it is not negative.
    pub fn starting_at(seed: DbId) -> Self {
        Self {
            next: AtomicI64::new(seed.min(-1)),
        }
    }
}

impl Default for NegativeCounter {
    fn default() -> Self {
        Self::from_clock()
    }
}

impl TempIdGenerator for NegativeCounter {
    fn next_id(&self) -> DbId {
        self.next.fetch_sub(1, Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use super::*;

    #[test]
    fn counts_down_from_seed() {
        let ids = NegativeCounter::starting_at(-1);
        assert_eq!(ids.next_id(), -1);
        assert_eq!(ids.next_id(), -2);
        assert_eq!(ids.next_id(), -3);
    }

    #[test]
    fn non_negative_seed_is_clamped() {
        assert_eq!(NegativeCounter::starting_at(10).next_id(), -1);
        assert_eq!(NegativeCounter::starting_at(0).next_id(), -1);
    }

    #[test]
    fn clock_seed_is_negative() {
        assert!(NegativeCounter::from_clock().next_id() < 0);
    }

    #[test]
    fn ids_are_unique_across_threads() {
        let ids = Arc::new(NegativeCounter::starting_at(-1));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let ids = Arc::clone(&ids);
                std::thread::spawn(move || (0..250).map(|_| ids.next_id()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(id < 0);
                assert!(seen.insert(id), "duplicate temp id {id}");
            }
        }
        assert_eq!(seen.len(), 1000);
    }
}
