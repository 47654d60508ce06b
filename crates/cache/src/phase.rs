//! Per-mutation lifecycle.

use serde::Serialize;

/// Where a single mutation is in its begin/apply/resolve protocol.
///
/// `Idle → Snapshotting → OptimisticallyApplied → {SettledSuccess,
/// SettledRollback} → Invalidated`. There is no retry state: a retry is a
/// new mutation starting from `Idle`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationPhase {
    #[default]
    Idle,
    Snapshotting,
    OptimisticallyApplied,
    SettledSuccess,
    SettledRollback,
    Invalidated,
}

impl MutationPhase {
    pub fn can_transition_to(self, next: MutationPhase) -> bool {
        use MutationPhase::*;
        matches!(
            (self, next),
            (Idle, Snapshotting)
                | (Snapshotting, OptimisticallyApplied)
                | (OptimisticallyApplied, SettledSuccess)
                | (OptimisticallyApplied, SettledRollback)
                | (SettledSuccess, Invalidated)
                | (SettledRollback, Invalidated)
        )
    }

    pub fn is_terminal(self) -> bool {
        self == MutationPhase::Invalidated
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("illegal mutation phase transition {from:?} -> {to:?}")]
pub struct PhaseError {
    pub from: MutationPhase,
    pub to: MutationPhase,
}

/// Tracks one mutation's phase and refuses out-of-order steps.
#[derive(Debug, Default)]
pub struct PhaseTracker {
    phase: MutationPhase,
}

impl PhaseTracker {
    pub fn phase(&self) -> MutationPhase {
        self.phase
    }

    pub fn advance(&mut self, next: MutationPhase) -> Result<MutationPhase, PhaseError> {
        if !self.phase.can_transition_to(next) {
            return Err(PhaseError {
                from: self.phase,
                to: next,
            });
        }
        self.phase = next;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use MutationPhase::*;

    #[test]
    fn success_path() {
        let mut tracker = PhaseTracker::default();
        for next in [Snapshotting, OptimisticallyApplied, SettledSuccess, Invalidated] {
            assert_eq!(tracker.advance(next), Ok(next));
        }
        assert!(tracker.phase().is_terminal());
    }

    #[test]
    fn rollback_path() {
        let mut tracker = PhaseTracker::default();
        for next in [Snapshotting, OptimisticallyApplied, SettledRollback, Invalidated] {
            tracker.advance(next).unwrap();
        }
        assert_eq!(tracker.phase(), Invalidated);
    }

    #[test]
    fn skipping_a_phase_is_rejected() {
        let mut tracker = PhaseTracker::default();
        assert_eq!(
            tracker.advance(OptimisticallyApplied),
            Err(PhaseError {
                from: Idle,
                to: OptimisticallyApplied
            })
        );
        assert_eq!(tracker.phase(), Idle);
    }

    #[test]
    fn terminal_phase_has_no_exit() {
        for next in [Idle, Snapshotting, OptimisticallyApplied, SettledSuccess, SettledRollback] {
            assert!(!Invalidated.can_transition_to(next));
        }
        assert!(!SettledSuccess.can_transition_to(SettledRollback));
    }
}
