use serde::Serialize;
use thiserror::Error;

/// Phases a confetti burst can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BurstPhase {
    /// No particles exist; the hosting view has not started a burst or has been torn down.
    Idle,
    /// Particles are being simulated every frame.
    Bursting,
    /// Simulation is frozen; every particle keeps its exact state.
    Paused,
}

/// Events that can be applied to the burst state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BurstEvent {
    /// Start a burst, or restart the running one with fresh particles.
    Spawn,
    /// Freeze the running burst (e.g. for a snapshot).
    Pause,
    /// Continue a frozen burst.
    Resume,
    /// The hosting view is gone; discard all particles.
    Teardown,
}

/// Error returned when attempting to apply an invalid transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// The phase the state machine was in when the invalid event was received.
    pub from: BurstPhase,
    /// The event that cannot be applied from this phase.
    pub event: BurstEvent,
}

/// State machine governing a burst's lifecycle.
#[derive(Debug, Clone)]
pub struct BurstStateMachine {
    phase: BurstPhase,
    version: usize,
}

impl Default for BurstStateMachine {
    fn default() -> Self {
        Self {
            phase: BurstPhase::Idle,
            version: 0,
        }
    }
}

impl BurstStateMachine {
    /// Create a new state machine initialised in the idle state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inspect the current phase.
    pub fn phase(&self) -> BurstPhase {
        self.phase
    }

    /// Number of transitions applied so far.
    pub fn version(&self) -> usize {
        self.version
    }

    /// Apply an event, returning the new phase. Invalid events leave the machine untouched.
    pub fn apply(&mut self, event: BurstEvent) -> Result<BurstPhase, InvalidTransition> {
        let next = self.compute_transition(event)?;
        self.phase = next;
        self.version += 1;
        Ok(next)
    }

    /// Compute a transition from an event if the transition is valid.
    fn compute_transition(&self, event: BurstEvent) -> Result<BurstPhase, InvalidTransition> {
        let next = match (self.phase, event) {
            (BurstPhase::Idle | BurstPhase::Bursting, BurstEvent::Spawn) => BurstPhase::Bursting,
            (BurstPhase::Bursting, BurstEvent::Pause) => BurstPhase::Paused,
            (BurstPhase::Paused, BurstEvent::Resume) => BurstPhase::Bursting,
            (BurstPhase::Bursting | BurstPhase::Paused, BurstEvent::Teardown) => BurstPhase::Idle,
            (from, event) => return Err(InvalidTransition { from, event }),
        };

        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_is_idle() {
        let sm = BurstStateMachine::new();
        assert_eq!(sm.phase(), BurstPhase::Idle);
        assert_eq!(sm.version(), 0);
    }

    #[test]
    fn full_lifecycle() {
        let mut sm = BurstStateMachine::new();
        assert_eq!(sm.apply(BurstEvent::Spawn), Ok(BurstPhase::Bursting));
        assert_eq!(sm.apply(BurstEvent::Pause), Ok(BurstPhase::Paused));
        assert_eq!(sm.apply(BurstEvent::Resume), Ok(BurstPhase::Bursting));
        assert_eq!(sm.apply(BurstEvent::Spawn), Ok(BurstPhase::Bursting));
        assert_eq!(sm.apply(BurstEvent::Teardown), Ok(BurstPhase::Idle));
        assert_eq!(sm.version(), 5);
    }

    #[test]
    fn teardown_from_pause_is_allowed() {
        let mut sm = BurstStateMachine::new();
        sm.apply(BurstEvent::Spawn).unwrap();
        sm.apply(BurstEvent::Pause).unwrap();
        assert_eq!(sm.apply(BurstEvent::Teardown), Ok(BurstPhase::Idle));
    }

    #[test]
    fn invalid_transition_returns_error() {
        let mut sm = BurstStateMachine::new();
        let err = sm.apply(BurstEvent::Pause).unwrap_err();
        assert_eq!(err.from, BurstPhase::Idle);
        assert_eq!(err.event, BurstEvent::Pause);
        assert_eq!(sm.phase(), BurstPhase::Idle);
        assert_eq!(sm.version(), 0);
    }

    #[test]
    fn paused_burst_cannot_be_respawned_or_paused_again() {
        let mut sm = BurstStateMachine::new();
        sm.apply(BurstEvent::Spawn).unwrap();
        sm.apply(BurstEvent::Pause).unwrap();
        assert!(sm.apply(BurstEvent::Spawn).is_err());
        assert!(sm.apply(BurstEvent::Pause).is_err());
        assert!(sm.apply(BurstEvent::Resume).is_ok());
        assert!(sm.apply(BurstEvent::Resume).is_err());
    }
}
