//! Studies: running simulation contexts
//!
//! A study pairs an event system with the state being advanced, plus the
//! numerical settings the subsystem's collaborators need (precision,
//! accuracy in use).

use crate::state::State;
use crate::system::EventSystem;

/// Context the event subsystem dispatches against.
///
/// Report actions see the study read-only through `current_state`; change
/// actions modify it through `internal_state_mut`.
pub trait Study {
    fn system(&self) -> &EventSystem;

    /// State most recently realized by the integrator.
    fn current_state(&self) -> &State;

    /// Trial state change actions are allowed to modify.
    fn internal_state_mut(&mut self) -> &mut State;

    /// Smallest meaningful relative difference for this study's arithmetic.
    fn precision(&self) -> f64 {
        f64::EPSILON
    }

    /// Accuracy the integrator is currently maintaining.
    fn accuracy_in_use(&self) -> f64 {
        1e-3
    }
}

/// Minimal study over a borrowed system and an owned state.
pub struct SimStudy<'a> {
    system: &'a EventSystem,
    state: State,
    accuracy: f64,
}

impl<'a> SimStudy<'a> {
    pub fn new(system: &'a EventSystem, state: State) -> Self {
        SimStudy {
            system,
            state,
            accuracy: 1e-3,
        }
    }

    pub fn with_accuracy(system: &'a EventSystem, state: State, accuracy: f64) -> Self {
        SimStudy {
            system,
            state,
            accuracy,
        }
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut State {
        &mut self.state
    }
}

impl Study for SimStudy<'_> {
    fn system(&self) -> &EventSystem {
        self.system
    }

    fn current_state(&self) -> &State {
        &self.state
    }

    fn internal_state_mut(&mut self) -> &mut State {
        &mut self.state
    }

    fn accuracy_in_use(&self) -> f64 {
        self.accuracy
    }
}
