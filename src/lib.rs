//! simevents - Global event subsystem for hybrid multibody dynamics simulation
//!
//! Lets a continuous-time simulator coordinate *scheduled* (time-driven) and
//! *triggered* (state-condition-driven) events: a registry assigns stable
//! ids to events and their triggers, topology realization partitions
//! triggers into timers and witnesses, and a dispatcher resolves fired
//! triggers into `(event, causes)` groups and runs the events' report and
//! change actions.
//!
//! # Architecture
//!
//! - [`EventSystem`] owns every adopted [`Event`] and [`Trigger`] and is the
//!   single entry point the integrator drives a step with.
//! - Timers produce the next scheduled trigger time; witnesses are
//!   continuous functions of state whose zero crossings the integrator
//!   isolates by root finding. Run-time timers and witnesses live in the
//!   state's [`TriggerCollection`].
//! - The handler/reporter traits in [`events`] are the older user-facing
//!   abstractions, adopted through compatibility wrappers.
//!
//! # Example
//!
//! ```rust,ignore
//! use simevents::prelude::*;
//!
//! let mut system = EventSystem::new();
//!
//! let mut event = Event::new("sample");
//! event.adopt_action(Box::new(ReportAction::new(|_, _, _| println!("sampled"))));
//! let event_id = system.adopt_event(event);
//!
//! let mut timer = Trigger::timer("sampler", Box::new(PeriodicTimer::new(0.0, 0.1)));
//! timer.add_event(event_id);
//! system.adopt_event_trigger(timer);
//!
//! let mut state = State::new(0, 0);
//! system.realize_topology(&mut state)?;
//! let study = SimStudy::new(&system, state);
//! let next = system.find_next_scheduled_event_times(&study, -f64::INFINITY, -f64::INFINITY)?;
//! ```

pub mod error;
pub mod events;
pub mod stage;
pub mod state;
pub mod study;
pub mod system;

pub use error::EventError;
pub use events::*;
pub use stage::{Stage, StageVersion, StageVersions};
pub use state::State;
pub use study::{SimStudy, Study};
pub use system::{EventAndCauses, EventSystem, EventsAndCauses, NextEventTimes};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::EventError;
    pub use crate::events::*;
    pub use crate::stage::{Stage, StageVersion, StageVersions};
    pub use crate::state::State;
    pub use crate::study::{SimStudy, Study};
    pub use crate::system::{EventAndCauses, EventSystem, EventsAndCauses, NextEventTimes};
}
