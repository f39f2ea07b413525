//! Event handlers and reporters
//!
//! This facility predates the Event/Trigger/Action model and is kept as a
//! compatibility surface: each adopted handler or reporter is rewrapped here
//! as an event with one action plus a timer or witness delegating to the
//! user object. Handlers get `Change` actions, reporters get `Report`
//! actions.

use std::sync::Arc;

use tracing::warn;

use crate::stage::Stage;
use crate::state::State;
use crate::study::Study;
use crate::system::EventSystem;

use super::action::{ActionKind, EventAction, EventChangeResult, ExitStatus};
use super::event::Event;
use super::ids::{EventId, EventTriggerId};
use super::trigger::{
    Continuity, Direction, TimerSource, Trigger, WitnessSource, DEFAULT_LOCALIZATION_WINDOW,
};

/// What a handler wants the integrator to do after it has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerOutcome {
    Proceed,
    Terminate,
}

/// Witness configuration supplied by a triggered handler or reporter.
#[derive(Debug, Clone, Copy)]
pub struct TriggerInfo {
    pub trigger_on_rising: bool,
    pub trigger_on_falling: bool,
    /// Localization window relative to the accuracy in use.
    pub localization_window: f64,
}

impl Default for TriggerInfo {
    fn default() -> Self {
        TriggerInfo {
            trigger_on_rising: true,
            trigger_on_falling: true,
            localization_window: DEFAULT_LOCALIZATION_WINDOW,
        }
    }
}

/// Handler whose event occurs at known times.
pub trait ScheduledEventHandler: Send + Sync {
    /// Next time the event should occur. `include_current_time` is false
    /// when this handler already triggered at the state's current time.
    fn next_event_time(&self, state: &State, include_current_time: bool) -> f64;

    fn handle_event(&self, state: &mut State, accuracy: f64) -> HandlerOutcome;

    fn event_description(&self) -> &str {
        ""
    }
}

/// Handler whose event occurs when a witness function crosses zero.
pub trait TriggeredEventHandler: Send + Sync {
    fn value(&self, state: &State) -> f64;

    /// Earliest stage the witness function depends on.
    fn required_stage(&self) -> Stage;

    fn trigger_info(&self) -> TriggerInfo {
        TriggerInfo::default()
    }

    fn handle_event(&self, state: &mut State, accuracy: f64) -> HandlerOutcome;

    fn event_description(&self) -> &str {
        ""
    }
}

/// Reporter whose event occurs at known times.
pub trait ScheduledEventReporter: Send + Sync {
    fn next_event_time(&self, state: &State, include_current_time: bool) -> f64;

    fn handle_event(&self, state: &State);

    fn event_description(&self) -> &str {
        ""
    }
}

/// Reporter whose event occurs when a witness function crosses zero.
pub trait TriggeredEventReporter: Send + Sync {
    fn value(&self, state: &State) -> f64;

    fn required_stage(&self) -> Stage;

    fn trigger_info(&self) -> TriggerInfo {
        TriggerInfo::default()
    }

    fn handle_event(&self, state: &State);

    fn event_description(&self) -> &str {
        ""
    }
}

/// Ids assigned when a handler or reporter is adopted.
#[derive(Debug, Clone, Copy)]
pub struct AdoptedIds {
    pub event_id: EventId,
    pub trigger_id: EventTriggerId,
}

/// Registry record of an adopted handler or reporter: the shared object and
/// the ids wired to it. The ids are set at adoption and never change.
pub struct Adopted<T: ?Sized> {
    object: Arc<T>,
    ids: AdoptedIds,
}

impl<T: ?Sized> Adopted<T> {
    pub fn object(&self) -> &Arc<T> {
        &self.object
    }

    pub fn event_id(&self) -> EventId {
        self.ids.event_id
    }

    pub fn trigger_id(&self) -> EventTriggerId {
        self.ids.trigger_id
    }
}

impl<T: ?Sized> Clone for Adopted<T> {
    fn clone(&self) -> Self {
        Adopted {
            object: Arc::clone(&self.object),
            ids: self.ids,
        }
    }
}

fn witness_direction(info: &TriggerInfo) -> Direction {
    match (info.trigger_on_rising, info.trigger_on_falling) {
        (true, true) => Direction::RisingAndFalling,
        (true, false) => Direction::Rising,
        (false, true) => Direction::Falling,
        (false, false) => {
            // A witness that triggers on neither transition could never
            // fire; treat the configuration as an oversight.
            warn!("trigger info requests neither rising nor falling transitions; using both");
            Direction::RisingAndFalling
        }
    }
}

fn described(description: &str, fallback: &str) -> String {
    if description.is_empty() {
        fallback.to_string()
    } else {
        description.to_string()
    }
}

//------------------------------ adapter actions -------------------------------

struct ScheduledHandlerAction {
    handler: Arc<dyn ScheduledEventHandler>,
}

impl EventAction for ScheduledHandlerAction {
    fn kind(&self) -> ActionKind {
        ActionKind::Change
    }

    fn clone_boxed(&self) -> Box<dyn EventAction> {
        Box::new(ScheduledHandlerAction {
            handler: Arc::clone(&self.handler),
        })
    }

    fn change(
        &self,
        study: &mut dyn Study,
        _event: &Event,
        _causes: &[&Trigger],
        result: &mut EventChangeResult,
    ) {
        let accuracy = study.accuracy_in_use();
        let outcome = self.handler.handle_event(study.internal_state_mut(), accuracy);
        result.report_exit_status(match outcome {
            HandlerOutcome::Proceed => ExitStatus::Succeeded,
            HandlerOutcome::Terminate => ExitStatus::ShouldTerminate,
        });
    }
}

struct TriggeredHandlerAction {
    handler: Arc<dyn TriggeredEventHandler>,
}

impl EventAction for TriggeredHandlerAction {
    fn kind(&self) -> ActionKind {
        ActionKind::Change
    }

    fn clone_boxed(&self) -> Box<dyn EventAction> {
        Box::new(TriggeredHandlerAction {
            handler: Arc::clone(&self.handler),
        })
    }

    fn change(
        &self,
        study: &mut dyn Study,
        _event: &Event,
        _causes: &[&Trigger],
        result: &mut EventChangeResult,
    ) {
        let accuracy = study.accuracy_in_use();
        let outcome = self.handler.handle_event(study.internal_state_mut(), accuracy);
        result.report_exit_status(match outcome {
            HandlerOutcome::Proceed => ExitStatus::Succeeded,
            HandlerOutcome::Terminate => ExitStatus::ShouldTerminate,
        });
    }
}

struct ScheduledReporterAction {
    reporter: Arc<dyn ScheduledEventReporter>,
}

impl EventAction for ScheduledReporterAction {
    fn kind(&self) -> ActionKind {
        ActionKind::Report
    }

    fn clone_boxed(&self) -> Box<dyn EventAction> {
        Box::new(ScheduledReporterAction {
            reporter: Arc::clone(&self.reporter),
        })
    }

    fn report(&self, study: &dyn Study, _event: &Event, _causes: &[&Trigger]) {
        self.reporter.handle_event(study.current_state());
    }
}

struct TriggeredReporterAction {
    reporter: Arc<dyn TriggeredEventReporter>,
}

impl EventAction for TriggeredReporterAction {
    fn kind(&self) -> ActionKind {
        ActionKind::Report
    }

    fn clone_boxed(&self) -> Box<dyn EventAction> {
        Box::new(TriggeredReporterAction {
            reporter: Arc::clone(&self.reporter),
        })
    }

    fn report(&self, study: &dyn Study, _event: &Event, _causes: &[&Trigger]) {
        self.reporter.handle_event(study.current_state());
    }
}

//------------------------- adapter timers & witnesses -------------------------

struct ScheduledHandlerTimer {
    handler: Arc<dyn ScheduledEventHandler>,
}

impl TimerSource for ScheduledHandlerTimer {
    fn time_of_next_trigger(
        &self,
        _system: &EventSystem,
        state: &State,
        time_of_last_trigger: f64,
    ) -> f64 {
        self.handler
            .next_event_time(state, state.time() > time_of_last_trigger)
    }

    fn clone_boxed(&self) -> Box<dyn TimerSource> {
        Box::new(ScheduledHandlerTimer {
            handler: Arc::clone(&self.handler),
        })
    }
}

struct ScheduledReporterTimer {
    reporter: Arc<dyn ScheduledEventReporter>,
}

impl TimerSource for ScheduledReporterTimer {
    fn time_of_next_trigger(
        &self,
        _system: &EventSystem,
        state: &State,
        time_of_last_trigger: f64,
    ) -> f64 {
        self.reporter
            .next_event_time(state, state.time() > time_of_last_trigger)
    }

    fn clone_boxed(&self) -> Box<dyn TimerSource> {
        Box::new(ScheduledReporterTimer {
            reporter: Arc::clone(&self.reporter),
        })
    }
}

struct TriggeredHandlerWitness {
    handler: Arc<dyn TriggeredEventHandler>,
}

impl WitnessSource for TriggeredHandlerWitness {
    fn value(&self, _study: &dyn Study, state: &State, _deriv_order: usize) -> f64 {
        self.handler.value(state)
    }

    fn depends_on_stage(&self, _deriv_order: usize) -> Stage {
        self.handler.required_stage()
    }

    fn clone_boxed(&self) -> Box<dyn WitnessSource> {
        Box::new(TriggeredHandlerWitness {
            handler: Arc::clone(&self.handler),
        })
    }
}

struct TriggeredReporterWitness {
    reporter: Arc<dyn TriggeredEventReporter>,
}

impl WitnessSource for TriggeredReporterWitness {
    fn value(&self, _study: &dyn Study, state: &State, _deriv_order: usize) -> f64 {
        self.reporter.value(state)
    }

    fn depends_on_stage(&self, _deriv_order: usize) -> Stage {
        self.reporter.required_stage()
    }

    fn clone_boxed(&self) -> Box<dyn WitnessSource> {
        Box::new(TriggeredReporterWitness {
            reporter: Arc::clone(&self.reporter),
        })
    }
}

//------------------------------ adoption wiring -------------------------------

impl EventSystem {
    /// Wrap a scheduled handler as an event with a `Change` action fired by
    /// a delegating timer.
    pub fn adopt_scheduled_event_handler(
        &mut self,
        handler: Arc<dyn ScheduledEventHandler>,
    ) -> AdoptedIds {
        let mut event = Event::new(described(handler.event_description(), "EventHandler Event"));
        event.adopt_action(Box::new(ScheduledHandlerAction {
            handler: Arc::clone(&handler),
        }));
        let event_id = self.adopt_event(event);

        let mut timer = Trigger::timer(
            "ScheduledEventHandler timer",
            Box::new(ScheduledHandlerTimer {
                handler: Arc::clone(&handler),
            }),
        );
        timer.add_event(event_id);
        let trigger_id = self.adopt_event_trigger(timer);

        let ids = AdoptedIds {
            event_id,
            trigger_id,
        };
        self.scheduled_event_handlers
            .push(Adopted { object: handler, ids });
        ids
    }

    /// Wrap a triggered handler as an event with a `Change` action fired by
    /// a delegating witness configured from the handler's trigger info.
    pub fn adopt_triggered_event_handler(
        &mut self,
        handler: Arc<dyn TriggeredEventHandler>,
    ) -> AdoptedIds {
        let mut event = Event::new(described(handler.event_description(), "EventHandler Event"));
        event.adopt_action(Box::new(TriggeredHandlerAction {
            handler: Arc::clone(&handler),
        }));
        let event_id = self.adopt_event(event);

        let info = handler.trigger_info();
        let mut witness = Trigger::witness(
            "TriggeredEventHandler witness",
            Box::new(TriggeredHandlerWitness {
                handler: Arc::clone(&handler),
            }),
            witness_direction(&info),
            Continuity::Continuous,
        );
        witness.add_event(event_id);
        if let Some(data) = witness.as_witness_mut() {
            data.set_localization_window(info.localization_window);
        }
        let trigger_id = self.adopt_event_trigger(witness);

        let ids = AdoptedIds {
            event_id,
            trigger_id,
        };
        self.triggered_event_handlers
            .push(Adopted { object: handler, ids });
        ids
    }

    /// Wrap a scheduled reporter as an event with a `Report` action fired by
    /// a delegating timer.
    pub fn adopt_scheduled_event_reporter(
        &mut self,
        reporter: Arc<dyn ScheduledEventReporter>,
    ) -> AdoptedIds {
        let mut event = Event::new(described(
            reporter.event_description(),
            "EventReporter Event",
        ));
        event.adopt_action(Box::new(ScheduledReporterAction {
            reporter: Arc::clone(&reporter),
        }));
        let event_id = self.adopt_event(event);

        let mut timer = Trigger::timer(
            "ScheduledEventReporter timer",
            Box::new(ScheduledReporterTimer {
                reporter: Arc::clone(&reporter),
            }),
        );
        timer.add_event(event_id);
        let trigger_id = self.adopt_event_trigger(timer);

        let ids = AdoptedIds {
            event_id,
            trigger_id,
        };
        self.scheduled_event_reporters
            .push(Adopted { object: reporter, ids });
        ids
    }

    /// Wrap a triggered reporter as an event with a `Report` action fired by
    /// a delegating witness configured from the reporter's trigger info.
    pub fn adopt_triggered_event_reporter(
        &mut self,
        reporter: Arc<dyn TriggeredEventReporter>,
    ) -> AdoptedIds {
        let mut event = Event::new(described(
            reporter.event_description(),
            "EventReporter Event",
        ));
        event.adopt_action(Box::new(TriggeredReporterAction {
            reporter: Arc::clone(&reporter),
        }));
        let event_id = self.adopt_event(event);

        let info = reporter.trigger_info();
        let mut witness = Trigger::witness(
            "TriggeredEventReporter witness",
            Box::new(TriggeredReporterWitness {
                reporter: Arc::clone(&reporter),
            }),
            witness_direction(&info),
            Continuity::Continuous,
        );
        witness.add_event(event_id);
        if let Some(data) = witness.as_witness_mut() {
            data.set_localization_window(info.localization_window);
        }
        let trigger_id = self.adopt_event_trigger(witness);

        let ids = AdoptedIds {
            event_id,
            trigger_id,
        };
        self.triggered_event_reporters
            .push(Adopted { object: reporter, ids });
        ids
    }

    pub fn scheduled_event_handlers(&self) -> &[Adopted<dyn ScheduledEventHandler>] {
        &self.scheduled_event_handlers
    }

    pub fn triggered_event_handlers(&self) -> &[Adopted<dyn TriggeredEventHandler>] {
        &self.triggered_event_handlers
    }

    pub fn scheduled_event_reporters(&self) -> &[Adopted<dyn ScheduledEventReporter>] {
        &self.scheduled_event_reporters
    }

    pub fn triggered_event_reporters(&self) -> &[Adopted<dyn TriggeredEventReporter>] {
        &self.triggered_event_reporters
    }
}
