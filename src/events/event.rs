//! Events: named occurrence classes bundling actions

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::study::Study;

use super::action::{ActionKind, EventAction, EventChangeResult};
use super::ids::{EventActionIndex, EventId};
use super::trigger::Trigger;

/// Occurrence counter bumped through a logically-const facade.
///
/// Diagnostic state only; deliberately excluded from equality. Relaxed
/// atomics keep the owning registry shareable across threads even though the
/// dispatch model is single-threaded.
#[derive(Debug, Default)]
pub(crate) struct OccurrenceCounter(AtomicU64);

impl OccurrenceCounter {
    pub(crate) fn bump(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn count(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

impl Clone for OccurrenceCounter {
    fn clone(&self) -> Self {
        OccurrenceCounter(AtomicU64::new(self.count()))
    }
}

/// Built-in classification of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// The study is starting from its initial state.
    Initialization,
    /// The integrator completed a step.
    TimeAdvanced,
    /// The study is ending.
    Termination,
    /// A witness extremum was isolated.
    ExtremeValueIsolated,
    Custom,
}

/// A named unit of "something happened".
///
/// Carries zero or more [`EventAction`]s and a mutable occurrence counter.
/// Events are adopted into an
/// [`EventSystem`](crate::system::EventSystem), which assigns the stable
/// [`EventId`] and owns the event for the system's lifetime.
pub struct Event {
    description: String,
    kind: EventKind,
    actions: Vec<Box<dyn EventAction>>,
    id: EventId,
    occurrences: OccurrenceCounter,
}

impl Event {
    /// Create a custom event with a human-readable description.
    pub fn new(description: impl Into<String>) -> Self {
        Event::with_kind(description, EventKind::Custom)
    }

    fn with_kind(description: impl Into<String>, kind: EventKind) -> Self {
        Event {
            description: description.into(),
            kind,
            actions: Vec::new(),
            id: EventId::INVALID,
            occurrences: OccurrenceCounter::default(),
        }
    }

    pub fn initialization() -> Self {
        Event::with_kind("Initialization", EventKind::Initialization)
    }

    pub fn time_advanced() -> Self {
        Event::with_kind("TimeAdvanced", EventKind::TimeAdvanced)
    }

    pub fn termination() -> Self {
        Event::with_kind("Termination", EventKind::Termination)
    }

    pub fn extreme_value_isolated() -> Self {
        Event::with_kind("ExtremeValueIsolated", EventKind::ExtremeValueIsolated)
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Id assigned at adoption; invalid until then.
    pub fn id(&self) -> EventId {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: EventId) {
        self.id = id;
    }

    /// Append an action; actions are invoked in adoption order.
    pub fn adopt_action(&mut self, action: Box<dyn EventAction>) -> EventActionIndex {
        let index = EventActionIndex::new(self.actions.len());
        self.actions.push(action);
        index
    }

    pub fn num_actions(&self) -> usize {
        self.actions.len()
    }

    pub fn has_report_action(&self) -> bool {
        self.actions.iter().any(|a| a.kind() == ActionKind::Report)
    }

    pub fn has_change_action(&self) -> bool {
        self.actions.iter().any(|a| a.kind() == ActionKind::Change)
    }

    /// Times this event has occurred.
    pub fn num_occurrences(&self) -> u64 {
        self.occurrences.count()
    }

    pub(crate) fn note_occurrence(&self) {
        self.occurrences.bump();
    }

    /// Invoke every `Report` action in adoption order.
    pub fn perform_report_actions(&self, study: &dyn Study, causes: &[&Trigger]) {
        for action in &self.actions {
            if action.kind() == ActionKind::Report {
                action.report(study, self, causes);
            }
        }
    }

    /// Invoke every `Change` action in adoption order, accumulating exit
    /// statuses into `result`.
    pub fn perform_change_actions(
        &self,
        study: &mut dyn Study,
        causes: &[&Trigger],
        result: &mut EventChangeResult,
    ) {
        for action in &self.actions {
            if action.kind() == ActionKind::Change {
                action.change(study, self, causes, result);
            }
        }
    }
}

impl Clone for Event {
    fn clone(&self) -> Self {
        Event {
            description: self.description.clone(),
            kind: self.kind,
            actions: self.actions.iter().map(|a| a.clone_boxed()).collect(),
            id: self.id,
            occurrences: self.occurrences.clone(),
        }
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("description", &self.description)
            .field("kind", &self.kind)
            .field("id", &self.id)
            .field("num_actions", &self.actions.len())
            .field("occurrences", &self.occurrences.count())
            .finish()
    }
}
