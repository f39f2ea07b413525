//! The system-global event subsystem
//!
//! Owns every adopted event and trigger, allocates the predefined events and
//! triggers at construction, and exposes the operations the integrator
//! drives a step with: topology realization, active-set queries, next-event
//! scheduling, occurrence resolution, and action dispatch.

mod cache;
mod dispatch;
mod schedule;

pub use dispatch::{EventAndCauses, EventsAndCauses};
pub use schedule::NextEventTimes;

use crate::error::EventError;
use crate::events::{
    Adopted, Event, EventId, EventTriggerId, ScheduledEventHandler, ScheduledEventReporter,
    Trigger, TriggeredEventHandler, TriggeredEventReporter,
};

use cache::TopologyCache;

/// Registry and dispatcher coordinating scheduled and triggered events.
///
/// The system exclusively owns every adopted [`Event`] and [`Trigger`];
/// cloning the system deep-clones both registries. Registries grow
/// monotonically: ids are assigned densely from zero and never reused.
#[derive(Clone)]
pub struct EventSystem {
    events: Vec<Option<Event>>,
    triggers: Vec<Option<Trigger>>,

    pub(crate) scheduled_event_handlers: Vec<Adopted<dyn ScheduledEventHandler>>,
    pub(crate) triggered_event_handlers: Vec<Adopted<dyn TriggeredEventHandler>>,
    pub(crate) scheduled_event_reporters: Vec<Adopted<dyn ScheduledEventReporter>>,
    pub(crate) triggered_event_reporters: Vec<Adopted<dyn TriggeredEventReporter>>,

    initialization_event_id: EventId,
    time_advanced_event_id: EventId,
    termination_event_id: EventId,
    extreme_value_isolated_event_id: EventId,

    initialization_trigger_id: EventTriggerId,
    time_advanced_trigger_id: EventTriggerId,
    termination_trigger_id: EventTriggerId,

    pub(crate) cache: TopologyCache,
}

impl EventSystem {
    /// Construct a system with the predefined events and triggers adopted:
    /// Initialization, TimeAdvanced, Termination, ExtremeValueIsolated
    /// events in that order, then explicit triggers for the first three.
    pub fn new() -> Self {
        let mut system = EventSystem {
            events: Vec::new(),
            triggers: Vec::new(),
            scheduled_event_handlers: Vec::new(),
            triggered_event_handlers: Vec::new(),
            scheduled_event_reporters: Vec::new(),
            triggered_event_reporters: Vec::new(),
            initialization_event_id: EventId::INVALID,
            time_advanced_event_id: EventId::INVALID,
            termination_event_id: EventId::INVALID,
            extreme_value_isolated_event_id: EventId::INVALID,
            initialization_trigger_id: EventTriggerId::INVALID,
            time_advanced_trigger_id: EventTriggerId::INVALID,
            termination_trigger_id: EventTriggerId::INVALID,
            cache: TopologyCache::default(),
        };

        system.initialization_event_id = system.adopt_event(Event::initialization());
        system.time_advanced_event_id = system.adopt_event(Event::time_advanced());
        system.termination_event_id = system.adopt_event(Event::termination());
        system.extreme_value_isolated_event_id =
            system.adopt_event(Event::extreme_value_isolated());

        let mut trigger = Trigger::explicit("InitializationTrigger");
        trigger.add_event(system.initialization_event_id);
        system.initialization_trigger_id = system.adopt_event_trigger(trigger);

        let mut trigger = Trigger::explicit("TimeAdvancedTrigger");
        trigger.add_event(system.time_advanced_event_id);
        system.time_advanced_trigger_id = system.adopt_event_trigger(trigger);

        let mut trigger = Trigger::explicit("TerminationTrigger");
        trigger.add_event(system.termination_event_id);
        system.termination_trigger_id = system.adopt_event_trigger(trigger);

        system
    }

    /// Take ownership of an event, assign the next dense [`EventId`], and
    /// write the id back into the event.
    pub fn adopt_event(&mut self, mut event: Event) -> EventId {
        let id = EventId::new(self.events.len());
        event.set_id(id);
        self.events.push(Some(event));
        id
    }

    /// Take ownership of a trigger, assign the next dense
    /// [`EventTriggerId`], and write the id back into the trigger.
    pub fn adopt_event_trigger(&mut self, mut trigger: Trigger) -> EventTriggerId {
        let id = EventTriggerId::new(self.triggers.len());
        trigger.set_id(id);
        self.triggers.push(Some(trigger));
        id
    }

    pub fn num_events(&self) -> usize {
        self.events.len()
    }

    pub fn event(&self, id: EventId) -> Result<&Event, EventError> {
        const METHOD: &str = "EventSystem::event";
        if !id.is_valid() {
            return Err(EventError::InvalidArgument {
                method: METHOD,
                id_kind: "EventId",
            });
        }
        let slot = self.events.get(id.index()).ok_or(EventError::InvalidIndex {
            method: METHOD,
            index: id.index(),
            count: self.events.len(),
        })?;
        slot.as_ref().ok_or(EventError::Missing {
            method: METHOD,
            index: id.index(),
        })
    }

    pub fn event_mut(&mut self, id: EventId) -> Result<&mut Event, EventError> {
        const METHOD: &str = "EventSystem::event_mut";
        if !id.is_valid() {
            return Err(EventError::InvalidArgument {
                method: METHOD,
                id_kind: "EventId",
            });
        }
        let count = self.events.len();
        let slot = self
            .events
            .get_mut(id.index())
            .ok_or(EventError::InvalidIndex {
                method: METHOD,
                index: id.index(),
                count,
            })?;
        slot.as_mut().ok_or(EventError::Missing {
            method: METHOD,
            index: id.index(),
        })
    }

    /// Total query: false for the invalid sentinel, out-of-range ids, and
    /// empty slots alike.
    pub fn has_event(&self, id: EventId) -> bool {
        self.event_if_present(id).is_some()
    }

    pub fn num_event_triggers(&self) -> usize {
        self.triggers.len()
    }

    pub fn event_trigger(&self, id: EventTriggerId) -> Result<&Trigger, EventError> {
        const METHOD: &str = "EventSystem::event_trigger";
        if !id.is_valid() {
            return Err(EventError::InvalidArgument {
                method: METHOD,
                id_kind: "EventTriggerId",
            });
        }
        let slot = self
            .triggers
            .get(id.index())
            .ok_or(EventError::InvalidIndex {
                method: METHOD,
                index: id.index(),
                count: self.triggers.len(),
            })?;
        slot.as_ref().ok_or(EventError::Missing {
            method: METHOD,
            index: id.index(),
        })
    }

    pub fn event_trigger_mut(&mut self, id: EventTriggerId) -> Result<&mut Trigger, EventError> {
        const METHOD: &str = "EventSystem::event_trigger_mut";
        if !id.is_valid() {
            return Err(EventError::InvalidArgument {
                method: METHOD,
                id_kind: "EventTriggerId",
            });
        }
        let count = self.triggers.len();
        let slot = self
            .triggers
            .get_mut(id.index())
            .ok_or(EventError::InvalidIndex {
                method: METHOD,
                index: id.index(),
                count,
            })?;
        slot.as_mut().ok_or(EventError::Missing {
            method: METHOD,
            index: id.index(),
        })
    }

    /// Total query mirroring [`has_event`](Self::has_event).
    pub fn has_event_trigger(&self, id: EventTriggerId) -> bool {
        id.is_valid()
            && self
                .triggers
                .get(id.index())
                .is_some_and(|slot| slot.is_some())
    }

    pub fn initialization_event_id(&self) -> EventId {
        self.initialization_event_id
    }

    pub fn time_advanced_event_id(&self) -> EventId {
        self.time_advanced_event_id
    }

    pub fn termination_event_id(&self) -> EventId {
        self.termination_event_id
    }

    pub fn extreme_value_isolated_event_id(&self) -> EventId {
        self.extreme_value_isolated_event_id
    }

    pub fn initialization_trigger_id(&self) -> EventTriggerId {
        self.initialization_trigger_id
    }

    pub fn time_advanced_trigger_id(&self) -> EventTriggerId {
        self.time_advanced_trigger_id
    }

    pub fn termination_trigger_id(&self) -> EventTriggerId {
        self.termination_trigger_id
    }

    pub(crate) fn event_if_present(&self, id: EventId) -> Option<&Event> {
        if !id.is_valid() {
            return None;
        }
        self.events.get(id.index()).and_then(|slot| slot.as_ref())
    }

    /// Lookup for ids held by the topology cache, which by construction
    /// refer to adopted triggers.
    pub(crate) fn cached_trigger(&self, id: EventTriggerId) -> &Trigger {
        self.triggers[id.index()]
            .as_ref()
            .expect("topology cache refers to an adopted trigger")
    }
}

impl Default for EventSystem {
    fn default() -> Self {
        EventSystem::new()
    }
}
