//! Occurrence resolution and action dispatch
//!
//! Per occurrence an event moves Queued (`note_event_occurrence`) →
//! Reported (report pass) → Changed (change pass) → Idle once the
//! integrator re-realizes. Report actions run strictly before change
//! actions for the same triggered set. Only the occurrence counters and the
//! change result persist across the cycle.

use tracing::trace;

use crate::error::EventError;
use crate::events::{Event, EventChangeResult, EventId, Trigger};
use crate::study::Study;

use super::EventSystem;

/// One triggered event together with the triggers that caused it.
pub type EventAndCauses<'a> = (&'a Event, Vec<&'a Trigger>);

/// Triggered events in first-seen order.
pub type EventsAndCauses<'a> = Vec<EventAndCauses<'a>>;

impl EventSystem {
    /// Resolve a set of simultaneously fired triggers into the deduplicated
    /// `(event, causes)` map, appending to the output collections.
    ///
    /// Triggers are assumed unique in the input, but several may cause the
    /// same event; each caused event appears once, with its causes in
    /// first-seen trigger order. Unrecognized event ids are appended to
    /// `ignored_event_ids` without duplicates. Occurrence counters are
    /// bumped here, once per trigger and once per unique caused event.
    ///
    /// Expected populations are tiny (typically one trigger causing one
    /// event), so the linear searches here beat any map despite the nominal
    /// O(triggers × events) complexity.
    pub fn note_event_occurrence<'a>(
        &'a self,
        triggers: &[&'a Trigger],
        triggered_events: &mut EventsAndCauses<'a>,
        ignored_event_ids: &mut Vec<EventId>,
    ) {
        for &trigger in triggers {
            trigger.note_occurrence();
            for &event_id in trigger.event_ids() {
                let Some(event) = self.event_if_present(event_id) else {
                    if !ignored_event_ids.contains(&event_id) {
                        ignored_event_ids.push(event_id);
                    }
                    continue;
                };

                match triggered_events
                    .iter_mut()
                    .find(|(entry, _)| entry.id() == event_id)
                {
                    Some((_, causes)) => causes.push(trigger),
                    None => {
                        event.note_occurrence();
                        triggered_events.push((event, vec![trigger]));
                    }
                }
            }
        }
    }

    /// Invoke every report action of every triggered event, in order.
    /// State is read-only throughout.
    pub fn perform_event_report_actions(
        &self,
        study: &dyn Study,
        triggered_events: &EventsAndCauses<'_>,
    ) -> Result<(), EventError> {
        if triggered_events.is_empty() {
            return Err(EventError::PreconditionViolated {
                method: "EventSystem::perform_event_report_actions",
                message: "triggered-event list is empty",
            });
        }

        for (event, causes) in triggered_events {
            trace!(
                event = event.description(),
                causes = causes.len(),
                "dispatching report actions"
            );
            event.perform_report_actions(study, causes);
        }
        Ok(())
    }

    /// Invoke every change action of every triggered event, in order,
    /// accumulating exit statuses into `result`, then record the lowest
    /// stage whose version the actions changed so the integrator knows how
    /// far to re-realize.
    pub fn perform_event_change_actions(
        &self,
        study: &mut dyn Study,
        triggered_events: &EventsAndCauses<'_>,
        result: &mut EventChangeResult,
    ) -> Result<(), EventError> {
        if triggered_events.is_empty() {
            return Err(EventError::PreconditionViolated {
                method: "EventSystem::perform_event_change_actions",
                message: "triggered-event list is empty",
            });
        }

        let snapshot = study.internal_state_mut().stage_versions();
        result.clear();

        for (event, causes) in triggered_events {
            trace!(
                event = event.description(),
                causes = causes.len(),
                "dispatching change actions"
            );
            event.perform_change_actions(study, causes, result);
        }

        let lowest = study.internal_state_mut().lowest_stage_difference(&snapshot);
        result.set_lowest_modified_stage(lowest);
        Ok(())
    }
}
