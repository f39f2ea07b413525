//! Registry tests: predefined ids, adoption, validated accessors

mod common;

use common::*;
use simevents::prelude::*;

#[test]
fn test_predefined_ids() {
    let system = EventSystem::new();

    assert_eq!(system.initialization_event_id(), EventId::new(0));
    assert_eq!(system.time_advanced_event_id(), EventId::new(1));
    assert_eq!(system.termination_event_id(), EventId::new(2));
    assert_eq!(system.extreme_value_isolated_event_id(), EventId::new(3));

    assert_eq!(system.initialization_trigger_id(), EventTriggerId::new(0));
    assert_eq!(system.time_advanced_trigger_id(), EventTriggerId::new(1));
    assert_eq!(system.termination_trigger_id(), EventTriggerId::new(2));

    assert_eq!(system.num_events(), 4);
    assert_eq!(system.num_event_triggers(), 3);

    let event = system.event(system.initialization_event_id()).unwrap();
    assert_eq!(event.kind(), EventKind::Initialization);
    let event = system.event(system.extreme_value_isolated_event_id()).unwrap();
    assert_eq!(event.kind(), EventKind::ExtremeValueIsolated);

    // Predefined triggers are fired explicitly by the time stepper and
    // point at their matching events.
    let trigger = system.event_trigger(system.termination_trigger_id()).unwrap();
    assert!(matches!(trigger.kind(), TriggerKind::Explicit));
    assert_eq!(trigger.event_ids(), &[system.termination_event_id()]);
}

#[test]
fn test_adoption_assigns_dense_monotonic_ids() {
    let mut system = EventSystem::new();
    let base_events = system.num_events();
    let base_triggers = system.num_event_triggers();

    let e1 = system.adopt_event(Event::new("first"));
    let e2 = system.adopt_event(Event::new("second"));
    assert_eq!(e1, EventId::new(base_events));
    assert_eq!(e2, EventId::new(base_events + 1));

    let t1 = adopt_fixed_timer(&mut system, 1.0, e1);
    let t2 = adopt_fixed_timer(&mut system, 2.0, e2);
    assert_eq!(t1, EventTriggerId::new(base_triggers));
    assert_eq!(t2, EventTriggerId::new(base_triggers + 1));
}

#[test]
fn test_id_written_back_and_lookup_round_trips() {
    let mut system = EventSystem::new();

    let event_id = system.adopt_event(Event::new("tracked"));
    let event = system.event(event_id).unwrap();
    assert_eq!(event.id(), event_id);
    assert_eq!(event.description(), "tracked");
    assert!(system.has_event(event_id));

    let trigger_id = adopt_fixed_timer(&mut system, 1.0, event_id);
    let trigger = system.event_trigger(trigger_id).unwrap();
    assert_eq!(trigger.id(), trigger_id);
    assert!(system.has_event_trigger(trigger_id));
}

#[test]
fn test_accessors_reject_invalid_ids() {
    let system = EventSystem::new();

    assert!(matches!(
        system.event(EventId::INVALID),
        Err(EventError::InvalidArgument { .. })
    ));
    assert!(matches!(
        system.event(EventId::new(999)),
        Err(EventError::InvalidIndex { .. })
    ));
    assert!(matches!(
        system.event_trigger(EventTriggerId::INVALID),
        Err(EventError::InvalidArgument { .. })
    ));
    assert!(matches!(
        system.event_trigger(EventTriggerId::new(999)),
        Err(EventError::InvalidIndex { .. })
    ));

    // has_event / has_event_trigger are total.
    assert!(!system.has_event(EventId::INVALID));
    assert!(!system.has_event(EventId::new(999)));
    assert!(!system.has_event_trigger(EventTriggerId::INVALID));
    assert!(!system.has_event_trigger(EventTriggerId::new(999)));
}

#[test]
fn test_error_messages_embed_id_and_method() {
    let system = EventSystem::new();

    let message = system.event(EventId::new(42)).unwrap_err().to_string();
    assert!(message.contains("EventSystem::event"));
    assert!(message.contains("42"));

    let message = system.event(EventId::INVALID).unwrap_err().to_string();
    assert!(message.contains("invalid"));
}

#[test]
fn test_event_mut_allows_growing_actions() {
    let mut system = EventSystem::new();
    let log = new_log();
    let event_id = system.adopt_event(Event::new("grows"));

    let log_clone = log.clone();
    system
        .event_mut(event_id)
        .unwrap()
        .adopt_action(Box::new(ReportAction::new(move |_, _, _| {
            log_clone.lock().unwrap().push("late action".to_string());
        })));

    assert_eq!(system.event(event_id).unwrap().num_actions(), 1);
    assert!(system.event(event_id).unwrap().has_report_action());
    assert!(!system.event(event_id).unwrap().has_change_action());
}

#[test]
fn test_clone_deep_copies_registries() {
    let mut system = EventSystem::new();
    let log = new_log();
    let event_id = system.adopt_event(report_event("shared", &log));
    let trigger_id = adopt_fixed_timer(&mut system, 1.0, event_id);

    let copy = system.clone();

    // Occurrences bumped through the original are invisible to the copy.
    let trigger = system.event_trigger(trigger_id).unwrap();
    let mut triggered = EventsAndCauses::new();
    let mut ignored = Vec::new();
    system.note_event_occurrence(&[trigger], &mut triggered, &mut ignored);

    assert_eq!(system.event(event_id).unwrap().num_occurrences(), 1);
    assert_eq!(copy.event(event_id).unwrap().num_occurrences(), 0);
    assert_eq!(copy.event_trigger(trigger_id).unwrap().num_occurrences(), 0);

    // Growing the copy leaves the original untouched.
    let mut copy = copy;
    copy.adopt_event(Event::new("only in copy"));
    assert_eq!(copy.num_events(), system.num_events() + 1);
}
