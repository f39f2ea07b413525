//! Topology realization tests: dense indices and by-stage witness buckets

mod common;

use common::*;
use simevents::prelude::*;

fn witness_trigger(name: &str, stages: Vec<Stage>) -> Trigger {
    Trigger::witness(
        name,
        Box::new(StagedWitness { stages }),
        Direction::RisingAndFalling,
        Continuity::Continuous,
    )
}

#[test]
fn test_dense_indices_after_realize() {
    let mut system = EventSystem::new();
    let event_id = system.adopt_event(Event::new("E"));

    // Interleave timers and witnesses; classification partitions them.
    let t1 = adopt_fixed_timer(&mut system, 1.0, event_id);
    let mut w1 = witness_trigger("W1", vec![Stage::Position]);
    w1.add_event(event_id);
    let w1 = system.adopt_event_trigger(w1);
    let t2 = adopt_fixed_timer(&mut system, 2.0, event_id);
    let mut w2 = witness_trigger("W2", vec![Stage::Velocity]);
    w2.add_event(event_id);
    let w2 = system.adopt_event_trigger(w2);

    let mut state = State::new(0, 0);
    system.realize_topology(&mut state).unwrap();

    assert_eq!(system.num_event_timers(), 2);
    assert_eq!(system.num_event_witnesses(), 2);

    // Dense index equals position in the partitioned list, both as stored
    // in the cache and as written back onto the trigger.
    assert_eq!(system.event_timer(EventTimerIndex::new(0)).unwrap().id(), t1);
    assert_eq!(system.event_timer(EventTimerIndex::new(1)).unwrap().id(), t2);
    assert_eq!(system.event_witness(EventWitnessIndex::new(0)).unwrap().id(), w1);
    assert_eq!(system.event_witness(EventWitnessIndex::new(1)).unwrap().id(), w2);

    let trigger = system.event_trigger(t2).unwrap();
    assert_eq!(trigger.as_timer().unwrap().index(), EventTimerIndex::new(1));
    let trigger = system.event_trigger(w2).unwrap();
    assert_eq!(trigger.as_witness().unwrap().index(), EventWitnessIndex::new(1));
}

#[test]
fn test_by_stage_buckets_contain_each_witness_once() {
    let mut system = EventSystem::new();
    let event_id = system.adopt_event(Event::new("E"));

    // W0: value depends on Position, first derivative on Velocity.
    let mut w0 = witness_trigger("W0", vec![Stage::Position, Stage::Velocity]);
    w0.add_event(event_id);
    system.adopt_event_trigger(w0);
    // W1: value only, depends on Acceleration.
    let mut w1 = witness_trigger("W1", vec![Stage::Acceleration]);
    w1.add_event(event_id);
    system.adopt_event_trigger(w1);

    let mut state = State::new(0, 0);
    system.realize_topology(&mut state).unwrap();

    assert_eq!(
        system.witnesses_by_stage(Stage::Position, 0),
        &[EventWitnessIndex::new(0)]
    );
    assert_eq!(
        system.witnesses_by_stage(Stage::Velocity, 1),
        &[EventWitnessIndex::new(0)]
    );
    assert_eq!(
        system.witnesses_by_stage(Stage::Acceleration, 0),
        &[EventWitnessIndex::new(1)]
    );

    // Each (witness, derivative order) pair lands in exactly one bucket.
    for witness_index in 0..system.num_event_witnesses() {
        let witness_index = EventWitnessIndex::new(witness_index);
        let num_derivs = system
            .event_witness(witness_index)
            .unwrap()
            .as_witness()
            .unwrap()
            .num_time_derivatives();
        for deriv in 0..=num_derivs {
            let hits: usize = Stage::ALL
                .iter()
                .map(|&stage| {
                    system
                        .witnesses_by_stage(stage, deriv)
                        .iter()
                        .filter(|&&index| index == witness_index)
                        .count()
                })
                .sum();
            assert_eq!(hits, 1, "witness {witness_index} deriv {deriv}");
        }
    }
}

#[test]
fn test_derivative_orders_clamped() {
    let mut system = EventSystem::new();
    let event_id = system.adopt_event(Event::new("E"));

    // Claims more derivatives than the subsystem will use.
    let mut witness = witness_trigger(
        "many-derivs",
        vec![Stage::Time, Stage::Position, Stage::Velocity, Stage::Dynamics, Stage::Acceleration],
    );
    witness.add_event(event_id);
    let id = system.adopt_event_trigger(witness);

    let mut state = State::new(0, 0);
    system.realize_topology(&mut state).unwrap();

    let witness = system.event_trigger(id).unwrap();
    assert_eq!(witness.as_witness().unwrap().num_time_derivatives(), MAX_DERIV);
    assert_eq!(system.witnesses_by_stage(Stage::Time, 0).len(), 1);
    assert_eq!(system.witnesses_by_stage(Stage::Position, 1).len(), 1);
    assert_eq!(system.witnesses_by_stage(Stage::Velocity, 2).len(), 1);
    // Orders past the clamp are not bucketed.
    assert!(system.witnesses_by_stage(Stage::Dynamics, 3).is_empty());
}

#[test]
fn test_realize_is_idempotent_and_tracks_growth() {
    let mut system = EventSystem::new();
    let event_id = system.adopt_event(Event::new("E"));
    adopt_fixed_timer(&mut system, 1.0, event_id);

    let mut state = State::new(0, 0);
    system.realize_topology(&mut state).unwrap();
    system.realize_topology(&mut state).unwrap();
    assert_eq!(system.num_event_timers(), 1);
    assert_eq!(system.num_event_witnesses(), 0);

    // Registry growth between realizations is picked up by the next one.
    let mut witness = witness_trigger("late", vec![Stage::Position]);
    witness.add_event(event_id);
    system.adopt_event_trigger(witness);
    system.realize_topology(&mut state).unwrap();
    assert_eq!(system.num_event_witnesses(), 1);
}

#[test]
fn test_realize_resets_runtime_triggers() {
    let mut system = EventSystem::new();
    let event_id = system.adopt_event(Event::new("E"));

    let mut state = State::new(0, 0);
    system.realize_topology(&mut state).unwrap();

    let mut dynamic = witness_trigger("dynamic", vec![Stage::Position]);
    dynamic.add_event(event_id);
    state.triggers_mut().adopt_witness(dynamic).unwrap();
    assert_eq!(state.triggers().num_witnesses(), 1);

    system.realize_topology(&mut state).unwrap();
    assert_eq!(state.triggers().num_witnesses(), 0);
    assert_eq!(state.triggers().num_timers(), 0);
}

#[test]
fn test_cache_index_lookups_validate() {
    let system = EventSystem::new();
    assert!(matches!(
        system.event_timer(EventTimerIndex::INVALID),
        Err(EventError::InvalidArgument { .. })
    ));
    assert!(matches!(
        system.event_timer(EventTimerIndex::new(0)),
        Err(EventError::InvalidIndex { .. })
    ));
    assert!(matches!(
        system.event_witness(EventWitnessIndex::new(0)),
        Err(EventError::InvalidIndex { .. })
    ));
}
