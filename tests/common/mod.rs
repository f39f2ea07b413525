//! Shared fixtures for the event subsystem integration tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use simevents::prelude::*;

/// Log shared between test actions and assertions.
pub type ActionLog = Arc<Mutex<Vec<String>>>;

pub fn new_log() -> ActionLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn log_entries(log: &ActionLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// Timer that always returns the same next-trigger time.
#[derive(Debug, Clone)]
pub struct FixedTimer(pub f64);

impl TimerSource for FixedTimer {
    fn time_of_next_trigger(&self, _: &EventSystem, _: &State, _: f64) -> f64 {
        self.0
    }

    fn clone_boxed(&self) -> Box<dyn TimerSource> {
        Box::new(self.clone())
    }
}

/// Witness reporting a fixed depends-on stage per derivative order.
#[derive(Debug, Clone)]
pub struct StagedWitness {
    pub stages: Vec<Stage>,
}

impl WitnessSource for StagedWitness {
    fn value(&self, _: &dyn Study, _: &State, _: usize) -> f64 {
        0.0
    }

    fn depends_on_stage(&self, deriv_order: usize) -> Stage {
        self.stages[deriv_order.min(self.stages.len() - 1)]
    }

    fn num_time_derivatives(&self) -> usize {
        self.stages.len() - 1
    }

    fn clone_boxed(&self) -> Box<dyn WitnessSource> {
        Box::new(self.clone())
    }
}

/// Event with one report action that appends `label` to the log.
pub fn report_event(label: &str, log: &ActionLog) -> Event {
    let mut event = Event::new(label);
    let label = label.to_string();
    let log = Arc::clone(log);
    event.adopt_action(Box::new(ReportAction::new(move |_, _, _| {
        log.lock().unwrap().push(label.clone());
    })));
    event
}

/// Event with one change action that appends `label` to the log and
/// succeeds.
pub fn change_event(label: &str, log: &ActionLog) -> Event {
    let mut event = Event::new(label);
    let label = label.to_string();
    let log = Arc::clone(log);
    event.adopt_action(Box::new(ChangeAction::new(move |_, _, _, result| {
        log.lock().unwrap().push(label.clone());
        result.report_exit_status(ExitStatus::Succeeded);
    })));
    event
}

/// Adopt a fixed timer trigger causing `event_id`.
pub fn adopt_fixed_timer(system: &mut EventSystem, t: f64, event_id: EventId) -> EventTriggerId {
    let mut timer = Trigger::timer(format!("timer@{t}"), Box::new(FixedTimer(t)));
    timer.add_event(event_id);
    system.adopt_event_trigger(timer)
}
