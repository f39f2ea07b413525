//! Triggers: the mechanisms that detect events
//!
//! A trigger is either a *timer* (produces the next scheduled trigger time),
//! a *witness* (a continuous function of state whose sign changes mark
//! trigger instants), or an *explicit* signal fired directly by the time
//! stepper. Each trigger carries the ordered list of event ids it causes and
//! a mutable occurrence counter.

use std::fmt;

use crate::stage::Stage;
use crate::state::State;
use crate::study::Study;
use crate::system::EventSystem;

use super::event::OccurrenceCounter;
use super::ids::{EventId, EventTimerIndex, EventTriggerId, EventWitnessIndex};

/// Maximum number of time derivatives a witness may report.
pub const MAX_DERIV: usize = 2;

/// Default localization window as a fraction of the accuracy in use.
pub const DEFAULT_LOCALIZATION_WINDOW: f64 = 0.1;

/// Sign-transition policy of a witness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Rising,
    Falling,
    RisingAndFalling,
}

impl Direction {
    pub fn triggers_on_rising(self) -> bool {
        matches!(self, Direction::Rising | Direction::RisingAndFalling)
    }

    pub fn triggers_on_falling(self) -> bool {
        matches!(self, Direction::Falling | Direction::RisingAndFalling)
    }
}

/// Continuity classification of a witness function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuity {
    Continuous,
    Discontinuous,
}

/// Produces the next scheduled trigger time for a timer.
pub trait TimerSource: Send + Sync {
    /// Time of the next trigger strictly interpreted against
    /// `time_of_last_trigger`, the last time this timer fired. Returns
    /// `f64::INFINITY` when no further trigger exists.
    fn time_of_next_trigger(
        &self,
        system: &EventSystem,
        state: &State,
        time_of_last_trigger: f64,
    ) -> f64;

    /// Deep-clone for registry cloning.
    fn clone_boxed(&self) -> Box<dyn TimerSource>;
}

/// Continuous function of state whose zero crossings mark events.
pub trait WitnessSource: Send + Sync {
    /// Value of the witness function or one of its time derivatives.
    fn value(&self, study: &dyn Study, state: &State, deriv_order: usize) -> f64;

    /// Earliest stage the given derivative order depends on.
    fn depends_on_stage(&self, deriv_order: usize) -> Stage;

    /// Number of time derivatives this witness can report, before clamping
    /// to [`MAX_DERIV`].
    fn num_time_derivatives(&self) -> usize {
        0
    }

    /// Deep-clone for registry cloning.
    fn clone_boxed(&self) -> Box<dyn WitnessSource>;
}

/// Timer half of a trigger.
pub struct TimerData {
    source: Box<dyn TimerSource>,
    index: EventTimerIndex,
}

impl TimerData {
    /// Dense index assigned by topology realization; invalid before that.
    pub fn index(&self) -> EventTimerIndex {
        self.index
    }

    pub(crate) fn set_index(&mut self, index: EventTimerIndex) {
        self.index = index;
    }

    pub fn calc_time_of_next_trigger(
        &self,
        system: &EventSystem,
        state: &State,
        time_of_last_trigger: f64,
    ) -> f64 {
        self.source
            .time_of_next_trigger(system, state, time_of_last_trigger)
    }
}

impl Clone for TimerData {
    fn clone(&self) -> Self {
        TimerData {
            source: self.source.clone_boxed(),
            index: self.index,
        }
    }
}

/// Witness half of a trigger.
pub struct WitnessData {
    source: Box<dyn WitnessSource>,
    direction: Direction,
    continuity: Continuity,
    localization_window: f64,
    index: EventWitnessIndex,
}

impl WitnessData {
    /// Dense index assigned by topology realization; invalid before that.
    pub fn index(&self) -> EventWitnessIndex {
        self.index
    }

    pub(crate) fn set_index(&mut self, index: EventWitnessIndex) {
        self.index = index;
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn continuity(&self) -> Continuity {
        self.continuity
    }

    /// Width of the time window, relative to the accuracy in use, within
    /// which a zero crossing must be bracketed.
    pub fn localization_window(&self) -> f64 {
        self.localization_window
    }

    pub fn set_localization_window(&mut self, window: f64) {
        self.localization_window = window;
    }

    pub fn calc_value(&self, study: &dyn Study, state: &State, deriv_order: usize) -> f64 {
        self.source.value(study, state, deriv_order)
    }

    pub fn depends_on_stage(&self, deriv_order: usize) -> Stage {
        self.source.depends_on_stage(deriv_order)
    }

    /// Derivative count clamped to [`MAX_DERIV`].
    pub fn num_time_derivatives(&self) -> usize {
        self.source.num_time_derivatives().min(MAX_DERIV)
    }
}

impl Clone for WitnessData {
    fn clone(&self) -> Self {
        WitnessData {
            source: self.source.clone_boxed(),
            direction: self.direction,
            continuity: self.continuity,
            localization_window: self.localization_window,
            index: self.index,
        }
    }
}

/// Discrimination of a trigger's detection mechanism.
#[derive(Clone)]
pub enum TriggerKind {
    Timer(TimerData),
    Witness(WitnessData),
    /// Fired directly by the time stepper rather than detected; used by the
    /// predefined initialization, time-advanced, and termination triggers.
    Explicit,
}

/// The mechanism that detects one or more events.
pub struct Trigger {
    description: String,
    kind: TriggerKind,
    causes: Vec<EventId>,
    id: EventTriggerId,
    occurrences: OccurrenceCounter,
}

impl Trigger {
    /// Create a timer trigger.
    pub fn timer(description: impl Into<String>, source: Box<dyn TimerSource>) -> Self {
        Trigger::with_kind(
            description,
            TriggerKind::Timer(TimerData {
                source,
                index: EventTimerIndex::INVALID,
            }),
        )
    }

    /// Create a witness trigger.
    pub fn witness(
        description: impl Into<String>,
        source: Box<dyn WitnessSource>,
        direction: Direction,
        continuity: Continuity,
    ) -> Self {
        Trigger::with_kind(
            description,
            TriggerKind::Witness(WitnessData {
                source,
                direction,
                continuity,
                localization_window: DEFAULT_LOCALIZATION_WINDOW,
                index: EventWitnessIndex::INVALID,
            }),
        )
    }

    /// Create an explicit trigger fired directly by the time stepper.
    pub fn explicit(description: impl Into<String>) -> Self {
        Trigger::with_kind(description, TriggerKind::Explicit)
    }

    fn with_kind(description: impl Into<String>, kind: TriggerKind) -> Self {
        Trigger {
            description: description.into(),
            kind,
            causes: Vec::new(),
            id: EventTriggerId::INVALID,
            occurrences: OccurrenceCounter::default(),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Id assigned at adoption; invalid until then.
    pub fn id(&self) -> EventTriggerId {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: EventTriggerId) {
        self.id = id;
    }

    /// Append an event this trigger causes.
    pub fn add_event(&mut self, id: EventId) {
        self.causes.push(id);
    }

    pub fn num_events(&self) -> usize {
        self.causes.len()
    }

    /// Ordered list of event ids this trigger causes.
    pub fn event_ids(&self) -> &[EventId] {
        &self.causes
    }

    pub fn kind(&self) -> &TriggerKind {
        &self.kind
    }

    pub(crate) fn kind_mut(&mut self) -> &mut TriggerKind {
        &mut self.kind
    }

    pub fn is_timer(&self) -> bool {
        matches!(self.kind, TriggerKind::Timer(_))
    }

    pub fn is_witness(&self) -> bool {
        matches!(self.kind, TriggerKind::Witness(_))
    }

    pub fn as_timer(&self) -> Option<&TimerData> {
        match &self.kind {
            TriggerKind::Timer(timer) => Some(timer),
            _ => None,
        }
    }

    pub fn as_witness(&self) -> Option<&WitnessData> {
        match &self.kind {
            TriggerKind::Witness(witness) => Some(witness),
            _ => None,
        }
    }

    pub fn as_witness_mut(&mut self) -> Option<&mut WitnessData> {
        match &mut self.kind {
            TriggerKind::Witness(witness) => Some(witness),
            _ => None,
        }
    }

    /// Times this trigger has fired.
    pub fn num_occurrences(&self) -> u64 {
        self.occurrences.count()
    }

    pub(crate) fn note_occurrence(&self) {
        self.occurrences.bump();
    }
}

impl Clone for Trigger {
    fn clone(&self) -> Self {
        Trigger {
            description: self.description.clone(),
            kind: self.kind.clone(),
            causes: self.causes.clone(),
            id: self.id,
            occurrences: self.occurrences.clone(),
        }
    }
}

impl fmt::Debug for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.kind {
            TriggerKind::Timer(_) => "Timer",
            TriggerKind::Witness(_) => "Witness",
            TriggerKind::Explicit => "Explicit",
        };
        f.debug_struct("Trigger")
            .field("description", &self.description)
            .field("kind", &kind)
            .field("id", &self.id)
            .field("causes", &self.causes)
            .field("occurrences", &self.occurrences.count())
            .finish()
    }
}

/// Timer firing at `t_start`, then every `t_period`, until an optional
/// `t_end`.
#[derive(Debug, Clone)]
pub struct PeriodicTimer {
    t_start: f64,
    t_period: f64,
    t_end: Option<f64>,
}

impl PeriodicTimer {
    pub fn new(t_start: f64, t_period: f64) -> Self {
        PeriodicTimer {
            t_start,
            t_period,
            t_end: None,
        }
    }

    pub fn with_end(t_start: f64, t_period: f64, t_end: f64) -> Self {
        PeriodicTimer {
            t_start,
            t_period,
            t_end: Some(t_end),
        }
    }
}

impl TimerSource for PeriodicTimer {
    fn time_of_next_trigger(
        &self,
        _system: &EventSystem,
        _state: &State,
        time_of_last_trigger: f64,
    ) -> f64 {
        let next = if time_of_last_trigger < self.t_start {
            self.t_start
        } else {
            let periods = ((time_of_last_trigger - self.t_start) / self.t_period).floor() + 1.0;
            self.t_start + periods * self.t_period
        };
        match self.t_end {
            Some(t_end) if next > t_end => f64::INFINITY,
            _ => next,
        }
    }

    fn clone_boxed(&self) -> Box<dyn TimerSource> {
        Box::new(self.clone())
    }
}

/// Timer firing exactly once, at `t`.
#[derive(Debug, Clone)]
pub struct OnceTimer {
    t: f64,
}

impl OnceTimer {
    pub fn new(t: f64) -> Self {
        OnceTimer { t }
    }
}

impl TimerSource for OnceTimer {
    fn time_of_next_trigger(
        &self,
        _system: &EventSystem,
        _state: &State,
        time_of_last_trigger: f64,
    ) -> f64 {
        if time_of_last_trigger >= self.t {
            f64::INFINITY
        } else {
            self.t
        }
    }

    fn clone_boxed(&self) -> Box<dyn TimerSource> {
        Box::new(self.clone())
    }
}

/// Timer source wrapping a closure.
pub struct TimerFn<F>
where
    F: Fn(&EventSystem, &State, f64) -> f64 + Send + Sync + Clone + 'static,
{
    func: F,
}

impl<F> TimerFn<F>
where
    F: Fn(&EventSystem, &State, f64) -> f64 + Send + Sync + Clone + 'static,
{
    pub fn new(func: F) -> Self {
        TimerFn { func }
    }
}

impl<F> TimerSource for TimerFn<F>
where
    F: Fn(&EventSystem, &State, f64) -> f64 + Send + Sync + Clone + 'static,
{
    fn time_of_next_trigger(
        &self,
        system: &EventSystem,
        state: &State,
        time_of_last_trigger: f64,
    ) -> f64 {
        (self.func)(system, state, time_of_last_trigger)
    }

    fn clone_boxed(&self) -> Box<dyn TimerSource> {
        Box::new(TimerFn {
            func: self.func.clone(),
        })
    }
}

/// Witness source wrapping a closure, with a single depends-on stage for
/// every derivative order.
pub struct WitnessFn<F>
where
    F: Fn(&State, usize) -> f64 + Send + Sync + Clone + 'static,
{
    func: F,
    stage: Stage,
    num_derivs: usize,
}

impl<F> WitnessFn<F>
where
    F: Fn(&State, usize) -> f64 + Send + Sync + Clone + 'static,
{
    pub fn new(func: F, stage: Stage) -> Self {
        WitnessFn {
            func,
            stage,
            num_derivs: 0,
        }
    }

    pub fn with_derivatives(func: F, stage: Stage, num_derivs: usize) -> Self {
        WitnessFn {
            func,
            stage,
            num_derivs,
        }
    }
}

impl<F> WitnessSource for WitnessFn<F>
where
    F: Fn(&State, usize) -> f64 + Send + Sync + Clone + 'static,
{
    fn value(&self, _study: &dyn Study, state: &State, deriv_order: usize) -> f64 {
        (self.func)(state, deriv_order)
    }

    fn depends_on_stage(&self, _deriv_order: usize) -> Stage {
        self.stage
    }

    fn num_time_derivatives(&self) -> usize {
        self.num_derivs
    }

    fn clone_boxed(&self) -> Box<dyn WitnessSource> {
        Box::new(WitnessFn {
            func: self.func.clone(),
            stage: self.stage,
            num_derivs: self.num_derivs,
        })
    }
}
