//! Actions attached to events
//!
//! An action is a callable bundled onto an [`Event`], classified as `Report`
//! (pure, const-state) or `Change` (may modify the study's internal state).
//! Change actions accumulate their outcome into an [`EventChangeResult`].

use crate::stage::Stage;
use crate::study::Study;

use super::event::Event;
use super::trigger::Trigger;

/// Classification of an action attached to an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    /// Pure observer; must not modify state.
    Report,
    /// May modify the study's internal state.
    Change,
}

/// Exit status reported by a change action.
///
/// Ordered so that the worst status is the greatest; aggregation keeps the
/// maximum across all actions of a dispatch pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ExitStatus {
    Succeeded,
    /// The action asks the integrator to unwind after the current dispatch
    /// pass completes.
    ShouldTerminate,
    Failed,
}

/// Accumulator for the outcome of one change-action dispatch pass.
///
/// Actions report exit statuses into it; after the pass the dispatcher
/// records the lowest stage whose version number the actions changed, which
/// tells the integrator how far it must re-realize.
#[derive(Debug, Clone)]
pub struct EventChangeResult {
    exit_status: ExitStatus,
    message: Option<String>,
    lowest_modified_stage: Option<Stage>,
}

impl EventChangeResult {
    pub fn new() -> Self {
        EventChangeResult {
            exit_status: ExitStatus::Succeeded,
            message: None,
            lowest_modified_stage: None,
        }
    }

    /// Reset to the state of a freshly constructed result.
    pub fn clear(&mut self) {
        *self = EventChangeResult::new();
    }

    /// Record an action's exit status; the worst status reported so far
    /// dominates.
    pub fn report_exit_status(&mut self, status: ExitStatus) {
        if status > self.exit_status {
            self.exit_status = status;
        }
    }

    /// Record a failure with a diagnostic message. The first message sticks.
    pub fn report_failure(&mut self, message: impl Into<String>) {
        self.report_exit_status(ExitStatus::Failed);
        if self.message.is_none() {
            self.message = Some(message.into());
        }
    }

    pub fn exit_status(&self) -> ExitStatus {
        self.exit_status
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Lowest stage modified by the dispatch pass, or `None` if the actions
    /// left every stage version unchanged.
    pub fn lowest_modified_stage(&self) -> Option<Stage> {
        self.lowest_modified_stage
    }

    pub(crate) fn set_lowest_modified_stage(&mut self, stage: Option<Stage>) {
        self.lowest_modified_stage = stage;
    }
}

impl Default for EventChangeResult {
    fn default() -> Self {
        Self::new()
    }
}

/// A callable attached to an event.
///
/// Implementors override the method matching their [`kind`](Self::kind);
/// the other default is never invoked by the dispatcher.
pub trait EventAction: Send + Sync {
    fn kind(&self) -> ActionKind;

    /// Deep-clone for registry cloning.
    fn clone_boxed(&self) -> Box<dyn EventAction>;

    /// Invoked for `Report` actions. Receives the study read-only.
    fn report(&self, study: &dyn Study, event: &Event, causes: &[&Trigger]) {
        let _ = (study, event, causes);
    }

    /// Invoked for `Change` actions. May modify the study's internal state
    /// and must record an exit status in `result`.
    fn change(
        &self,
        study: &mut dyn Study,
        event: &Event,
        causes: &[&Trigger],
        result: &mut EventChangeResult,
    ) {
        let _ = (study, event, causes);
        result.report_exit_status(ExitStatus::Succeeded);
    }
}

/// Report action wrapping a closure.
pub struct ReportAction<F>
where
    F: Fn(&dyn Study, &Event, &[&Trigger]) + Send + Sync + Clone + 'static,
{
    func: F,
}

impl<F> ReportAction<F>
where
    F: Fn(&dyn Study, &Event, &[&Trigger]) + Send + Sync + Clone + 'static,
{
    pub fn new(func: F) -> Self {
        ReportAction { func }
    }
}

impl<F> EventAction for ReportAction<F>
where
    F: Fn(&dyn Study, &Event, &[&Trigger]) + Send + Sync + Clone + 'static,
{
    fn kind(&self) -> ActionKind {
        ActionKind::Report
    }

    fn clone_boxed(&self) -> Box<dyn EventAction> {
        Box::new(ReportAction {
            func: self.func.clone(),
        })
    }

    fn report(&self, study: &dyn Study, event: &Event, causes: &[&Trigger]) {
        (self.func)(study, event, causes);
    }
}

/// Change action wrapping a closure.
pub struct ChangeAction<F>
where
    F: Fn(&mut dyn Study, &Event, &[&Trigger], &mut EventChangeResult) + Send + Sync + Clone + 'static,
{
    func: F,
}

impl<F> ChangeAction<F>
where
    F: Fn(&mut dyn Study, &Event, &[&Trigger], &mut EventChangeResult) + Send + Sync + Clone + 'static,
{
    pub fn new(func: F) -> Self {
        ChangeAction { func }
    }
}

impl<F> EventAction for ChangeAction<F>
where
    F: Fn(&mut dyn Study, &Event, &[&Trigger], &mut EventChangeResult) + Send + Sync + Clone + 'static,
{
    fn kind(&self) -> ActionKind {
        ActionKind::Change
    }

    fn clone_boxed(&self) -> Box<dyn EventAction> {
        Box::new(ChangeAction {
            func: self.func.clone(),
        })
    }

    fn change(
        &self,
        study: &mut dyn Study,
        event: &Event,
        causes: &[&Trigger],
        result: &mut EventChangeResult,
    ) {
        (self.func)(study, event, causes, result);
    }
}
