//! Simulation state consumed by the event subsystem
//!
//! Holds time, the continuous variables, per-stage version numbers, and the
//! run-time trigger collection as a discrete variable. Mutators invalidate
//! the stage their variable belongs to, bumping the version of that stage
//! and every stage above it.

use nalgebra::DVector;

use crate::events::TriggerCollection;
use crate::stage::{Stage, StageVersions};

pub struct State {
    time: f64,
    q: DVector<f64>,
    u: DVector<f64>,
    versions: StageVersions,
    triggers: TriggerCollection,
}

impl State {
    /// State with `nq` generalized coordinates and `nu` generalized speeds,
    /// all zero, at time zero.
    pub fn new(nq: usize, nu: usize) -> Self {
        State {
            time: 0.0,
            q: DVector::zeros(nq),
            u: DVector::zeros(nu),
            versions: StageVersions::new(),
            triggers: TriggerCollection::new(),
        }
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn set_time(&mut self, time: f64) {
        self.time = time;
        self.versions.invalidate(Stage::Time);
    }

    /// Generalized coordinates.
    pub fn q(&self) -> &DVector<f64> {
        &self.q
    }

    /// Writable coordinates; invalidates `Position` and above.
    pub fn q_mut(&mut self) -> &mut DVector<f64> {
        self.versions.invalidate(Stage::Position);
        &mut self.q
    }

    /// Generalized speeds.
    pub fn u(&self) -> &DVector<f64> {
        &self.u
    }

    /// Writable speeds; invalidates `Velocity` and above.
    pub fn u_mut(&mut self) -> &mut DVector<f64> {
        self.versions.invalidate(Stage::Velocity);
        &mut self.u
    }

    /// Snapshot of every stage's version number.
    pub fn stage_versions(&self) -> StageVersions {
        self.versions
    }

    /// Lowest stage whose version changed since `snapshot` was taken, or
    /// `None` if nothing changed.
    pub fn lowest_stage_difference(&self, snapshot: &StageVersions) -> Option<Stage> {
        self.versions.lowest_difference(snapshot)
    }

    /// Run-time triggers held by this state.
    pub fn triggers(&self) -> &TriggerCollection {
        &self.triggers
    }

    /// Writable run-time trigger collection. Updating it does not
    /// invalidate any stage; additions and removals are signalled through
    /// the collection's revision counter instead.
    pub fn triggers_mut(&mut self) -> &mut TriggerCollection {
        &mut self.triggers
    }
}

impl Default for State {
    fn default() -> Self {
        State::new(0, 0)
    }
}
