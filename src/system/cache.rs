//! Topology cache: derived partition of the trigger registry
//!
//! Rebuilt by topology realization, which walks the registry once and
//! classifies every trigger: timers get dense timer indices, witnesses get
//! dense witness indices plus by-(stage, derivative-order) bucket entries.
//! Any registry change implicitly invalidates the cache until the next
//! realization.

use tracing::debug;

use crate::error::EventError;
use crate::events::{
    EventTimerIndex, EventTriggerId, EventWitnessIndex, Trigger, TriggerKind, MAX_DERIV,
};
use crate::stage::Stage;
use crate::state::State;

use super::EventSystem;

#[derive(Clone, Default)]
pub(crate) struct TopologyCache {
    /// Trigger ids of all timers, in dense [`EventTimerIndex`] order.
    pub(super) timers: Vec<EventTriggerId>,
    /// Trigger ids of all witnesses, in dense [`EventWitnessIndex`] order.
    pub(super) witnesses: Vec<EventTriggerId>,
    /// Witness indices bucketed by depends-on stage and derivative order.
    pub(super) by_stage: [[Vec<EventWitnessIndex>; MAX_DERIV + 1]; Stage::NUM_VALID],
}

impl TopologyCache {
    fn clear(&mut self) {
        self.timers.clear();
        self.witnesses.clear();
        for stage in &mut self.by_stage {
            for bucket in stage {
                bucket.clear();
            }
        }
    }
}

impl EventSystem {
    /// Rebuild the topology cache and reset the state's run-time trigger
    /// collection, which starts empty after every topology realization.
    pub fn realize_topology(&mut self, state: &mut State) -> Result<(), EventError> {
        state.triggers_mut().clear();

        self.cache.clear();
        let EventSystem {
            triggers, cache, ..
        } = self;
        for slot in triggers.iter_mut() {
            let Some(trigger) = slot.as_mut() else {
                continue;
            };
            let id = trigger.id();
            match trigger.kind_mut() {
                TriggerKind::Timer(timer) => {
                    let index = EventTimerIndex::new(cache.timers.len());
                    timer.set_index(index);
                    cache.timers.push(id);
                }
                TriggerKind::Witness(witness) => {
                    let index = EventWitnessIndex::new(cache.witnesses.len());
                    witness.set_index(index);
                    cache.witnesses.push(id);
                    for deriv in 0..=witness.num_time_derivatives() {
                        let stage = witness.depends_on_stage(deriv);
                        cache.by_stage[stage.index()][deriv].push(index);
                    }
                }
                TriggerKind::Explicit => {}
            }
        }

        debug!(
            timers = self.cache.timers.len(),
            witnesses = self.cache.witnesses.len(),
            "rebuilt event topology cache"
        );
        Ok(())
    }

    /// Number of timers found by the last topology realization.
    pub fn num_event_timers(&self) -> usize {
        self.cache.timers.len()
    }

    /// Number of witnesses found by the last topology realization.
    pub fn num_event_witnesses(&self) -> usize {
        self.cache.witnesses.len()
    }

    /// Timer trigger at a dense timer index.
    pub fn event_timer(&self, index: EventTimerIndex) -> Result<&Trigger, EventError> {
        const METHOD: &str = "EventSystem::event_timer";
        if !index.is_valid() {
            return Err(EventError::InvalidArgument {
                method: METHOD,
                id_kind: "EventTimerIndex",
            });
        }
        let id = self
            .cache
            .timers
            .get(index.index())
            .ok_or(EventError::InvalidIndex {
                method: METHOD,
                index: index.index(),
                count: self.cache.timers.len(),
            })?;
        Ok(self.cached_trigger(*id))
    }

    /// Witness trigger at a dense witness index.
    pub fn event_witness(&self, index: EventWitnessIndex) -> Result<&Trigger, EventError> {
        const METHOD: &str = "EventSystem::event_witness";
        if !index.is_valid() {
            return Err(EventError::InvalidArgument {
                method: METHOD,
                id_kind: "EventWitnessIndex",
            });
        }
        let id = self
            .cache
            .witnesses
            .get(index.index())
            .ok_or(EventError::InvalidIndex {
                method: METHOD,
                index: index.index(),
                count: self.cache.witnesses.len(),
            })?;
        Ok(self.cached_trigger(*id))
    }

    /// Witness indices whose derivative `deriv_order` depends on `stage`.
    pub fn witnesses_by_stage(&self, stage: Stage, deriv_order: usize) -> &[EventWitnessIndex] {
        self.cache.by_stage[stage.index()]
            .get(deriv_order)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
