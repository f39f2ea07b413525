//! Runtime-allocated trigger storage
//!
//! A `TriggerCollection` lives inside simulation state as a discrete
//! variable, holding timers and witnesses that come and go at run time.
//! Slots are recycled through an explicit free-slot stack so that indices
//! stay dense and stable while a trigger is resident.
//!
//! Accessing the collection for update does not invalidate any stage, but
//! adding or removing a trigger bumps the revision counter, which signals
//! the host that its per-trigger results cache is stale.

use crate::error::EventError;

use super::trigger::Trigger;

#[derive(Clone, Default)]
pub struct TriggerCollection {
    timers: Vec<Option<Trigger>>,
    free_timers: Vec<usize>,
    witnesses: Vec<Option<Trigger>>,
    free_witnesses: Vec<usize>,
    revision: u64,
}

impl TriggerCollection {
    pub fn new() -> Self {
        TriggerCollection::default()
    }

    /// Place a timer trigger into a free slot, reusing the most recently
    /// freed one if any.
    pub fn adopt_timer(&mut self, timer: Trigger) -> Result<usize, EventError> {
        if !timer.is_timer() {
            return Err(EventError::PreconditionViolated {
                method: "TriggerCollection::adopt_timer",
                message: "trigger is not a timer",
            });
        }
        self.revision += 1;
        Ok(adopt_into(&mut self.timers, &mut self.free_timers, timer))
    }

    /// Remove and return the timer at `slot`.
    pub fn remove_timer(&mut self, slot: usize) -> Result<Trigger, EventError> {
        let removed = remove_from(
            &mut self.timers,
            &mut self.free_timers,
            slot,
            "TriggerCollection::remove_timer",
        )?;
        self.revision += 1;
        Ok(removed)
    }

    /// Place a witness trigger into a free slot, reusing the most recently
    /// freed one if any.
    pub fn adopt_witness(&mut self, witness: Trigger) -> Result<usize, EventError> {
        if !witness.is_witness() {
            return Err(EventError::PreconditionViolated {
                method: "TriggerCollection::adopt_witness",
                message: "trigger is not a witness",
            });
        }
        self.revision += 1;
        Ok(adopt_into(
            &mut self.witnesses,
            &mut self.free_witnesses,
            witness,
        ))
    }

    /// Remove and return the witness at `slot`.
    pub fn remove_witness(&mut self, slot: usize) -> Result<Trigger, EventError> {
        let removed = remove_from(
            &mut self.witnesses,
            &mut self.free_witnesses,
            slot,
            "TriggerCollection::remove_witness",
        )?;
        self.revision += 1;
        Ok(removed)
    }

    /// Number of resident timers (occupied slots only).
    pub fn num_timers(&self) -> usize {
        self.timers.iter().filter(|slot| slot.is_some()).count()
    }

    /// Number of resident witnesses (occupied slots only).
    pub fn num_witnesses(&self) -> usize {
        self.witnesses.iter().filter(|slot| slot.is_some()).count()
    }

    /// Total timer slots, including empty ones.
    pub fn num_timer_slots(&self) -> usize {
        self.timers.len()
    }

    /// Total witness slots, including empty ones.
    pub fn num_witness_slots(&self) -> usize {
        self.witnesses.len()
    }

    pub fn timer(&self, slot: usize) -> Option<&Trigger> {
        self.timers.get(slot).and_then(|s| s.as_ref())
    }

    pub fn witness(&self, slot: usize) -> Option<&Trigger> {
        self.witnesses.get(slot).and_then(|s| s.as_ref())
    }

    /// Resident timers in slot order.
    pub fn timers(&self) -> impl Iterator<Item = &Trigger> {
        self.timers.iter().filter_map(|slot| slot.as_ref())
    }

    /// Resident witnesses in slot order.
    pub fn witnesses(&self) -> impl Iterator<Item = &Trigger> {
        self.witnesses.iter().filter_map(|slot| slot.as_ref())
    }

    /// Bumped on every adopt or remove; the host compares revisions to
    /// detect that per-trigger cache entries are stale.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Drop all resident triggers and free slots. Topology realization
    /// resets the collection this way; run-time triggers never survive it.
    pub fn clear(&mut self) {
        self.timers.clear();
        self.free_timers.clear();
        self.witnesses.clear();
        self.free_witnesses.clear();
        self.revision += 1;
    }
}

fn adopt_into(slots: &mut Vec<Option<Trigger>>, free: &mut Vec<usize>, trigger: Trigger) -> usize {
    match free.pop() {
        Some(slot) => {
            debug_assert!(slots[slot].is_none());
            slots[slot] = Some(trigger);
            slot
        }
        None => {
            slots.push(Some(trigger));
            slots.len() - 1
        }
    }
}

fn remove_from(
    slots: &mut Vec<Option<Trigger>>,
    free: &mut Vec<usize>,
    slot: usize,
    method: &'static str,
) -> Result<Trigger, EventError> {
    if slot >= slots.len() {
        return Err(EventError::InvalidIndex {
            method,
            index: slot,
            count: slots.len(),
        });
    }
    let Some(trigger) = slots[slot].take() else {
        return Err(EventError::Missing {
            method,
            index: slot,
        });
    };
    if slot == slots.len() - 1 {
        slots.pop();
    } else {
        free.push(slot);
    }
    Ok(trigger)
}
