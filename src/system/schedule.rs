//! Active trigger queries and next-event scheduling

use crate::error::EventError;
use crate::events::Trigger;
use crate::study::Study;

use super::EventSystem;

/// Earliest next report and change times across the active timers, with the
/// timers sharing each winning time grouped in active-set order.
pub struct NextEventTimes<'a> {
    pub time_of_next_report: f64,
    pub report_timers: Vec<&'a Trigger>,
    pub time_of_next_change: f64,
    pub change_timers: Vec<&'a Trigger>,
}

impl EventSystem {
    /// Currently active witnesses: the static topology-cache sequence
    /// followed by the state's run-time witnesses in slot order.
    pub fn find_active_event_witnesses<'a>(&'a self, study: &'a dyn Study) -> Vec<&'a Trigger> {
        let mut witnesses: Vec<&Trigger> = self
            .cache
            .witnesses
            .iter()
            .map(|&id| self.cached_trigger(id))
            .collect();
        witnesses.extend(study.current_state().triggers().witnesses());
        witnesses
    }

    /// Currently active timers: the static topology-cache sequence followed
    /// by the state's run-time timers in slot order.
    pub fn find_active_event_timers<'a>(&'a self, study: &'a dyn Study) -> Vec<&'a Trigger> {
        let mut timers: Vec<&Trigger> = self
            .cache
            .timers
            .iter()
            .map(|&id| self.cached_trigger(id))
            .collect();
        timers.extend(study.current_state().triggers().timers());
        timers
    }

    /// Earliest scheduled report and change times across all active timers.
    ///
    /// A timer is a *change* timer if any event it causes has at least one
    /// change action, otherwise a *report* timer; the two categories are
    /// scheduled independently since a single step may dispatch both.
    /// Next-times are compared exactly — tolerances belong to the
    /// integrator, which canonicalizes equal next-times to identical
    /// values — and timers with no further trigger (`+inf`) are excluded.
    pub fn find_next_scheduled_event_times<'a>(
        &'a self,
        study: &'a dyn Study,
        time_of_last_report: f64,
        time_of_last_change: f64,
    ) -> Result<NextEventTimes<'a>, EventError> {
        let state = study.current_state();
        let mut times = NextEventTimes {
            time_of_next_report: f64::INFINITY,
            report_timers: Vec::new(),
            time_of_next_change: f64::INFINITY,
            change_timers: Vec::new(),
        };

        for trigger in self.find_active_event_timers(study) {
            let Some(timer) = trigger.as_timer() else {
                continue;
            };

            let mut has_change_action = false;
            for &event_id in trigger.event_ids() {
                if self.event(event_id)?.has_change_action() {
                    has_change_action = true;
                    break;
                }
            }

            let (best, winners, time_of_last) = if has_change_action {
                (
                    &mut times.time_of_next_change,
                    &mut times.change_timers,
                    time_of_last_change,
                )
            } else {
                (
                    &mut times.time_of_next_report,
                    &mut times.report_timers,
                    time_of_last_report,
                )
            };

            let t = timer.calc_time_of_next_trigger(self, state, time_of_last);
            if t == f64::INFINITY || t > *best {
                continue; // not interesting
            }
            if t < *best {
                winners.clear(); // forget previous earliest
                *best = t;
            }
            winners.push(trigger);
        }

        Ok(times)
    }
}
