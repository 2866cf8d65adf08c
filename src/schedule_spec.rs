//! Externally supplied pinned time/worker overrides per work unit.
//!
//! Grounded in the original implementation's `WorkSpec`/`ScheduleSpec`
//! (a per-work-unit override container consulted by the scheduler before it
//! queries either timeline). Unlike the original's `defaultdict`-backed
//! global, this is an explicit, owned map the caller constructs and hands
//! to the [`crate::Scheduler`] — there is no implicit global state (see
//! `SPEC_FULL.md` §9's note on collapsing global state into owned values).

use std::collections::HashMap;

use crate::time::Tick;
use crate::Id;

/// Pinned overrides for one work unit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkSpec {
    /// If set, the façade uses this as the work unit's total execution
    /// time instead of asking the work-time estimator, splitting it evenly
    /// across inseparable-chain members with zero lag.
    pub assigned_time: Option<Tick>,
    /// If set, overrides the caller-supplied team's per-specialty counts.
    pub assigned_workers: Option<HashMap<String, u32>>,
}

/// An explicit, owned mapping from work-unit id to its [`WorkSpec`].
///
/// The original's `chain` override field (pinning an inseparable chain
/// externally) is not carried over: its own source marks it unsupported,
/// and this crate's inseparable chains are already a first-class part of
/// the work graph (`WorkGraph::set_inseparable_successor`), so there is
/// nothing left for such an override to do.
#[derive(Debug, Clone, Default)]
pub struct ScheduleSpec {
    by_work: HashMap<Id, WorkSpec>,
}

impl ScheduleSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_exec_time(&mut self, work_id: impl Into<Id>, time: Tick) -> &mut Self {
        self.by_work.entry(work_id.into()).or_default().assigned_time = Some(time);
        self
    }

    pub fn assign_workers(
        &mut self,
        work_id: impl Into<Id>,
        workers: HashMap<String, u32>,
    ) -> &mut Self {
        self.by_work.entry(work_id.into()).or_default().assigned_workers = Some(workers);
        self
    }

    pub fn work_spec(&self, work_id: &str) -> Option<&WorkSpec> {
        self.by_work.get(work_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::tick;

    #[test]
    fn missing_work_has_no_spec() {
        let spec = ScheduleSpec::new();
        assert!(spec.work_spec("nope").is_none());
    }

    #[test]
    fn set_exec_time_then_lookup() {
        let mut spec = ScheduleSpec::new();
        spec.set_exec_time("w1", tick(5));
        let ws = spec.work_spec("w1").unwrap();
        assert_eq!(ws.assigned_time.unwrap().value(), 5.0);
        assert!(ws.assigned_workers.is_none());
    }
}
