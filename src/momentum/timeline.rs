//! The worker-capacity ("momentum") timeline: per (contractor, specialty) a
//! sorted log of capacity-change events, answering earliest-fit queries
//! under a composite multi-specialty requirement.

use std::collections::{BTreeMap, HashMap, VecDeque};

use tracing::{debug, trace};

use super::error::MomentumError;
use super::event::{at_or_after_bound, at_or_before_bound, key_for, one_tick_after, Event, EventKey, EventKind};
use crate::contractor::{Contractor, TeamMember, WorkerTeam};
use crate::time::{infeasible, is_infeasible, tick, Tick};
use crate::Id;

/// One (contractor, specialty) capacity log.
#[derive(Debug)]
struct SpecialtyLog {
    initial_capacity: u32,
    events: BTreeMap<EventKey, Event>,
}

impl SpecialtyLog {
    fn new(initial_capacity: u32) -> Self {
        let mut events = BTreeMap::new();
        events.insert(
            key_for(tick(0), EventKind::Initial, 0),
            Event {
                kind: EventKind::Initial,
                time: tick(0),
                available: initial_capacity,
                task_seq: None,
                work_id: None,
            },
        );
        Self {
            initial_capacity,
            events,
        }
    }

    /// Available headcount as of (at or before) `t`.
    fn available_at(&self, t: Tick) -> u32 {
        self.events
            .range(..=at_or_before_bound(t))
            .next_back()
            .map(|(_, e)| e.available)
            .unwrap_or(self.initial_capacity)
    }

    /// Smallest `t >= earliest_allowed` such that `[t, t + duration + 1)`
    /// holds `available >= required` throughout. See `SPEC_FULL.md` §4.1.
    fn earliest_fit(&self, earliest_allowed: Tick, duration: Tick, required: u32) -> Tick {
        if self.initial_capacity < required {
            return infeasible();
        }
        let mut candidate = earliest_allowed;
        loop {
            if self.available_at(candidate) < required {
                match self
                    .events
                    .range(at_or_after_bound(one_tick_after(candidate))..)
                    .next()
                {
                    Some((_, ev)) => {
                        candidate = ev.time;
                        continue;
                    }
                    None => return infeasible(),
                }
            }
            let window_end = one_tick_after(candidate + duration);
            let lo = at_or_after_bound(one_tick_after(candidate));
            let hi = at_or_after_bound(window_end);
            let conflict = self
                .events
                .range(lo..hi)
                .filter(|(_, e)| e.available < required)
                .map(|(_, e)| e.time)
                .last();
            match conflict {
                Some(t) => {
                    candidate = t;
                    continue;
                }
                None => return candidate,
            }
        }
    }

    fn commit(
        &mut self,
        start: Tick,
        end: Tick,
        count: u32,
        task_seq: i64,
        work_id: &Id,
    ) -> Result<(), MomentumError> {
        for (_, ev) in self
            .events
            .range_mut(at_or_after_bound(start)..at_or_after_bound(end))
        {
            if matches!(ev.kind, EventKind::Initial) {
                continue;
            }
            ev.available = ev.available.checked_sub(count).ok_or_else(|| {
                MomentumError::NegativeAvailability {
                    contractor_id: String::new(),
                    specialty: String::new(),
                }
            })?;
        }

        let before_start = self.available_at(start);
        let start_available = before_start
            .checked_sub(count)
            .ok_or_else(|| MomentumError::NegativeAvailability {
                contractor_id: String::new(),
                specialty: String::new(),
            })?;
        self.events.insert(
            key_for(start, EventKind::Start, task_seq),
            Event {
                kind: EventKind::Start,
                time: start,
                available: start_available,
                task_seq: Some(task_seq),
                work_id: Some(work_id.clone()),
            },
        );

        let before_end = self.available_at(end);
        self.events.insert(
            key_for(end, EventKind::End, task_seq),
            Event {
                kind: EventKind::End,
                time: end,
                available: before_end + count,
                task_seq: Some(task_seq),
                work_id: Some(work_id.clone()),
            },
        );
        Ok(())
    }
}

/// The full momentum timeline: one [`SpecialtyLog`] per (contractor,
/// specialty) pair, plus a monotonic task-sequence counter shared across
/// all of them (so START/END pairs from different specialties committed in
/// the same call still tie-break deterministically against each other).
#[derive(Debug)]
pub struct MomentumTimeline {
    logs: HashMap<(Id, String), SpecialtyLog>,
    next_seq: i64,
}

impl MomentumTimeline {
    /// Seeds one log per (contractor, specialty) the contractors actually
    /// offer, each starting at the contractor's full headcount.
    pub fn new(contractors: &[Contractor]) -> Self {
        let mut logs = HashMap::new();
        for c in contractors {
            for specialty in c.specialties() {
                logs.insert(
                    (c.id().to_string(), specialty.to_string()),
                    SpecialtyLog::new(c.headcount(specialty)),
                );
            }
        }
        Self { logs, next_seq: 0 }
    }

    fn log(&self, contractor_id: &str, specialty: &str) -> Option<&SpecialtyLog> {
        self.logs
            .get(&(contractor_id.to_string(), specialty.to_string()))
    }

    fn log_mut(&mut self, contractor_id: &str, specialty: &str) -> Option<&mut SpecialtyLog> {
        self.logs
            .get_mut(&(contractor_id.to_string(), specialty.to_string()))
    }

    /// Available headcount for one specialty as of `t`; zero if the
    /// contractor never offered that specialty.
    pub fn available_at(&self, contractor_id: &str, specialty: &str, t: Tick) -> u32 {
        self.log(contractor_id, specialty)
            .map(|l| l.available_at(t))
            .unwrap_or(0)
    }

    /// Earliest single-specialty fit; `+∞` if the contractor's total
    /// headcount for this specialty is insufficient.
    pub fn earliest_fit(
        &self,
        contractor_id: &str,
        specialty: &str,
        earliest_allowed: Tick,
        duration: Tick,
        required: u32,
    ) -> Tick {
        match self.log(contractor_id, specialty) {
            Some(log) => log.earliest_fit(earliest_allowed, duration, required),
            None => infeasible(),
        }
    }

    /// Finds the earliest start at which every member of `team` can be
    /// simultaneously staffed for `duration`, re-queuing already-placed
    /// requirements whenever a later one forces the candidate forward.
    /// Returns `+∞` if any single specialty's total headcount is
    /// insufficient. See `SPEC_FULL.md` §4.1.
    pub fn find_min_start(
        &self,
        contractor_id: &str,
        earliest_allowed: Tick,
        duration: Tick,
        team: &WorkerTeam,
    ) -> Tick {
        if team.is_empty() {
            return earliest_allowed;
        }
        let mut queue: VecDeque<TeamMember> = team.members().iter().cloned().collect();
        let mut scheduled: Vec<TeamMember> = Vec::with_capacity(queue.len());
        let mut candidate = earliest_allowed;

        while let Some(member) = queue.pop_front() {
            let t = self.earliest_fit(contractor_id, &member.specialty, candidate, duration, member.count);
            if is_infeasible(t) {
                trace!(contractor_id, specialty = %member.specialty, "insufficient headcount, find_min_start infeasible");
                return infeasible();
            }
            if t.value() == candidate.value() {
                scheduled.push(member);
            } else {
                candidate = t;
                queue.extend(scheduled.drain(..));
                queue.push_back(member);
            }
        }
        debug!(contractor_id, start = candidate.value(), "find_min_start resolved");
        candidate
    }

    /// Commits a team to `[start, end)` on one contractor. `task_seq` ties
    /// the START/END pairs of every specialty together; callers get one via
    /// [`Self::next_task_seq`].
    pub fn commit(
        &mut self,
        contractor_id: &str,
        start: Tick,
        end: Tick,
        team: &WorkerTeam,
        work_id: &Id,
        task_seq: i64,
    ) -> Result<(), MomentumError> {
        for member in team.members() {
            let log = self
                .log_mut(contractor_id, &member.specialty)
                .ok_or_else(|| MomentumError::UnknownContractor(contractor_id.to_string()))?;
            log.commit(start, end, member.count, task_seq, work_id)
                .map_err(|_| MomentumError::NegativeAvailability {
                    contractor_id: contractor_id.to_string(),
                    specialty: member.specialty.clone(),
                })?;
        }
        debug!(contractor_id, work_id = %work_id, start = start.value(), end = end.value(), "committed team to momentum timeline");
        Ok(())
    }

    pub fn next_task_seq(&mut self) -> i64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contractor::Contractor;

    fn contractors() -> Vec<Contractor> {
        vec![Contractor::new("Acme").with_id("c1").with_workers("mason", 2)]
    }

    #[test]
    fn s1_single_node_single_worker() {
        let mut tl = MomentumTimeline::new(&contractors());
        let team = WorkerTeam::new("c1", vec![TeamMember::new("mason", 1)]);
        let start = tl.find_min_start("c1", tick(0), tick(10), &team);
        assert_eq!(start.value(), 0.0);
        let end = start + tick(10) + tick(1);
        let seq = tl.next_task_seq();
        tl.commit("c1", start, end, &team, &"n1".to_string(), seq).unwrap();

        assert_eq!(tl.available_at("c1", "mason", tick(0)), 1);
        assert_eq!(tl.available_at("c1", "mason", tick(10)), 1);
        assert_eq!(tl.available_at("c1", "mason", tick(11)), 2);
    }

    #[test]
    fn s5_infeasible_contractor() {
        let contractors = vec![Contractor::new("Acme").with_id("c1").with_workers("carpenter", 1)];
        let tl = MomentumTimeline::new(&contractors);
        let team = WorkerTeam::new("c1", vec![TeamMember::new("carpenter", 2)]);
        let start = tl.find_min_start("c1", tick(0), tick(5), &team);
        assert!(is_infeasible(start));
    }

    #[test]
    fn s6_parallel_same_start_disjoint_specialties() {
        let contractors = vec![Contractor::new("Acme")
            .with_id("c1")
            .with_workers("mason", 2)
            .with_workers("carpenter", 2)];
        let mut tl = MomentumTimeline::new(&contractors);

        let team_a = WorkerTeam::new("c1", vec![TeamMember::new("mason", 1)]);
        let start_a = tl.find_min_start("c1", tick(0), tick(5), &team_a);
        assert_eq!(start_a.value(), 0.0);
        let seq_a = tl.next_task_seq();
        tl.commit("c1", start_a, start_a + tick(6), &team_a, &"a".to_string(), seq_a)
            .unwrap();

        let team_b = WorkerTeam::new("c1", vec![TeamMember::new("carpenter", 1)]);
        let start_b = tl.find_min_start("c1", tick(0), tick(5), &team_b);
        assert_eq!(start_b.value(), 0.0);
    }

    #[test]
    fn sequential_tasks_do_not_overlap() {
        let mut tl = MomentumTimeline::new(&contractors());
        let team = WorkerTeam::new("c1", vec![TeamMember::new("mason", 2)]);

        let start1 = tl.find_min_start("c1", tick(0), tick(5), &team);
        assert_eq!(start1.value(), 0.0);
        let seq1 = tl.next_task_seq();
        tl.commit("c1", start1, start1 + tick(6), &team, &"t1".to_string(), seq1)
            .unwrap();

        // Both masons busy until t=6 (end event at 6); next task needing 2
        // masons cannot start before 6.
        let start2 = tl.find_min_start("c1", tick(0), tick(5), &team);
        assert_eq!(start2.value(), 6.0);
    }

    #[test]
    fn find_min_start_requeues_on_multi_specialty_conflict() {
        let contractors = vec![Contractor::new("Acme")
            .with_id("c1")
            .with_workers("mason", 1)
            .with_workers("carpenter", 1)];
        let mut tl = MomentumTimeline::new(&contractors);

        // Occupy carpenter from t=0..6.
        let carp_team = WorkerTeam::new("c1", vec![TeamMember::new("carpenter", 1)]);
        let seq = tl.next_task_seq();
        tl.commit("c1", tick(0), tick(6), &carp_team, &"busy".to_string(), seq)
            .unwrap();

        // A task needing both mason and carpenter must wait for carpenter.
        let team = WorkerTeam::new(
            "c1",
            vec![TeamMember::new("mason", 1), TeamMember::new("carpenter", 1)],
        );
        let start = tl.find_min_start("c1", tick(0), tick(2), &team);
        assert_eq!(start.value(), 6.0);
    }
}
