//! The scheduler façade: iterates a caller-supplied node order and, for
//! each node, delegates to the chain placer. See `SPEC_FULL.md` §4.4.

use std::collections::HashMap;

use thiserror::Error;
use tracing::debug;

use crate::contractor::{Contractor, TeamMember, WorkerTeam};
use crate::estimator::WorkTimeEstimator;
use crate::landscape::Landscape;
use crate::momentum::MomentumTimeline;
use crate::placement::{commit_placement, compute_placement, PlacementError};
use crate::schedule_spec::ScheduleSpec;
use crate::scheduled_work::ScheduledWork;
use crate::supply::SupplyTimeline;
use crate::time::{tick, Tick};
use crate::work_graph::WorkGraph;
use crate::Id;

/// Errors the façade can surface. Placement errors (including the
/// `+∞`-backed infeasibility signal) simply propagate; the façade adds
/// only the one check that is its own responsibility.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SchedulerError {
    #[error(transparent)]
    Placement(#[from] PlacementError),
    #[error("team's contractor `{team_contractor}` does not match supplied contractor `{contractor_id}`")]
    ContractorMismatch {
        team_contractor: Id,
        contractor_id: Id,
    },
}

/// Owns the momentum and supply timelines for the duration of one
/// schedule run, borrowing the work graph it schedules over.
///
/// `node2swork` is supplied by the caller to each [`Self::schedule`] call
/// rather than owned here, so the façade never outlives the records it
/// produces (`SPEC_FULL.md` §3 "Ownership").
pub struct Scheduler<'g> {
    graph: &'g WorkGraph,
    momentum: MomentumTimeline,
    supply: SupplyTimeline,
}

impl<'g> Scheduler<'g> {
    pub fn new(graph: &'g WorkGraph, contractors: &[Contractor], landscape: &Landscape) -> Self {
        Self {
            graph,
            momentum: MomentumTimeline::new(contractors),
            supply: SupplyTimeline::new(landscape),
        }
    }

    /// Places one node (and its inseparable chain, if any) and writes the
    /// resulting [`ScheduledWork`] records into `node2swork`. A no-op if
    /// the node was already placed (e.g. as a non-head member of a chain
    /// placed by an earlier call for its head).
    ///
    /// `schedule_spec`, when given, is consulted before either timeline:
    /// a pinned `assigned_time` overrides chain-exec computation and a
    /// pinned `assigned_workers` overrides `team`'s per-specialty counts.
    #[allow(clippy::too_many_arguments)]
    pub fn schedule(
        &mut self,
        node_id: &str,
        node2swork: &mut HashMap<Id, ScheduledWork>,
        team: &WorkerTeam,
        contractor: &Contractor,
        estimator: &dyn WorkTimeEstimator,
        assigned_start_time: Option<Tick>,
        assigned_time: Option<Tick>,
        assigned_parent_time: Option<Tick>,
        schedule_spec: Option<&ScheduleSpec>,
    ) -> Result<(), SchedulerError> {
        if node2swork.contains_key(node_id) {
            return Ok(());
        }
        if !team.is_empty() && team.contractor_id() != contractor.id() {
            return Err(SchedulerError::ContractorMismatch {
                team_contractor: team.contractor_id().to_string(),
                contractor_id: contractor.id().to_string(),
            });
        }

        let spec = schedule_spec.and_then(|s| s.work_spec(node_id));

        let effective_team = match spec.and_then(|s| s.assigned_workers.as_ref()) {
            Some(counts) => WorkerTeam::new(
                team.contractor_id().to_string(),
                counts
                    .iter()
                    .map(|(specialty, count)| TeamMember::new(specialty.clone(), *count))
                    .collect(),
            ),
            None => team.clone(),
        };

        let assigned_total_time = assigned_time.or_else(|| spec.and_then(|s| s.assigned_time));
        let parent_time = assigned_parent_time.unwrap_or_else(|| tick(0));

        let plan = compute_placement(
            self.graph,
            node_id,
            &effective_team,
            &self.momentum,
            &mut self.supply,
            node2swork,
            estimator,
            assigned_start_time,
            parent_time,
            assigned_total_time,
        )?;
        commit_placement(
            self.graph,
            &plan,
            &effective_team,
            &mut self.momentum,
            &mut self.supply,
            node2swork,
        )?;
        debug!(work_id = node_id, "scheduled");
        Ok(())
    }

    /// Schedules every node in `order` in sequence, with the given team
    /// and contractor for each; `teams` and `contractors` are looked up by
    /// node id and must cover every id in `order`.
    pub fn schedule_all(
        &mut self,
        order: &[Id],
        teams: &HashMap<Id, (WorkerTeam, Contractor)>,
        estimator: &dyn WorkTimeEstimator,
        schedule_spec: Option<&ScheduleSpec>,
    ) -> Result<HashMap<Id, ScheduledWork>, SchedulerError> {
        let mut node2swork = HashMap::new();
        for node_id in order {
            let (team, contractor) = teams
                .get(node_id)
                .unwrap_or_else(|| panic!("no team/contractor assignment supplied for node `{node_id}`"));
            self.schedule(
                node_id,
                &mut node2swork,
                team,
                contractor,
                estimator,
                None,
                None,
                None,
                schedule_spec,
            )?;
        }
        Ok(node2swork)
    }
}
