//! The chain placer: given a node, its inseparable chain, and a team,
//! computes the earliest feasible start respecting parents, neighbors,
//! materials and worker capacity, then commits that placement to both
//! timelines. See `SPEC_FULL.md` §4.3.

use std::collections::HashMap;

use tracing::{debug, trace};

use super::error::PlacementError;
use crate::contractor::WorkerTeam;
use crate::estimator::WorkTimeEstimator;
use crate::momentum::MomentumTimeline;
use crate::scheduled_work::ScheduledWork;
use crate::supply::SupplyTimeline;
use crate::time::{is_infeasible, max, min, tick, Tick};
use crate::work_graph::WorkGraph;
use crate::Id;

/// One chain member's contribution to the committed placement: the idle
/// gap before it starts (`lag`) and its own execution time. Mirrors the
/// `(lag, exec_time)` pairs the momentum timeline's chain search produces
/// internally before the placer walks the chain to assign concrete
/// start/finish times.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainMember {
    pub work_id: Id,
    pub lag: Tick,
    pub exec_time: Tick,
}

/// A fully resolved, not-yet-committed placement for one inseparable
/// chain: the chain's overall start/finish and each member's lag/exec
/// time, ready to be walked left-to-right by [`commit_placement`].
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementPlan {
    pub head_id: Id,
    pub contractor_id: Id,
    pub start: Tick,
    pub finish: Tick,
    pub members: Vec<ChainMember>,
}

fn max_finish_of(node2swork: &HashMap<Id, ScheduledWork>, parents: &[Id]) -> Tick {
    parents
        .iter()
        .filter_map(|p| node2swork.get(p).map(|sw| sw.finish()))
        .fold(tick(0), max)
}

/// Computes where a node's inseparable chain would be placed, without
/// mutating either timeline. `assigned_start_time` forces the chain's
/// overall start (still checked against worker/material feasibility);
/// `assigned_parent_time` is a hard lower bound; `assigned_total_time`, if
/// set, overrides per-member exec-time computation by splitting the total
/// evenly across the chain with zero internal lag (`SPEC_FULL.md` §4.4).
#[allow(clippy::too_many_arguments)]
pub fn compute_placement(
    graph: &WorkGraph,
    node_id: &str,
    team: &WorkerTeam,
    momentum: &MomentumTimeline,
    supply: &mut SupplyTimeline,
    node2swork: &HashMap<Id, ScheduledWork>,
    estimator: &dyn WorkTimeEstimator,
    assigned_start_time: Option<Tick>,
    assigned_parent_time: Tick,
    assigned_total_time: Option<Tick>,
) -> Result<PlacementPlan, PlacementError> {
    let node = graph
        .node(node_id)
        .map_err(|e| PlacementError::Graph(node_id.to_string(), e))?;
    let chain = node.chain();
    let head_id = chain.first().cloned().unwrap_or_else(|| node_id.to_string());
    let head = graph
        .node(&head_id)
        .map_err(|e| PlacementError::Graph(head_id.clone(), e))?;

    // Step 1: the chain head's own parent-derived floor, clamped below by
    // `assigned_parent_time` and above by `assigned_start_time`.
    let mut max_parent_time = max(max_finish_of(node2swork, &head.parents()), assigned_parent_time);
    if let Some(ast) = assigned_start_time {
        max_parent_time = min(max_parent_time, ast);
    }

    // Step 2: neighbors are a hard floor once raised.
    for neighbor_id in head.neighbors() {
        if let Some(sw) = node2swork.get(&neighbor_id) {
            max_parent_time = max(max_parent_time, sw.start());
        }
    }

    // Steps 3-5: per-member exec time and intra-chain lag, accumulated
    // into the chain's total occupied span.
    let chain_len = chain.len().max(1) as i64;
    let mut members = Vec::with_capacity(chain.len());
    let mut running = tick(0);
    for (i, member_id) in chain.iter().enumerate() {
        let member = graph
            .node(member_id)
            .map_err(|e| PlacementError::Graph(member_id.clone(), e))?;

        for req in member.work().worker_reqs() {
            let count = team.count_for(&req.specialty);
            if !req.accepts(count) {
                return Err(PlacementError::TeamOutOfRange {
                    work_id: member_id.clone(),
                    specialty: req.specialty.clone(),
                    count,
                    min: req.min_count,
                    max: req.max_count,
                });
            }
        }

        let exec_time = if let Some(total) = assigned_total_time {
            split_evenly(total, chain_len, i as i64)
        } else if team.is_empty() {
            tick(0)
        } else {
            estimator.estimate(member.work(), team)
        };

        let lag = if assigned_total_time.is_some() {
            tick(0)
        } else {
            let own_constraint = max(max_finish_of(node2swork, &member.external_parents()), assigned_parent_time);
            let lag_req = own_constraint - max_parent_time - running;
            if lag_req.value() > 0.0 {
                lag_req
            } else {
                tick(0)
            }
        };

        running = running + lag + exec_time;
        members.push(ChainMember {
            work_id: member_id.clone(),
            lag,
            exec_time,
        });
    }
    let total_exec_time = running;

    let head_work = head.work();

    // Step 6: service-only chain — no worker timeline involvement.
    if team.is_empty() {
        let material_time = supply.find_min_material_time(
            &head_id,
            max_parent_time,
            head_work.material_reqs(),
            head_work.workground_size(),
        );
        let start = max(max_parent_time, material_time);
        trace!(work_id = %head_id, start = start.value(), "service-only chain placed");
        return Ok(PlacementPlan {
            head_id,
            contractor_id: team.contractor_id().to_string(),
            start,
            finish: start,
            members,
        });
    }

    // Step 7: worker fit, then material fit, committed start is the max.
    let start = match assigned_start_time {
        Some(ast) => ast,
        None => {
            let worker_start = momentum.find_min_start(team.contractor_id(), max_parent_time, total_exec_time, team);
            if is_infeasible(worker_start) {
                return Err(PlacementError::Infeasible {
                    work_id: head_id,
                    contractor_id: team.contractor_id().to_string(),
                });
            }
            let material_time = supply.find_min_material_time(
                &head_id,
                worker_start,
                head_work.material_reqs(),
                head_work.workground_size(),
            );
            max(worker_start, material_time)
        }
    };

    if start.value() < assigned_parent_time.value() {
        return Err(PlacementError::BeforeAssignedParent {
            work_id: head_id,
            computed: start.value(),
            assigned_parent_time: assigned_parent_time.value(),
        });
    }

    let finish = start + total_exec_time;
    debug!(work_id = %head_id, contractor_id = %team.contractor_id(), start = start.value(), finish = finish.value(), "chain placement resolved");
    Ok(PlacementPlan {
        head_id,
        contractor_id: team.contractor_id().to_string(),
        start,
        finish,
        members,
    })
}

/// Commits a previously computed plan: walks the chain left-to-right
/// writing one [`ScheduledWork`] per member (with its own material
/// deliveries), then reserves the team on the momentum timeline for the
/// whole chain span.
pub fn commit_placement(
    graph: &WorkGraph,
    plan: &PlacementPlan,
    team: &WorkerTeam,
    momentum: &mut MomentumTimeline,
    supply: &mut SupplyTimeline,
    node2swork: &mut HashMap<Id, ScheduledWork>,
) -> Result<(), PlacementError> {
    let mut curr = plan.start;
    for member in &plan.members {
        let start = curr + member.lag;
        let finish = start + member.exec_time;

        let work = graph
            .node(&member.work_id)
            .map_err(|e| PlacementError::Graph(member.work_id.clone(), e))?
            .work();
        let deliveries = if work.material_reqs().is_empty() {
            Vec::new()
        } else {
            let (deliveries, _, _) =
                supply.deliver_materials(&member.work_id, start, finish, work.material_reqs(), work.workground_size())?;
            deliveries
        };

        node2swork.insert(
            member.work_id.clone(),
            ScheduledWork::new(member.work_id.clone(), start, finish, team.clone()).with_deliveries(deliveries),
        );
        curr = finish;
    }

    if !team.is_empty() {
        let end = curr + tick(1);
        let seq = momentum.next_task_seq();
        momentum.commit(&plan.contractor_id, plan.start, end, team, &plan.head_id, seq)?;
    }
    Ok(())
}

/// Splits `total` into `count` whole-tick shares summing exactly to
/// `total`, folding the remainder into the last share.
fn split_evenly(total: Tick, count: i64, index: i64) -> Tick {
    let total_ticks = total.value().round() as i64;
    let base = total_ticks / count;
    let remainder = total_ticks % count;
    let share = if index == count - 1 { base + remainder } else { base };
    tick(share)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contractor::{Contractor, TeamMember};
    use crate::estimator::LinearRateEstimator;
    use crate::landscape::Landscape;
    use crate::work_graph::{WorkUnit, WorkerReq};

    fn single_mason_graph() -> WorkGraph {
        let mut g = WorkGraph::new();
        g.add_work(
            WorkUnit::new("wall", 10.0)
                .with_id("n1")
                .with_worker_req(WorkerReq::new("mason", 1, 2)),
        )
        .unwrap();
        g
    }

    #[test]
    fn s1_single_node_single_worker() {
        let graph = single_mason_graph();
        let contractors = vec![Contractor::new("Acme").with_id("c1").with_workers("mason", 2)];
        let momentum = MomentumTimeline::new(&contractors);
        let mut supply = SupplyTimeline::new(&Landscape::new(vec![]));
        let node2swork = HashMap::new();
        let estimator = LinearRateEstimator;
        let team = WorkerTeam::new("c1", vec![TeamMember::new("mason", 1)]);

        let plan = compute_placement(
            &graph,
            "n1",
            &team,
            &momentum,
            &mut supply,
            &node2swork,
            &estimator,
            None,
            tick(0),
            None,
        )
        .unwrap();

        assert_eq!(plan.start.value(), 0.0);
        assert_eq!(plan.finish.value(), 10.0);
    }

    #[test]
    fn s5_infeasible_contractor_surfaces_as_error() {
        let graph = single_mason_graph();
        let contractors = vec![Contractor::new("Acme").with_id("c1").with_workers("mason", 1)];
        let momentum = MomentumTimeline::new(&contractors);
        let mut supply = SupplyTimeline::new(&Landscape::new(vec![]));
        let node2swork = HashMap::new();
        let estimator = LinearRateEstimator;
        let team = WorkerTeam::new("c1", vec![TeamMember::new("mason", 2)]);

        let err = compute_placement(
            &graph,
            "n1",
            &team,
            &momentum,
            &mut supply,
            &node2swork,
            &estimator,
            None,
            tick(0),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, PlacementError::Infeasible { .. }));
    }

    #[test]
    fn team_outside_required_range_is_rejected() {
        let graph = single_mason_graph();
        let contractors = vec![Contractor::new("Acme").with_id("c1").with_workers("mason", 5)];
        let momentum = MomentumTimeline::new(&contractors);
        let mut supply = SupplyTimeline::new(&Landscape::new(vec![]));
        let node2swork = HashMap::new();
        let estimator = LinearRateEstimator;
        // single_mason_graph's "n1" requires 1..=2 masons; 5 is out of range.
        let team = WorkerTeam::new("c1", vec![TeamMember::new("mason", 5)]);

        let err = compute_placement(
            &graph,
            "n1",
            &team,
            &momentum,
            &mut supply,
            &node2swork,
            &estimator,
            None,
            tick(0),
            None,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            PlacementError::TeamOutOfRange {
                count: 5,
                min: 1,
                max: 2,
                ..
            }
        ));
    }

    #[test]
    fn service_chain_ignores_worker_timeline() {
        let mut g = WorkGraph::new();
        g.add_work(WorkUnit::service("start").with_id("start")).unwrap();
        let contractors: Vec<Contractor> = vec![];
        let momentum = MomentumTimeline::new(&contractors);
        let mut supply = SupplyTimeline::new(&Landscape::new(vec![]));
        let node2swork = HashMap::new();
        let estimator = LinearRateEstimator;
        let team = WorkerTeam::empty("none");

        let plan = compute_placement(
            &g,
            "start",
            &team,
            &momentum,
            &mut supply,
            &node2swork,
            &estimator,
            None,
            tick(0),
            None,
        )
        .unwrap();
        assert_eq!(plan.start.value(), 0.0);
        assert_eq!(plan.finish.value(), 0.0);
    }

    #[test]
    fn inseparable_chain_lag_satisfies_external_parent() {
        let mut g = WorkGraph::new();
        g.add_work(
            WorkUnit::new("p", 1.0)
                .with_id("p")
                .with_worker_req(WorkerReq::new("mason", 1, 1)),
        )
        .unwrap();
        g.add_work(
            WorkUnit::new("a", 3.0)
                .with_id("a")
                .with_worker_req(WorkerReq::new("mason", 1, 1)),
        )
        .unwrap();
        g.add_work(
            WorkUnit::new("b", 4.0)
                .with_id("b")
                .with_worker_req(WorkerReq::new("mason", 1, 1)),
        )
        .unwrap();
        g.set_inseparable_successor("a", "b").unwrap();
        g.add_dependency("p", "b").unwrap();

        let contractors = vec![Contractor::new("Acme").with_id("c1").with_workers("mason", 2)];
        let momentum = MomentumTimeline::new(&contractors);
        let mut supply = SupplyTimeline::new(&Landscape::new(vec![]));
        let mut node2swork = HashMap::new();
        node2swork.insert(
            "p".to_string(),
            ScheduledWork::new("p", tick(0), tick(20), WorkerTeam::new("c1", vec![TeamMember::new("mason", 1)])),
        );
        let estimator = LinearRateEstimator;
        let team = WorkerTeam::new("c1", vec![TeamMember::new("mason", 1)]);

        let plan = compute_placement(
            &g,
            "a",
            &team,
            &momentum,
            &mut supply,
            &node2swork,
            &estimator,
            None,
            tick(0),
            None,
        )
        .unwrap();

        // a has no external parent (max_parent_time = 0); b's external
        // parent p finishes at 20, so an internal lag opens up before b.
        assert_eq!(plan.start.value(), 0.0);
        let a = &plan.members[0];
        let b = &plan.members[1];
        assert_eq!(a.lag.value(), 0.0);
        assert_eq!(a.exec_time.value(), 3.0);
        assert_eq!(b.lag.value(), 17.0);
        assert_eq!(b.exec_time.value(), 4.0);
        assert_eq!(plan.finish.value(), 0.0 + 3.0 + 17.0 + 4.0);
    }

    #[test]
    fn assigned_total_time_splits_evenly_with_zero_lag() {
        let mut g = WorkGraph::new();
        g.add_work(WorkUnit::new("a", 1.0).with_id("a").with_worker_req(WorkerReq::new("mason", 1, 1)))
            .unwrap();
        g.add_work(WorkUnit::new("b", 1.0).with_id("b").with_worker_req(WorkerReq::new("mason", 1, 1)))
            .unwrap();
        g.set_inseparable_successor("a", "b").unwrap();

        let contractors = vec![Contractor::new("Acme").with_id("c1").with_workers("mason", 1)];
        let momentum = MomentumTimeline::new(&contractors);
        let mut supply = SupplyTimeline::new(&Landscape::new(vec![]));
        let node2swork = HashMap::new();
        let estimator = LinearRateEstimator;
        let team = WorkerTeam::new("c1", vec![TeamMember::new("mason", 1)]);

        let plan = compute_placement(
            &g,
            "a",
            &team,
            &momentum,
            &mut supply,
            &node2swork,
            &estimator,
            None,
            tick(0),
            Some(tick(10)),
        )
        .unwrap();

        assert_eq!(plan.members[0].exec_time.value(), 5.0);
        assert_eq!(plan.members[1].exec_time.value(), 5.0);
        assert_eq!(plan.members[0].lag.value(), 0.0);
        assert_eq!(plan.members[1].lag.value(), 0.0);
    }

    #[test]
    fn commit_writes_scheduled_work_and_reserves_capacity() {
        let graph = single_mason_graph();
        let contractors = vec![Contractor::new("Acme").with_id("c1").with_workers("mason", 2)];
        let mut momentum = MomentumTimeline::new(&contractors);
        let mut supply = SupplyTimeline::new(&Landscape::new(vec![]));
        let mut node2swork = HashMap::new();
        let estimator = LinearRateEstimator;
        let team = WorkerTeam::new("c1", vec![TeamMember::new("mason", 1)]);

        let plan = compute_placement(
            &graph,
            "n1",
            &team,
            &momentum,
            &mut supply,
            &node2swork,
            &estimator,
            None,
            tick(0),
            None,
        )
        .unwrap();
        commit_placement(&graph, &plan, &team, &mut momentum, &mut supply, &mut node2swork).unwrap();

        let sw = node2swork.get("n1").unwrap();
        assert_eq!(sw.start().value(), 0.0);
        assert_eq!(sw.finish().value(), 10.0);
        assert_eq!(momentum.available_at("c1", "mason", tick(5)), 1);
        assert_eq!(momentum.available_at("c1", "mason", tick(11)), 2);
    }
}
