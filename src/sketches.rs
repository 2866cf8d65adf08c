//! Interfaces for collaborators this crate is designed to be driven by, but
//! does not implement itself: node-order search, post-placement local
//! optimization, multi-graph composition, and external search loops. See
//! `SPEC_FULL.md` §6 and §11.2-11.4.
//!
//! None of these traits has a body in this crate. They exist so a caller's
//! own search/optimization code has a stable seam to implement against.

use std::collections::HashMap;
use std::ops::Range;

use crate::contractor::Contractor;
use crate::estimator::WorkTimeEstimator;
use crate::landscape::Landscape;
use crate::scheduled_work::ScheduledWork;
use crate::work_graph::WorkGraph;
use crate::Id;

/// Reorders a sub-range of an externally supplied node sequence without
/// breaking topological validity, e.g. a local swap heuristic. Mutates
/// `node_order` in place.
pub trait OrderLocalOptimizer {
    fn optimize(&self, node_order: &mut [Id], area: Range<usize>);
}

/// Post-pass that may re-run placement over an already-scheduled range,
/// e.g. to parallelize near-placed works. Mutates `scheduled` in place.
pub trait ScheduleLocalOptimizer {
    #[allow(clippy::too_many_arguments)]
    fn optimize(
        &self,
        node_order: &[Id],
        contractors: &[Contractor],
        estimator: &dyn WorkTimeEstimator,
        scheduled: &mut HashMap<Id, ScheduledWork>,
        area: Range<usize>,
    );
}

/// HEFT/topological-style priority assignment feeding an external
/// node-order builder.
pub trait PriorityHeuristic {
    fn priorities(&self, graph: &WorkGraph) -> HashMap<Id, f64>;
}

/// Finds nodes among `candidates` that `node` could be swapped with in
/// `node_order` without breaking topological order: a candidate is
/// rejected if it is one of `node`'s children, already `processed`, has
/// one of `node`'s children sitting between itself and `node`, or has a
/// parent sitting between `node` and itself.
pub fn get_swap_candidates(
    node: &Id,
    node_index: usize,
    candidates: &[Id],
    node2ind: &HashMap<Id, usize>,
    processed: &std::collections::HashSet<Id>,
    children_of: &dyn Fn(&Id) -> Vec<Id>,
    parents_of: &dyn Fn(&Id) -> Vec<Id>,
) -> Vec<Id> {
    let children: std::collections::HashSet<Id> = children_of(node).into_iter().collect();

    candidates
        .iter()
        .filter(|candidate| {
            if children.contains(*candidate) || processed.contains(*candidate) {
                return false;
            }
            let candidate_ind = match node2ind.get(*candidate) {
                Some(i) => *i,
                None => return false,
            };
            for child in &children {
                if node2ind.get(child).copied().unwrap_or(0) >= candidate_ind {
                    return false;
                }
            }
            for parent in parents_of(candidate) {
                if node2ind.get(&parent).copied().unwrap_or(0) <= node_index {
                    return false;
                }
            }
            true
        })
        .cloned()
        .collect()
}

/// Opaque identifier for one block in a multi-graph composition.
pub type BlockId = Id;

/// Composes several work graphs into one via inter-block finish-to-start
/// edges. No implementation: composing graphs belongs to a caller that
/// already owns multiple [`WorkGraph`]s.
pub trait GraphComposer {
    fn compose(&self, blocks: &[WorkGraph]) -> WorkGraph;
    fn topo_order(&self) -> Vec<BlockId>;
}

/// The seam a genetic/native search loop would drive: given a graph, a
/// contractor list, a landscape, and a node order, produce a full
/// schedule. No chromosome encoding, no FFI boundary, no toolbox — those
/// live entirely outside this crate.
pub trait ConstructionScheduler {
    fn schedule(
        &self,
        graph: &WorkGraph,
        contractors: &[Contractor],
        landscape: &Landscape,
        order: &[Id],
    ) -> HashMap<Id, ScheduledWork>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn swap_candidates_rejects_a_child_between_node_and_candidate() {
        // order: [candidate(0), child(1), node(2)]; child sits between
        // candidate and node, so candidate is rejected.
        let node = "node".to_string();
        let child = "child".to_string();
        let candidate = "candidate".to_string();
        let mut node2ind = HashMap::new();
        node2ind.insert(candidate.clone(), 0);
        node2ind.insert(child.clone(), 1);
        node2ind.insert(node.clone(), 2);
        let processed = HashSet::new();
        let children_of = {
            let child = child.clone();
            move |id: &Id| if id == "node" { vec![child.clone()] } else { vec![] }
        };
        let parents_of = |_id: &Id| vec![];

        let accepted = get_swap_candidates(
            &node,
            2,
            &[candidate.clone()],
            &node2ind,
            &processed,
            &children_of,
            &parents_of,
        );
        assert!(accepted.is_empty());
    }

    #[test]
    fn swap_candidates_accepts_an_unrelated_earlier_node() {
        let node = "node".to_string();
        let candidate = "candidate".to_string();
        let mut node2ind = HashMap::new();
        node2ind.insert(candidate.clone(), 0);
        node2ind.insert(node.clone(), 1);
        let processed = HashSet::new();
        let children_of = |_: &Id| vec![];
        let parents_of = |_: &Id| vec![];

        let accepted = get_swap_candidates(
            &node,
            1,
            &[candidate.clone()],
            &node2ind,
            &processed,
            &children_of,
            &parents_of,
        );
        assert_eq!(accepted, vec![candidate]);
    }
}
