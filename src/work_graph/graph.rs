use std::collections::HashMap;

use petgraph::stable_graph::{NodeIndex, StableGraph};
use petgraph::Directed;

use super::error::WorkGraphError;
use super::work_unit::WorkUnit;
use crate::Id;

/// A directed acyclic graph of work units, generalizing the teacher crate's
/// `SchedulingBlock<T, U, D, E>` to this domain's fixed node type.
///
/// Nodes are addressed by stable [`Id`] from the outside; internally they
/// live in a [`StableGraph`] indexed by [`NodeIndex`], with bidirectional
/// maps bridging the two so ids survive node removal.
#[derive(Debug, Default)]
pub struct WorkGraph {
    graph: StableGraph<WorkUnit, (), Directed>,
    id_by_node: HashMap<NodeIndex, Id>,
    node_by_id: HashMap<Id, NodeIndex>,
    /// `chain_next[n] = s` means `s` is the inseparable successor of `n`.
    chain_next: HashMap<NodeIndex, NodeIndex>,
    chain_prev: HashMap<NodeIndex, NodeIndex>,
    /// Soft same-start relations; symmetric.
    neighbors: HashMap<NodeIndex, Vec<NodeIndex>>,
}

impl WorkGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a work unit, returning its id.
    pub fn add_work(&mut self, unit: WorkUnit) -> Result<Id, WorkGraphError> {
        let id = unit.id().to_string();
        if self.node_by_id.contains_key(&id) {
            return Err(WorkGraphError::DuplicateId(id));
        }
        let index = self.graph.add_node(unit);
        self.id_by_node.insert(index, id.clone());
        self.node_by_id.insert(id.clone(), index);
        Ok(id)
    }

    fn index_of(&self, id: &str) -> Result<NodeIndex, WorkGraphError> {
        self.node_by_id
            .get(id)
            .copied()
            .ok_or_else(|| WorkGraphError::UnknownId(id.to_string()))
    }

    pub fn id_of(&self, index: NodeIndex) -> Option<&str> {
        self.id_by_node.get(&index).map(|s| s.as_str())
    }

    pub fn work(&self, id: &str) -> Result<&WorkUnit, WorkGraphError> {
        let index = self.index_of(id)?;
        Ok(&self.graph[index])
    }

    /// Adds a precedence edge `from -> to`. Rejects self-loops and edges
    /// that would close a cycle.
    pub fn add_dependency(&mut self, from: &str, to: &str) -> Result<(), WorkGraphError> {
        let from_idx = self.index_of(from)?;
        let to_idx = self.index_of(to)?;
        if from_idx == to_idx {
            return Err(WorkGraphError::CycleDetected);
        }
        if petgraph::algo::has_path_connecting(&self.graph, to_idx, from_idx, None) {
            return Err(WorkGraphError::CycleDetected);
        }
        self.graph.add_edge(from_idx, to_idx, ());
        Ok(())
    }

    /// Marks `successor` as the inseparable continuation of `head`: they
    /// must run back-to-back on the same team. `head` must not already have
    /// a successor, and `successor` must not already be chained from
    /// another node.
    pub fn set_inseparable_successor(
        &mut self,
        head: &str,
        successor: &str,
    ) -> Result<(), WorkGraphError> {
        let head_idx = self.index_of(head)?;
        let succ_idx = self.index_of(successor)?;
        if head_idx == succ_idx {
            return Err(WorkGraphError::SelfInseparable(head.to_string()));
        }
        if self.chain_prev.contains_key(&succ_idx) {
            return Err(WorkGraphError::AlreadyChained(successor.to_string()));
        }
        self.chain_next.insert(head_idx, succ_idx);
        self.chain_prev.insert(succ_idx, head_idx);
        Ok(())
    }

    pub fn add_neighbor(&mut self, a: &str, b: &str) -> Result<(), WorkGraphError> {
        let a_idx = self.index_of(a)?;
        let b_idx = self.index_of(b)?;
        self.neighbors.entry(a_idx).or_default().push(b_idx);
        self.neighbors.entry(b_idx).or_default().push(a_idx);
        Ok(())
    }

    /// The full inseparable chain starting at `head`'s own head (walks back
    /// to the first node with no inseparable predecessor, then forward).
    pub fn chain_of(&self, id: &str) -> Result<Vec<Id>, WorkGraphError> {
        let mut idx = self.index_of(id)?;
        while let Some(&prev) = self.chain_prev.get(&idx) {
            idx = prev;
        }
        let mut chain = vec![idx];
        while let Some(&next) = self.chain_next.get(chain.last().unwrap()) {
            chain.push(next);
        }
        Ok(chain
            .into_iter()
            .map(|i| self.id_by_node[&i].clone())
            .collect())
    }

    pub fn is_inseparable_successor(&self, id: &str) -> bool {
        self.index_of(id)
            .map(|idx| self.chain_prev.contains_key(&idx))
            .unwrap_or(false)
    }

    /// Ids of direct predecessors (parents) of a work unit.
    pub fn parents(&self, id: &str) -> Result<Vec<Id>, WorkGraphError> {
        let idx = self.index_of(id)?;
        Ok(self
            .graph
            .neighbors_directed(idx, petgraph::Direction::Incoming)
            .map(|n| self.id_by_node[&n].clone())
            .collect())
    }

    /// Ids of direct successors (children), excluding the inseparable
    /// successor (which is reached via [`Self::chain_of`] instead).
    pub fn children(&self, id: &str) -> Result<Vec<Id>, WorkGraphError> {
        let idx = self.index_of(id)?;
        Ok(self
            .graph
            .neighbors_directed(idx, petgraph::Direction::Outgoing)
            .map(|n| self.id_by_node[&n].clone())
            .collect())
    }

    /// Out-of-chain parents: parents of `id` excluding the inseparable
    /// predecessor, used by the chain placer to compute per-member lag.
    pub fn external_parents(&self, id: &str) -> Result<Vec<Id>, WorkGraphError> {
        let idx = self.index_of(id)?;
        let chain_pred = self.chain_prev.get(&idx).copied();
        Ok(self
            .graph
            .neighbors_directed(idx, petgraph::Direction::Incoming)
            .filter(|n| Some(*n) != chain_pred)
            .map(|n| self.id_by_node[&n].clone())
            .collect())
    }

    pub fn neighbors_of(&self, id: &str) -> Result<Vec<Id>, WorkGraphError> {
        let idx = self.index_of(id)?;
        Ok(self
            .neighbors
            .get(&idx)
            .map(|v| v.iter().map(|n| self.id_by_node[n].clone()).collect())
            .unwrap_or_default())
    }

    /// A topological order of all work units. Fails only if the graph was
    /// corrupted by direct petgraph mutation (not reachable through this
    /// API, which rejects cycles on insertion).
    pub fn topo_order(&self) -> Vec<Id> {
        petgraph::algo::toposort(&self.graph, None)
            .expect("WorkGraph invariant: add_dependency rejects cycles")
            .into_iter()
            .map(|idx| self.id_by_node[&idx].clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// A read-only view of one node's place in the graph, bundling its work
    /// unit with its precedence and chain relations.
    pub fn node(&self, id: &str) -> Result<GraphNode<'_>, WorkGraphError> {
        let index = self.index_of(id)?;
        Ok(GraphNode { graph: self, index })
    }
}

/// A view onto a single work unit and its graph relations. Borrowed from a
/// [`WorkGraph`]; cheap to construct, not stored.
#[derive(Clone, Copy)]
pub struct GraphNode<'g> {
    graph: &'g WorkGraph,
    index: NodeIndex,
}

impl<'g> GraphNode<'g> {
    pub fn id(&self) -> &'g str {
        &self.graph.id_by_node[&self.index]
    }

    pub fn work(&self) -> &'g WorkUnit {
        &self.graph.graph[self.index]
    }

    pub fn parents(&self) -> Vec<Id> {
        self.graph.parents(self.id()).unwrap_or_default()
    }

    pub fn children(&self) -> Vec<Id> {
        self.graph.children(self.id()).unwrap_or_default()
    }

    pub fn external_parents(&self) -> Vec<Id> {
        self.graph.external_parents(self.id()).unwrap_or_default()
    }

    pub fn neighbors(&self) -> Vec<Id> {
        self.graph.neighbors_of(self.id()).unwrap_or_default()
    }

    pub fn chain(&self) -> Vec<Id> {
        self.graph.chain_of(self.id()).unwrap_or_default()
    }

    pub fn is_inseparable_successor(&self) -> bool {
        self.graph.is_inseparable_successor(self.id())
    }
}
