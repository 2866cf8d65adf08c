use thiserror::Error;

use crate::momentum::MomentumError;
use crate::supply::SupplyError;
use crate::work_graph::WorkGraphError;
use crate::Id;

/// Errors raised while placing one node's inseparable chain.
///
/// `Infeasible` is not a caller bug: it is the chain placer's own surface
/// for the momentum timeline's `+∞` sentinel (`SPEC_FULL.md` §7) and tells
/// the façade to try another contractor or team. Every other variant wraps
/// an invariant violation from a collaborator module and is fatal.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PlacementError {
    #[error("contractor `{contractor_id}` cannot host work `{work_id}`: insufficient headcount for one or more specialties")]
    Infeasible { work_id: Id, contractor_id: Id },
    #[error("work graph error while placing `{0}`: {1}")]
    Graph(Id, WorkGraphError),
    #[error(transparent)]
    Momentum(#[from] MomentumError),
    #[error(transparent)]
    Supply(#[from] SupplyError),
    #[error("placement of `{work_id}` would start at {computed} before its assigned parent time {assigned_parent_time}")]
    BeforeAssignedParent {
        work_id: Id,
        computed: f64,
        assigned_parent_time: f64,
    },
    #[error("work `{work_id}` was assigned {count} `{specialty}` workers, outside its required [{min}, {max}] range")]
    TeamOutOfRange {
        work_id: Id,
        specialty: String,
        count: u32,
        min: u32,
        max: u32,
    },
}
