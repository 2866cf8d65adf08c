//! contractum - a timeline-based construction-project scheduling engine.
//!
//! Given a work graph, a set of contractors with typed worker pools, and a
//! landscape of material depots, this crate places each work unit at its
//! earliest feasible start: a worker-capacity timeline answers "when do
//! enough specialists free up", a material-supply timeline answers "when
//! can enough material be delivered", and a chain placer composes both with
//! the graph's precedence and inseparable-chain constraints.
//!
//! Node ordering, team/contractor selection, and work-time estimation are
//! supplied by the caller; this crate does not search for a schedule, it
//! places one greedily in the order it is given.

pub mod contractor;
pub mod estimator;
pub mod landscape;
pub mod momentum;
pub mod placement;
pub mod schedule_spec;
pub mod scheduled_work;
pub mod scheduler;
pub mod sketches;
pub mod supply;
pub mod time;
pub mod work_graph;

pub use contractor::{Contractor, TeamMember, WorkerTeam};
pub use estimator::WorkTimeEstimator;
pub use landscape::{Depot, Landscape, MaterialAmount};
pub use schedule_spec::{ScheduleSpec, WorkSpec};
pub use scheduled_work::{MaterialDelivery, ScheduledWork};
pub use scheduler::{Scheduler, SchedulerError};
pub use time::Tick;
pub use work_graph::{GraphNode, MaterialReq, WorkGraph, WorkUnit, WorkerReq};

/// Identifier type used for work units, contractors, depots and materials.
pub type Id = String;

/// Generates a new unique identifier (UUID v4).
pub fn generate_id() -> Id {
    uuid::Uuid::new_v4().to_string()
}
