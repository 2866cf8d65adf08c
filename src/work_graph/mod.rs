//! The work graph: a DAG of [`WorkUnit`]s with precedence, inseparable
//! chains, and soft neighbor relations.

mod error;
mod graph;
mod work_unit;

pub use error::WorkGraphError;
pub use graph::{GraphNode, WorkGraph};
pub use work_unit::{MaterialReq, WorkUnit, WorkerReq};
