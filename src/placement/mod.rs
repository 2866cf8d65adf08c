//! The chain placer: composes the momentum and supply timelines with the
//! work graph's precedence and inseparable-chain constraints to place one
//! node (and its chain) at its earliest feasible start. See
//! `SPEC_FULL.md` §4.3.

mod error;
mod placer;

pub use error::PlacementError;
pub use placer::{commit_placement, compute_placement, ChainMember, PlacementPlan};
