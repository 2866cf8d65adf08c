//! The work-time estimator seam: an external, pure function from (team,
//! work unit) to a duration in ticks. The genetic/native/HEFT collaborators
//! sketched in `SPEC_FULL.md` §6 all ultimately call through this trait;
//! this crate never computes durations itself.

use crate::contractor::WorkerTeam;
use crate::time::Tick;
use crate::work_graph::WorkUnit;

/// Computes how long a work unit takes when staffed by a given team.
///
/// Implementations must be pure and side-effect-free (§5): the engine may
/// call this any number of times for the same inputs while probing
/// candidate starts, and expects the same answer every time.
pub trait WorkTimeEstimator {
    fn estimate(&self, work: &WorkUnit, team: &WorkerTeam) -> Tick;
}

/// A fixed-rate estimator useful for tests and simple deployments: duration
/// is `volume / total_headcount`, rounded up, with a floor of one tick for
/// any non-service unit with a positive volume.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearRateEstimator;

impl WorkTimeEstimator for LinearRateEstimator {
    fn estimate(&self, work: &WorkUnit, team: &WorkerTeam) -> Tick {
        if work.is_service() {
            return crate::time::tick(0);
        }
        let headcount: u32 = team.members().iter().map(|m| m.count).sum();
        if headcount == 0 {
            return crate::time::infeasible();
        }
        let ticks = (work.volume() / headcount as f64).ceil().max(1.0);
        crate::time::tick(ticks as i64)
    }
}
