//! The engine's output record: one [`ScheduledWork`] per placed work unit.

use crate::contractor::WorkerTeam;
use crate::time::Tick;
use crate::Id;

/// One material delivery: a material, a time, a source depot, and a count.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MaterialDelivery {
    pub material: String,
    pub time: Tick,
    pub depot_id: Id,
    pub count: u32,
}

impl MaterialDelivery {
    pub fn new(material: impl Into<String>, time: Tick, depot_id: impl Into<Id>, count: u32) -> Self {
        Self {
            material: material.into(),
            time,
            depot_id: depot_id.into(),
            count,
        }
    }
}

/// The engine's output for one work unit: its placement, team, and
/// material deliveries.
///
/// Invariant: `finish >= start`; for service units `finish == start`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScheduledWork {
    work_id: Id,
    start: Tick,
    finish: Tick,
    team: WorkerTeam,
    deliveries: Vec<MaterialDelivery>,
}

impl ScheduledWork {
    pub fn new(work_id: impl Into<Id>, start: Tick, finish: Tick, team: WorkerTeam) -> Self {
        debug_assert!(
            finish.value() >= start.value(),
            "scheduled work must not finish before it starts"
        );
        Self {
            work_id: work_id.into(),
            start,
            finish,
            team,
            deliveries: Vec::new(),
        }
    }

    pub fn with_deliveries(mut self, deliveries: Vec<MaterialDelivery>) -> Self {
        self.deliveries = deliveries;
        self
    }

    pub fn work_id(&self) -> &str {
        &self.work_id
    }

    pub fn start(&self) -> Tick {
        self.start
    }

    pub fn finish(&self) -> Tick {
        self.finish
    }

    pub fn team(&self) -> &WorkerTeam {
        &self.team
    }

    pub fn deliveries(&self) -> &[MaterialDelivery] {
        &self.deliveries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contractor::WorkerTeam;
    use crate::time::tick;

    #[test]
    fn finish_not_before_start() {
        let sw = ScheduledWork::new("w1", tick(0), tick(5), WorkerTeam::empty("c1"));
        assert_eq!(sw.start().value(), 0.0);
        assert_eq!(sw.finish().value(), 5.0);
    }
}
