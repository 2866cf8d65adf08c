//! The material-supply timeline: per-depot, per-material finite stock
//! profiles bracketed by `(0, baseline)`, answering earliest-supply queries
//! and splitting demand into delivery batches.
//!
//! Each depot's stock for a material is a one-time, non-renewable quantity:
//! a withdrawal at tick `t` permanently reduces what is available at every
//! tick from `t` onward (`SPEC_FULL.md` §3's stock invariant — stock at any
//! time plus everything withdrawn at or before that time equals the
//! depot's initial capacity).

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, trace};

use crate::landscape::Landscape;
use crate::scheduled_work::MaterialDelivery;
use crate::supply::error::SupplyError;
use crate::time::{infeasible, is_infeasible, tick, Tick, TickKey};
use crate::work_graph::MaterialReq;
use crate::Id;

/// One depot's per-tick capacity profile for one material: initial stock
/// minus everything withdrawn at or before that tick. Monotonically
/// non-increasing in `t` and never regenerates.
#[derive(Debug)]
struct MaterialProfile {
    baseline: u32,
    withdrawals: BTreeMap<TickKey, u32>,
}

impl MaterialProfile {
    fn new(baseline: u32) -> Self {
        Self {
            baseline,
            withdrawals: BTreeMap::new(),
        }
    }

    /// Stock remaining at tick `t`: initial stock minus every withdrawal
    /// recorded at or before `t`.
    fn capacity_at(&self, t: Tick) -> u32 {
        let key = TickKey::new(t).expect("supply query time must not be NaN");
        let withdrawn: u32 = self.withdrawals.range(..=key).map(|(_, v)| *v).sum();
        self.baseline.saturating_sub(withdrawn)
    }

    /// Stock left to allocate to any future demand, irrespective of tick:
    /// initial stock minus everything ever withdrawn from this depot.
    fn remaining(&self) -> u32 {
        let withdrawn: u32 = self.withdrawals.values().sum();
        self.baseline.saturating_sub(withdrawn)
    }

    /// Permanently withdraws `amount` at tick `t`. `amount` must not exceed
    /// `capacity_at(t)` — callers only ever request what `capacity_at`
    /// itself reported, so exceeding it means the caller's own plan
    /// disagreed with the profile's state (an invariant violation, not an
    /// ordinary infeasibility).
    fn consume_at(&mut self, t: Tick, amount: u32, depot_id: &str, material: &str) -> Result<(), SupplyError> {
        if amount > self.capacity_at(t) {
            return Err(SupplyError::Overdraw {
                depot_id: depot_id.to_string(),
                material: material.to_string(),
            });
        }
        let key = TickKey::new(t).unwrap();
        *self.withdrawals.entry(key).or_insert(0) += amount;
        Ok(())
    }
}

/// The result of trying to source one material demand from the best
/// available depot.
enum SupplyOutcome {
    Delivered(MaterialDelivery, Tick),
    /// No depot in the landscape has enough remaining stock to cover the
    /// demand, even in principle.
    NoDepot,
}

/// All depots' profiles, plus a `material -> depot` selection registry
/// mirroring the original's `resource_sources` index.
#[derive(Debug)]
pub struct SupplyTimeline {
    profiles: HashMap<(Id, String), MaterialProfile>,
    depot_order: Vec<Id>,
    sources: HashMap<String, Vec<Id>>,
}

impl SupplyTimeline {
    pub fn new(landscape: &Landscape) -> Self {
        let mut profiles = HashMap::new();
        let mut depot_order = Vec::new();
        let mut sources: HashMap<String, Vec<Id>> = HashMap::new();
        for depot in landscape.depots() {
            depot_order.push(depot.id().to_string());
            for res in depot.resources() {
                profiles.insert(
                    (depot.id().to_string(), res.material.clone()),
                    MaterialProfile::new(res.count),
                );
                sources.entry(res.material.clone()).or_default().push(depot.id().to_string());
            }
        }
        Self {
            profiles,
            depot_order,
            sources,
        }
    }

    /// First depot (by landscape order) whose remaining stock of `material`
    /// can cover `count`. `None` means no depot can ever supply it, even
    /// spread across the whole project — the `NoSupply` condition from
    /// `SPEC_FULL.md` §4.2, checked up front so the profile walk below is
    /// only ever entered when it is guaranteed to terminate.
    fn best_depot(&self, material: &str, count: u32) -> Option<&str> {
        let candidates = self.sources.get(material)?;
        self.depot_order
            .iter()
            .find(|id| {
                candidates.contains(id)
                    && self.profiles[&((*id).clone(), material.to_string())].remaining() >= count
            })
            .map(|s| s.as_str())
    }

    /// Walks backward from `deadline` (then forward if that's not enough)
    /// accumulating per-tick capacity until `count` units are found.
    /// Terminates because `best_depot` already established that the chosen
    /// depot's total remaining stock covers `count`.
    fn supply_one(
        &mut self,
        work_id: &Id,
        material: &str,
        deadline: Tick,
        count: u32,
        simulate: bool,
    ) -> Result<SupplyOutcome, SupplyError> {
        let depot_id = match self.best_depot(material, count) {
            Some(id) => id.to_string(),
            None => return Ok(SupplyOutcome::NoDepot),
        };
        let key = (depot_id.clone(), material.to_string());

        let mut remaining = count;
        let mut plan: Vec<(Tick, u32)> = Vec::new();
        let mut t = deadline;
        loop {
            let cap = self.profiles[&key].capacity_at(t);
            let take = cap.min(remaining);
            if take > 0 {
                plan.push((t, take));
                remaining -= take;
            }
            if remaining == 0 || t.value() <= 0.0 {
                break;
            }
            t = t - tick(1);
        }
        if remaining > 0 {
            let mut t = deadline + tick(1);
            loop {
                let cap = self.profiles[&key].capacity_at(t);
                let take = cap.min(remaining);
                if take > 0 {
                    plan.push((t, take));
                    remaining -= take;
                }
                if remaining == 0 {
                    break;
                }
                t = t + tick(1);
            }
        }

        let earliest = plan
            .iter()
            .map(|(t, _)| t.value())
            .fold(deadline.value(), f64::min);

        let delivery = MaterialDelivery::new(material, Tick::new(earliest), depot_id.clone(), count);

        if !simulate {
            let profile = self.profiles.get_mut(&key).unwrap();
            for (t, amt) in &plan {
                profile.consume_at(*t, *amt, &depot_id, material)?;
            }
            debug!(work_id = %work_id, material, depot_id, count, "committed material delivery");
        }

        Ok(SupplyOutcome::Delivered(delivery, Tick::new(earliest)))
    }

    /// Earliest time the representative first batch of `materials` could be
    /// delivered; does not mutate the timeline. `+∞` if any material has no
    /// depot at all.
    pub fn find_min_material_time(
        &mut self,
        work_id: &Id,
        earliest: Tick,
        materials: &[MaterialReq],
        batch_size: u32,
    ) -> Tick {
        if materials.is_empty() {
            return earliest;
        }
        let total: u32 = materials.iter().map(|m| m.count).sum();
        let batches = batches_for(total, batch_size);
        let mut worst = earliest;
        for m in materials {
            let first_batch = m.count / batches;
            if first_batch == 0 {
                continue;
            }
            match self.supply_one(work_id, &m.material, earliest, first_batch, true) {
                Ok(SupplyOutcome::Delivered(_, t)) => worst = crate::time::max(worst, t),
                Ok(SupplyOutcome::NoDepot) => {
                    trace!(material = %m.material, "no depot can supply this material");
                    return infeasible();
                }
                Err(_) => unreachable!("simulate mode never consumes, so it cannot overdraw"),
            }
        }
        worst
    }

    /// Splits demand into batches (first targets `start`, middle batches
    /// target `finish`, the last carries the fractional remainder) and
    /// commits each. Returns the deliveries plus the effective start
    /// (from batch 1) and effective finish (max across later batches).
    pub fn deliver_materials(
        &mut self,
        work_id: &Id,
        start: Tick,
        finish: Tick,
        materials: &[MaterialReq],
        batch_size: u32,
    ) -> Result<(Vec<MaterialDelivery>, Tick, Tick), SupplyError> {
        if materials.is_empty() {
            return Ok((Vec::new(), start, finish));
        }
        let total: u32 = materials.iter().map(|m| m.count).sum();
        let batches = batches_for(total, batch_size);

        let mut deliveries = Vec::new();
        let mut effective_start = start;
        for m in materials {
            let first = m.count / batches;
            if first == 0 {
                continue;
            }
            match self.supply_one(work_id, &m.material, start, first, false)? {
                SupplyOutcome::Delivered(d, t) => {
                    effective_start = crate::time::min(effective_start, t);
                    deliveries.push(d);
                }
                SupplyOutcome::NoDepot => return Err(SupplyError::NoDepotForMaterial(m.material.clone())),
            }
        }

        let mut effective_finish = finish;
        if batches > 1 {
            let remainder_batches = batches - 1;
            for b in 0..remainder_batches {
                let is_last = b == remainder_batches - 1;
                for m in materials {
                    let first = m.count / batches;
                    let amount = if is_last {
                        m.count - first * (batches - 1)
                    } else {
                        first
                    };
                    if amount == 0 {
                        continue;
                    }
                    match self.supply_one(work_id, &m.material, finish, amount, false)? {
                        SupplyOutcome::Delivered(d, t) => {
                            effective_finish = crate::time::max(effective_finish, t);
                            deliveries.push(d);
                        }
                        SupplyOutcome::NoDepot => return Err(SupplyError::NoDepotForMaterial(m.material.clone())),
                    }
                }
            }
        }

        Ok((deliveries, effective_start, effective_finish))
    }
}

fn batches_for(total: u32, batch_size: u32) -> u32 {
    if total == 0 {
        return 1;
    }
    let batch_size = batch_size.max(1);
    (total + batch_size - 1) / batch_size
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landscape::Depot;

    fn landscape() -> Landscape {
        Landscape::new(vec![Depot::new("Central")
            .with_id("d1")
            .with_resource("cement", 10)])
    }

    #[test]
    fn s4_material_deadline_shift() {
        let mut tl = SupplyTimeline::new(&landscape());
        let materials = vec![MaterialReq::new("cement", 15)];
        let work_id = "n1".to_string();

        let t = tl.find_min_material_time(&work_id, tick(0), &materials, 5);
        // 15 / 5 => 3 batches, first batch = 5, depot carries 10 total, fits at t=0.
        assert_eq!(t.value(), 0.0);

        let (deliveries, start, finish) = tl
            .deliver_materials(&work_id, tick(0), tick(10), &materials, 5)
            .unwrap();
        assert_eq!(start.value(), 0.0);
        assert!(finish.value() >= 10.0);
        assert_eq!(deliveries.len(), 3);
    }

    #[test]
    fn no_depot_is_infeasible() {
        let mut tl = SupplyTimeline::new(&landscape());
        let materials = vec![MaterialReq::new("steel", 5)];
        let t = tl.find_min_material_time(&"n1".to_string(), tick(0), &materials, 5);
        assert!(is_infeasible(t));
    }

    #[test]
    fn simulate_does_not_mutate() {
        let mut tl = SupplyTimeline::new(&landscape());
        let materials = vec![MaterialReq::new("cement", 5)];
        let first = tl.find_min_material_time(&"n1".to_string(), tick(0), &materials, 5);
        let second = tl.find_min_material_time(&"n2".to_string(), tick(0), &materials, 5);
        assert_eq!(first.value(), second.value());
    }

    #[test]
    fn withdrawals_are_permanent_and_do_not_renew() {
        let mut tl = SupplyTimeline::new(&landscape());
        let materials = vec![MaterialReq::new("cement", 10)];

        // First work drains the depot entirely at tick 0.
        tl.deliver_materials(&"n1".to_string(), tick(0), tick(0), &materials, 10)
            .unwrap();

        // A second, independent demand must not find any stock left —
        // the depot never had a renewable per-tick rate, only one finite
        // baseline of 10 units for the whole project.
        let t = tl.find_min_material_time(&"n2".to_string(), tick(1), &materials, 10);
        assert!(is_infeasible(t));
    }

    #[test]
    fn stock_invariant_holds_after_a_partial_withdrawal() {
        let mut tl = SupplyTimeline::new(&landscape());
        let materials = vec![MaterialReq::new("cement", 4)];
        tl.deliver_materials(&"n1".to_string(), tick(0), tick(0), &materials, 4)
            .unwrap();

        let profile = &tl.profiles[&("d1".to_string(), "cement".to_string())];
        // stock(t) + withdrawn(<=t) == initial capacity, for t at and after the withdrawal.
        assert_eq!(profile.capacity_at(tick(0)), 6);
        assert_eq!(profile.capacity_at(tick(5)), 6);
    }
}
