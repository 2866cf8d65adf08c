//! Contractors own finite, typed worker pools; a [`WorkerTeam`] draws from
//! exactly one contractor to staff a work unit.

use std::collections::HashMap;

use crate::Id;

/// A contractor's headcount, by specialty. All workers of one specialty
/// within one contractor are interchangeable.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Contractor {
    id: Id,
    name: String,
    workers: HashMap<String, u32>,
}

impl Contractor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: crate::generate_id(),
            name: name.into(),
            workers: HashMap::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<Id>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_workers(mut self, specialty: impl Into<String>, count: u32) -> Self {
        self.workers.insert(specialty.into(), count);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Total headcount for a specialty; zero if the contractor has none.
    pub fn headcount(&self, specialty: &str) -> u32 {
        self.workers.get(specialty).copied().unwrap_or(0)
    }

    pub fn specialties(&self) -> impl Iterator<Item = &str> {
        self.workers.keys().map(|s| s.as_str())
    }
}

/// One line of a [`WorkerTeam`]: a specialty and a headcount drawn from the
/// team's contractor.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TeamMember {
    pub specialty: String,
    pub count: u32,
}

impl TeamMember {
    pub fn new(specialty: impl Into<String>, count: u32) -> Self {
        Self {
            specialty: specialty.into(),
            count,
        }
    }
}

/// A team of workers drawn from a single contractor, staffing one work
/// unit. Member order matches the order of the work unit's worker
/// requirements.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorkerTeam {
    contractor_id: Id,
    members: Vec<TeamMember>,
}

impl WorkerTeam {
    pub fn new(contractor_id: impl Into<Id>, members: Vec<TeamMember>) -> Self {
        Self {
            contractor_id: contractor_id.into(),
            members,
        }
    }

    pub fn empty(contractor_id: impl Into<Id>) -> Self {
        Self::new(contractor_id, Vec::new())
    }

    pub fn contractor_id(&self) -> &str {
        &self.contractor_id
    }

    pub fn members(&self) -> &[TeamMember] {
        &self.members
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn count_for(&self, specialty: &str) -> u32 {
        self.members
            .iter()
            .find(|m| m.specialty == specialty)
            .map(|m| m.count)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headcount_defaults_to_zero() {
        let c = Contractor::new("Acme").with_workers("mason", 2);
        assert_eq!(c.headcount("mason"), 2);
        assert_eq!(c.headcount("carpenter"), 0);
    }

    #[test]
    fn team_count_for_missing_specialty_is_zero() {
        let team = WorkerTeam::new("acme", vec![TeamMember::new("mason", 2)]);
        assert_eq!(team.count_for("mason"), 2);
        assert_eq!(team.count_for("carpenter"), 0);
    }
}
