//! The landscape: depots that stock materials, consumed by the supply
//! timeline.

use crate::Id;

/// A `(material name, count)` pair, as carried by a depot's initial stock
/// listing.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MaterialAmount {
    pub material: String,
    pub count: u32,
}

impl MaterialAmount {
    pub fn new(material: impl Into<String>, count: u32) -> Self {
        Self {
            material: material.into(),
            count,
        }
    }
}

/// A depot: a source of one or more materials with a finite initial stock
/// per material.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Depot {
    id: Id,
    name: String,
    resources: Vec<MaterialAmount>,
}

impl Depot {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: crate::generate_id(),
            name: name.into(),
            resources: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<Id>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_resource(mut self, material: impl Into<String>, count: u32) -> Self {
        self.resources.push(MaterialAmount::new(material, count));
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn resources(&self) -> &[MaterialAmount] {
        &self.resources
    }

    pub fn stock_of(&self, material: &str) -> u32 {
        self.resources
            .iter()
            .find(|r| r.material == material)
            .map(|r| r.count)
            .unwrap_or(0)
    }
}

/// The full set of depots available to a schedule run.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Landscape {
    depots: Vec<Depot>,
}

impl Landscape {
    pub fn new(depots: Vec<Depot>) -> Self {
        Self { depots }
    }

    pub fn depots(&self) -> &[Depot] {
        &self.depots
    }
}
