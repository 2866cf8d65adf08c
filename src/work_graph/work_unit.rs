use crate::Id;

/// A requirement for a single specialty: a name and an accepted headcount
/// range. Teams assigned to a work unit must satisfy `min_count..=max_count`
/// for every requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorkerReq {
    pub specialty: String,
    pub min_count: u32,
    pub max_count: u32,
}

impl WorkerReq {
    pub fn new(specialty: impl Into<String>, min_count: u32, max_count: u32) -> Self {
        Self {
            specialty: specialty.into(),
            min_count,
            max_count,
        }
    }

    pub fn fixed(specialty: impl Into<String>, count: u32) -> Self {
        Self::new(specialty, count, count)
    }

    pub fn accepts(&self, count: u32) -> bool {
        (self.min_count..=self.max_count).contains(&count)
    }
}

/// A material demand: a name and a count, consumed from the landscape's
/// depots via the supply timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MaterialReq {
    pub material: String,
    pub count: u32,
}

impl MaterialReq {
    pub fn new(material: impl Into<String>, count: u32) -> Self {
        Self {
            material: material.into(),
            count,
        }
    }
}

/// An atomic schedulable activity.
///
/// Service units (`is_service = true`) consume no workers and no materials
/// and take zero time, but still participate in precedence.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorkUnit {
    id: Id,
    name: String,
    volume: f64,
    worker_reqs: Vec<WorkerReq>,
    material_reqs: Vec<MaterialReq>,
    workground_size: u32,
    is_service: bool,
}

impl WorkUnit {
    pub fn new(name: impl Into<String>, volume: f64) -> Self {
        Self {
            id: crate::generate_id(),
            name: name.into(),
            volume,
            worker_reqs: Vec::new(),
            material_reqs: Vec::new(),
            workground_size: 1,
            is_service: false,
        }
    }

    pub fn with_id(mut self, id: impl Into<Id>) -> Self {
        self.id = id.into();
        self
    }

    pub fn service(name: impl Into<String>) -> Self {
        Self {
            is_service: true,
            ..Self::new(name, 0.0)
        }
    }

    pub fn with_worker_req(mut self, req: WorkerReq) -> Self {
        self.worker_reqs.push(req);
        self
    }

    pub fn with_material_req(mut self, req: MaterialReq) -> Self {
        self.material_reqs.push(req);
        self
    }

    pub fn with_workground_size(mut self, size: u32) -> Self {
        self.workground_size = size.max(1);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn worker_reqs(&self) -> &[WorkerReq] {
        &self.worker_reqs
    }

    pub fn material_reqs(&self) -> &[MaterialReq] {
        &self.material_reqs
    }

    pub fn workground_size(&self) -> u32 {
        self.workground_size
    }

    pub fn is_service(&self) -> bool {
        self.is_service
    }
}
