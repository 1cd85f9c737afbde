use serde::{Deserialize, Serialize};

use crate::sched::ClassRequirement;

/// A workload file: optional engine configuration plus job descriptors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkloadSpec {
    pub schema_version: u32,
    /// Partial engine configuration, applied field by field on top of a preset
    /// with [`crate::sched::SchedConfig::overlay`].
    #[serde(default)]
    pub config: Option<serde_json::Value>,
    #[serde(default)]
    pub jobs: Vec<JobSpec>,
}

/// One job descriptor as produced by the workload generator.
///
/// Work and arrival are signed so that malformed values survive parsing and
/// are rejected at admission instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSpec {
    pub id: u64,
    pub total_work: i64,
    #[serde(default)]
    pub arrival_time: i64,
    /// Explicit class requirement; takes precedence over `memory`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirement: Option<ClassRequirement>,
    /// Memory size in GB, classified with the configured class limits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<u64>,
}

impl JobSpec {
    pub fn new(id: u64, total_work: i64, requirement: ClassRequirement) -> Self {
        Self {
            id,
            total_work,
            arrival_time: 0,
            requirement: Some(requirement),
            memory: None,
        }
    }

    /// A job that can run on either class.
    pub fn any(id: u64, total_work: i64) -> Self {
        Self::new(id, total_work, ClassRequirement::ACompatible)
    }

    pub fn arriving_at(mut self, arrival_time: i64) -> Self {
        self.arrival_time = arrival_time;
        self
    }
}
