//! 错误类型
//!
//! 配置错误与准入错误都是调用方的问题；`SimError` 表示引擎内部不变式被破坏，必须终止仿真。

use super::id::{JobId, UnitId};
use super::pool::PoolFault;
use crate::sim::SimTime;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("no execution units configured")]
    NoUnits,
    #[error("class {class} speed multiplier must be >= 1")]
    ZeroSpeed { class: &'static str },
    #[error("round robin quantum must be >= 1")]
    ZeroQuantum,
    #[error("class A limit {class_a_max} exceeds class B limit {class_b_max}")]
    InvertedLimits { class_a_max: u64, class_b_max: u64 },
}

/// 单个作业的准入失败；不影响其它作业和仿真本身
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum AdmissionError {
    #[error("job {id}: resource requirement exceeds the largest unit class")]
    OverCapacity { id: JobId },
    #[error("job {id}: total work must be positive, got {work}")]
    NonPositiveWork { id: JobId, work: i64 },
    #[error("job {id}: arrival time must be non-negative, got {arrival}")]
    NegativeArrival { id: JobId, arrival: i64 },
    #[error("job {id}: duplicate job id")]
    DuplicateId { id: JobId },
    #[error("job {id}: neither requirement nor memory given")]
    MissingRequirement { id: JobId },
    #[error("job {id}: no configured unit can host it")]
    NoCompatibleUnit { id: JobId },
    #[error("job {id}: simulation already started")]
    AfterStart { id: JobId },
}

impl AdmissionError {
    pub fn job(&self) -> JobId {
        match *self {
            AdmissionError::OverCapacity { id }
            | AdmissionError::NonPositiveWork { id, .. }
            | AdmissionError::NegativeArrival { id, .. }
            | AdmissionError::DuplicateId { id }
            | AdmissionError::MissingRequirement { id }
            | AdmissionError::NoCompatibleUnit { id }
            | AdmissionError::AfterStart { id } => id,
        }
    }
}

/// 单元在快照里的状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitSnapshot {
    pub unit: UnitId,
    pub class: super::job::ResourceClass,
    pub job: Option<JobId>,
}

/// 停滞时的完整状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StallSnapshot {
    pub at: SimTime,
    pub pending_a: Vec<JobId>,
    pub pending_b: Vec<JobId>,
    pub units: Vec<UnitSnapshot>,
}

impl fmt::Display for StallSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "t={} pending_a={:?} pending_b={:?} units=[",
            self.at, self.pending_a, self.pending_b
        )?;
        for (i, u) in self.units.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match u.job {
                Some(job) => write!(f, "{}({:?})=job {}", u.unit, u.class, job)?,
                None => write!(f, "{}({:?})=idle", u.unit, u.class)?,
            }
        }
        write!(f, "]")
    }
}

/// 引擎内部错误：均为致命错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    #[error("stalled with pending jobs and an empty timeline: {0}")]
    Stalled(Box<StallSnapshot>),
    #[error("invariant violated at t={at}: {detail}")]
    Invariant { at: SimTime, detail: String },
    /// 单元池拒绝了绑定或释放：时间线与单元状态不一致
    #[error("unit pool fault at t={at}: {fault}")]
    Pool {
        at: SimTime,
        #[source]
        fault: PoolFault,
    },
}

impl SimError {
    pub fn invariant(at: SimTime, detail: impl Into<String>) -> Self {
        SimError::Invariant {
            at,
            detail: detail.into(),
        }
    }

    pub(crate) fn pool(at: SimTime, fault: PoolFault) -> Self {
        SimError::Pool { at, fault }
    }
}
