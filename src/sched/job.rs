//! 作业与资源类别
//!
//! 定义作业状态、资源类别需求以及按内存大小分类的规则。

use super::id::{JobId, UnitId};
use crate::sim::SimTime;
use serde::{Deserialize, Serialize};

/// 执行单元的资源类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceClass {
    /// 容量小、速度慢
    A,
    /// 容量大、速度快
    B,
}

/// 作业对资源类别的需求
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassRequirement {
    /// 可在任意类别上运行
    ACompatible,
    /// 只能在 B 类单元上运行
    BOnly,
    /// 超出最大容量，准入时拒绝
    OverCapacity,
}

impl ClassRequirement {
    /// 该需求能否在给定类别的单元上运行
    pub fn fits(self, class: ResourceClass) -> bool {
        match self {
            ClassRequirement::ACompatible => true,
            ClassRequirement::BOnly => class == ResourceClass::B,
            ClassRequirement::OverCapacity => false,
        }
    }
}

/// 各类别能承载的最大内存需求（GB）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassLimits {
    pub class_a_max: u64,
    pub class_b_max: u64,
}

impl Default for ClassLimits {
    fn default() -> Self {
        Self {
            class_a_max: 8,
            class_b_max: 16,
        }
    }
}

impl ClassLimits {
    /// `memory <= a_max` 为 A-compatible；`a_max < memory <= b_max` 为 B-only；否则超容量。
    pub fn classify(&self, memory: u64) -> ClassRequirement {
        if memory <= self.class_a_max {
            ClassRequirement::ACompatible
        } else if memory <= self.class_b_max {
            ClassRequirement::BOnly
        } else {
            ClassRequirement::OverCapacity
        }
    }
}

/// 作业生命周期状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    /// 已准入，等待 Arrival 事件
    Incoming,
    Pending,
    Running(UnitId),
    Completed,
}

/// 已准入的作业
#[derive(Debug, Clone)]
pub struct Job {
    pub id: JobId,
    pub total_work: u64,
    pub requirement: ClassRequirement,
    pub arrival: SimTime,
    /// 剩余工作量；只在抢占/迁移/到期/完成时更新
    pub remaining: u64,
    /// 首次被派发的时间
    pub start: Option<SimTime>,
    pub completion: Option<SimTime>,
    pub state: JobState,
}

impl Job {
    pub fn new(
        id: JobId,
        total_work: u64,
        requirement: ClassRequirement,
        arrival: SimTime,
    ) -> Self {
        Self {
            id,
            total_work,
            requirement,
            arrival,
            remaining: total_work,
            start: None,
            completion: None,
            state: JobState::Incoming,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.state == JobState::Completed
    }
}
