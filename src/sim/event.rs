//! 仿真事件
//!
//! 到达 / 完成 / 时间片到期三类事件，由驱动循环逐个消费。

use crate::sched::{JobId, UnitId};

/// 仿真事件（判别联合）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// 作业进入系统（仅动态到达模式）
    Arrival { job: JobId },
    /// 作业在某个单元上运行结束
    Completion { job: JobId, unit: UnitId },
    /// 时间片用完但作业仍有剩余工作（仅 round robin）
    QuantumExpiry { job: JobId, unit: UnitId },
}

impl Event {
    pub fn job(&self) -> JobId {
        match *self {
            Event::Arrival { job }
            | Event::Completion { job, .. }
            | Event::QuantumExpiry { job, .. } => job,
        }
    }

    /// 同一时间戳下的处理顺序：先释放单元（完成/到期），再处理到达。
    pub fn rank(&self) -> u8 {
        match self {
            Event::Completion { .. } => 0,
            Event::QuantumExpiry { .. } => 1,
            Event::Arrival { .. } => 2,
        }
    }
}
