use serde::{Deserialize, Serialize};

use crate::sched::{JobId, UnitId};
use crate::sim::SimTime;

/// 决策类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceAction {
    /// 作业被绑定到空闲单元
    Dispatch,
    /// 作业被挤下单元并重新排队
    Preempt,
    /// 作业从慢单元搬到刚空闲的快单元
    Migrate,
    /// 作业完成
    Complete,
    /// Round robin：时间片到期，作业回到队尾
    Expire,
}

/// 一条决策记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceEvent {
    /// 仿真时间（和 `SimTime.0` 同口径）
    pub t: SimTime,
    pub action: TraceAction,
    pub job: JobId,
    pub unit: UnitId,
}

/// 一个简单的决策收集器（存内存，仿真结束可写 JSON 文件）
#[derive(Debug, Default)]
pub struct TraceLogger {
    pub events: Vec<TraceEvent>,
}

impl TraceLogger {
    pub fn push(&mut self, t: SimTime, action: TraceAction, job: JobId, unit: UnitId) {
        self.events.push(TraceEvent {
            t,
            action,
            job,
            unit,
        });
    }

    /// 某类决策涉及的作业，按发生顺序
    pub fn jobs_with(&self, action: TraceAction) -> Vec<JobId> {
        self.events
            .iter()
            .filter(|e| e.action == action)
            .map(|e| e.job)
            .collect()
    }
}
