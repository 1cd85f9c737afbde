//! 机会迁移
//!
//! B 类单元刚空闲且没有 B-only 作业在等待时，把 A 类单元上剩余工作最多的作业搬过来。

use super::engine::Engine;
use super::error::SimError;
use super::id::UnitId;
use super::job::{ClassRequirement, ResourceClass};
use super::preempt::Displaced;
use crate::sim::SimTime;
use crate::trace::TraceAction;
use std::cmp::Reverse;
use tracing::debug;

impl Engine {
    /// 只在完成事件释放出 B 类单元后调用，不做持续评估。返回是否发生了迁移。
    pub(crate) fn try_migrate(&mut self, freed: UnitId) -> Result<bool, SimError> {
        let now = self.now();
        if !self.cfg.migration {
            return Ok(false);
        }
        let Some(target) = self.pool.unit(freed) else {
            return Err(SimError::invariant(now, format!("unknown unit {freed}")));
        };
        if target.class != ResourceClass::B || !target.is_idle() || !self.pending_b.is_empty() {
            return Ok(false);
        }
        let target_speed = target.speed;

        // 剩余工作最多者优先，其次最早开始，最后单元编号小
        let mut best: Option<((u64, Reverse<SimTime>, Reverse<UnitId>), UnitId, u64)> = None;
        for (unit, binding) in self.pool.busy() {
            if unit.class != ResourceClass::A || unit.speed <= target_speed {
                continue;
            }
            let job = self.job_ref(binding.job)?;
            if job.requirement != ClassRequirement::ACompatible {
                continue;
            }
            let projected = self.projected_remaining(unit, binding)?;
            // 恰好在此刻结束的作业，其完成事件马上就会处理
            if projected == 0 {
                continue;
            }
            let started = job.start.unwrap_or(binding.since);
            let key = (projected, Reverse(started), Reverse(unit.id));
            if best.is_none_or(|(k, _, _)| key > k) {
                best = Some((key, unit.id, projected));
            }
        }
        let Some((_, from, projected)) = best else {
            return Ok(false);
        };

        let job = match self.displace(from, projected)? {
            Displaced::Suspended(job) => job,
            Displaced::Completed => {
                return Err(SimError::invariant(
                    now,
                    format!("migration candidate on {from} had no remaining work"),
                ));
            }
        };
        self.bind(job, freed, TraceAction::Migrate)?;
        debug!(t = %now, job = %job, from = %from, to = %freed, remaining = projected, "作业迁移到快单元");

        // 被腾出的 A 类单元
        self.dispatch()?;
        Ok(true)
    }
}
