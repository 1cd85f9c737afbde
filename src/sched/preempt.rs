//! 抢占评估器
//!
//! 到达的作业无法立即放置时，在正在运行的作业中挑一个挤下来。

use super::config::QueueOrder;
use super::engine::Engine;
use super::error::SimError;
use super::id::{JobId, UnitId};
use super::job::{ClassRequirement, JobState};
use super::pool::{Binding, Unit};
use crate::trace::TraceAction;
use std::cmp::Reverse;
use tracing::debug;

/// 一个可被挤下的运行中作业
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub unit: UnitId,
    pub job: JobId,
    /// 是否为 A-compatible（更灵活，优先挤下）
    pub flexible: bool,
    /// 当前时刻推算的剩余工作
    pub projected: u64,
}

impl Candidate {
    /// 越大越优先：灵活性 > 剩余工作多 > 单元编号小
    fn rank(&self) -> (bool, u64, Reverse<UnitId>) {
        (self.flexible, self.projected, Reverse(self.unit))
    }
}

/// 把运行中的作业从单元上撤下之后的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Displaced {
    /// 推算剩余工作恰好为 0：按完成处理
    Completed,
    /// 作业仍有剩余工作，已离开单元，等待调用方安置
    Suspended(JobId),
}

impl Engine {
    /// `remaining - elapsed / speed`（向下取整）。结果为负说明记账出错。
    pub(crate) fn projected_remaining(
        &self,
        unit: &Unit,
        binding: &Binding,
    ) -> Result<u64, SimError> {
        let now = self.now();
        let job = self.job_ref(binding.job)?;
        let done = now.since(binding.since) / unit.speed;
        job.remaining.checked_sub(done).ok_or_else(|| {
            SimError::invariant(
                now,
                format!(
                    "job {} on {} would have negative remaining work ({} - {done})",
                    job.id, unit.id, job.remaining
                ),
            )
        })
    }

    /// 为 `incoming` 挑选被抢占者。
    ///
    /// FIFO 下到达顺序即优先级，正在运行的作业总是更早到达，因此从不抢占。
    pub fn select_victim(&self, incoming: JobId) -> Result<Option<Candidate>, SimError> {
        if self.cfg.order != QueueOrder::ShortestRemaining {
            return Ok(None);
        }
        let inc = self.job_ref(incoming)?;
        let mut best: Option<Candidate> = None;
        for (unit, binding) in self.pool.busy() {
            if !inc.requirement.fits(unit.class) {
                continue;
            }
            let victim = self.job_ref(binding.job)?;
            let projected = self.projected_remaining(unit, binding)?;
            let eligible = match (inc.requirement, victim.requirement) {
                // 灵活作业占着稀缺的 B 类单元
                (ClassRequirement::BOnly, ClassRequirement::ACompatible) => true,
                (ClassRequirement::ACompatible, ClassRequirement::BOnly) => false,
                _ => projected > inc.remaining,
            };
            if !eligible {
                continue;
            }
            let cand = Candidate {
                unit: unit.id,
                job: victim.id,
                flexible: victim.requirement == ClassRequirement::ACompatible,
                projected,
            };
            if best.is_none_or(|b| cand.rank() > b.rank()) {
                best = Some(cand);
            }
        }
        Ok(best)
    }

    /// 尝试为 `incoming` 腾出一个单元。返回是否发生了抢占（含按完成处理的情况）。
    pub(crate) fn try_preempt(&mut self, incoming: JobId) -> Result<bool, SimError> {
        let now = self.now();
        let Some(victim) = self.select_victim(incoming)? else {
            debug!(t = %now, job = %incoming, "无可抢占的作业，继续等待");
            return Ok(false);
        };
        match self.displace(victim.unit, victim.projected)? {
            Displaced::Completed => {}
            Displaced::Suspended(job) => {
                self.enqueue(job)?;
                self.trace.push(now, TraceAction::Preempt, job, victim.unit);
                debug!(
                    t = %now,
                    job = %job,
                    unit = %victim.unit,
                    remaining = victim.projected,
                    by = %incoming,
                    "作业被抢占"
                );
            }
        }
        Ok(true)
    }

    /// 撤下单元上的作业：取消其结束事件、释放单元、写回剩余工作。
    pub(crate) fn displace(&mut self, unit: UnitId, projected: u64) -> Result<Displaced, SimError> {
        let now = self.now();
        let binding = self.pool.release(unit).map_err(|f| SimError::pool(now, f))?;
        if !self.timeline.cancel(binding.event_seq) {
            return Err(SimError::invariant(
                now,
                format!("job {} on {unit} has no outstanding event", binding.job),
            ));
        }
        let remaining = self.job_ref(binding.job)?.remaining;
        if projected > remaining {
            return Err(SimError::invariant(
                now,
                format!(
                    "job {} projected {projected} exceeds remaining {remaining}",
                    binding.job
                ),
            ));
        }
        if projected == 0 {
            self.finish(binding.job, unit)?;
            return Ok(Displaced::Completed);
        }
        let job = self.job_mut(binding.job)?;
        job.remaining = projected;
        job.state = JobState::Pending;
        Ok(Displaced::Suspended(binding.job))
    }
}
