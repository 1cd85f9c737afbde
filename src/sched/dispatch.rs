//! 派发器
//!
//! 把等待中的作业绑定到空闲单元，直到再也无法分配为止。

use super::engine::Engine;
use super::error::SimError;
use super::id::{JobId, UnitId};
use super::job::{JobState, ResourceClass};
use super::pool::Binding;
use crate::sim::Event;
use crate::trace::TraceAction;
use tracing::debug;

impl Engine {
    /// 填充所有可以填充的空闲单元。
    ///
    /// 1. B-only 作业优先占用空闲 B 类单元；
    /// 2. A-compatible 作业优先用 B 类单元，除非等待的 A-compatible 作业多于空闲 B 类单元
    ///    且还有空闲 A 类单元，此时用 A 类单元；
    /// 3. 否则停止。
    pub(crate) fn dispatch(&mut self) -> Result<(), SimError> {
        loop {
            let idle_a = self.pool.idle_count(ResourceClass::A);
            let idle_b = self.pool.idle_count(ResourceClass::B);

            if !self.pending_b.is_empty() && idle_b > 0 {
                self.dispatch_one(true, ResourceClass::B)?;
                continue;
            }

            if !self.pending_a.is_empty() && idle_a + idle_b > 0 {
                let use_b = idle_b > 0 && (self.pending_a.len() <= idle_b || idle_a == 0);
                let class = if use_b {
                    ResourceClass::B
                } else {
                    ResourceClass::A
                };
                self.dispatch_one(false, class)?;
                continue;
            }

            return Ok(());
        }
    }

    fn dispatch_one(&mut self, b_only: bool, class: ResourceClass) -> Result<(), SimError> {
        let now = self.now();
        let queue = if b_only {
            &mut self.pending_b
        } else {
            &mut self.pending_a
        };
        let job = queue
            .dequeue()
            .ok_or_else(|| SimError::invariant(now, "dequeue from an empty pending queue"))?;
        let unit = self
            .pool
            .acquire_idle(class)
            .ok_or_else(|| SimError::invariant(now, format!("no idle class {class:?} unit")))?;
        self.bind(job, unit, TraceAction::Dispatch)
    }

    /// 把作业绑定到单元并调度本段结束事件。
    ///
    /// 本段工作量为剩余工作（round robin 下不超过 quantum），耗时再乘以单元速度倍数。
    pub(crate) fn bind(
        &mut self,
        job_id: JobId,
        unit_id: UnitId,
        action: TraceAction,
    ) -> Result<(), SimError> {
        let now = self.now();
        let quantum = self.cfg.quantum();
        let speed = self
            .pool
            .unit(unit_id)
            .map(|u| u.speed)
            .ok_or_else(|| SimError::invariant(now, format!("unknown unit {unit_id}")))?;

        let job = self.job_mut(job_id)?;
        if job.remaining == 0 || job.is_completed() {
            return Err(SimError::invariant(
                now,
                format!("binding job {job_id} with no remaining work"),
            ));
        }
        let (slice, ev) = match quantum {
            Some(q) if job.remaining > q => (
                q,
                Event::QuantumExpiry {
                    job: job_id,
                    unit: unit_id,
                },
            ),
            _ => (
                job.remaining,
                Event::Completion {
                    job: job_id,
                    unit: unit_id,
                },
            ),
        };
        let at = slice
            .checked_mul(speed)
            .and_then(|d| now.checked_add(d))
            .ok_or_else(|| SimError::invariant(now, format!("end time of job {job_id} overflows")))?;

        job.start.get_or_insert(now);
        job.state = JobState::Running(unit_id);
        let remaining = job.remaining;

        let event_seq = self.timeline.schedule(at, ev);
        self.pool
            .bind(
                unit_id,
                Binding {
                    job: job_id,
                    since: now,
                    slice,
                    event_seq,
                },
            )
            .map_err(|f| SimError::pool(now, f))?;
        self.context_switches += 1;
        self.trace.push(now, action, job_id, unit_id);

        debug!(
            t = %now,
            job = %job_id,
            unit = %unit_id,
            ?action,
            remaining,
            slice,
            until = %at,
            "作业开始运行"
        );
        Ok(())
    }
}
