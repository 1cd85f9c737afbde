//! 仿真上下文与驱动循环
//!
//! `Engine` 独占单元池、等待队列和时间线。驱动循环每次弹出一个事件，
//! 同步地完成全部状态修改，然后调用派发器填充空闲单元。

use super::config::{ArrivalMode, PreemptionMode, SchedConfig};
use super::error::{AdmissionError, ConfigError, SimError, StallSnapshot, UnitSnapshot};
use super::id::{JobId, UnitId};
use super::job::{ClassRequirement, Job, JobState, ResourceClass};
use super::pool::{Binding, UnitPool};
use crate::queue::{PendingQueue, new_queue};
use crate::sim::{Event, JobSpec, SimTime, Timeline};
use crate::stats::{JobRecord, SimReport, Summary};
use crate::trace::{TraceAction, TraceLogger};
use std::collections::BTreeMap;
use tracing::{debug, info, trace, warn};

/// 调度引擎：一次仿真的完整状态
#[derive(Debug)]
pub struct Engine {
    pub(crate) cfg: SchedConfig,
    pub(crate) timeline: Timeline,
    pub(crate) pool: UnitPool,
    pub(crate) jobs: BTreeMap<JobId, Job>,
    /// A-compatible 作业（未分区时为唯一的共享队列）
    pub(crate) pending_a: Box<dyn PendingQueue>,
    /// B-only 作业
    pub(crate) pending_b: Box<dyn PendingQueue>,
    pub(crate) completed: Vec<JobId>,
    pub(crate) rejected: Vec<AdmissionError>,
    pub(crate) context_switches: u64,
    pub(crate) trace: TraceLogger,
    started: bool,
}

impl Engine {
    pub fn new(cfg: SchedConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;
        Ok(Self {
            timeline: Timeline::default(),
            pool: UnitPool::new(cfg.class_a, cfg.class_b),
            jobs: BTreeMap::new(),
            pending_a: new_queue(cfg.order),
            pending_b: new_queue(cfg.order),
            completed: Vec::new(),
            rejected: Vec::new(),
            context_switches: 0,
            trace: TraceLogger::default(),
            started: false,
            cfg,
        })
    }

    pub fn now(&self) -> SimTime {
        self.timeline.now()
    }

    pub fn config(&self) -> &SchedConfig {
        &self.cfg
    }

    pub fn pool(&self) -> &UnitPool {
        &self.pool
    }

    pub fn job(&self, id: JobId) -> Option<&Job> {
        self.jobs.get(&id)
    }

    pub fn jobs(&self) -> impl Iterator<Item = &Job> {
        self.jobs.values()
    }

    pub fn context_switches(&self) -> u64 {
        self.context_switches
    }

    pub fn trace(&self) -> &TraceLogger {
        &self.trace
    }

    pub fn rejected(&self) -> &[AdmissionError] {
        &self.rejected
    }

    pub fn pending_len(&self) -> usize {
        self.pending_a.len() + self.pending_b.len()
    }

    pub fn completed(&self) -> &[JobId] {
        &self.completed
    }

    /// 准入一个作业。失败会被记录在报告中，但不影响其它作业。
    ///
    /// 只能在第一次 [`Engine::step`] 之前调用。
    pub fn admit(&mut self, spec: &JobSpec) -> Result<JobId, AdmissionError> {
        let res = self.try_admit(spec);
        match &res {
            Ok(id) => debug!(job = %id, work = spec.total_work, "作业已准入"),
            Err(e) => {
                warn!(error = %e, "拒绝作业");
                self.rejected.push(e.clone());
            }
        }
        res
    }

    /// 逐个准入，返回成功的数量
    pub fn admit_all<'a>(&mut self, specs: impl IntoIterator<Item = &'a JobSpec>) -> usize {
        specs
            .into_iter()
            .filter(|spec| self.admit(spec).is_ok())
            .count()
    }

    fn try_admit(&mut self, spec: &JobSpec) -> Result<JobId, AdmissionError> {
        let id = JobId(spec.id);
        // 首次 step 之后静态队列已派发、时钟已前进
        if self.started {
            return Err(AdmissionError::AfterStart { id });
        }
        if self.jobs.contains_key(&id) {
            return Err(AdmissionError::DuplicateId { id });
        }
        if spec.total_work <= 0 {
            return Err(AdmissionError::NonPositiveWork {
                id,
                work: spec.total_work,
            });
        }
        if spec.arrival_time < 0 {
            return Err(AdmissionError::NegativeArrival {
                id,
                arrival: spec.arrival_time,
            });
        }
        let requirement = match (spec.requirement, spec.memory) {
            (Some(req), _) => req,
            (None, Some(mem)) => self.cfg.limits.classify(mem),
            (None, None) => return Err(AdmissionError::MissingRequirement { id }),
        };
        let requirement = match requirement {
            ClassRequirement::OverCapacity => return Err(AdmissionError::OverCapacity { id }),
            // 未分区时不检查兼容性
            _ if !self.cfg.partitioned => ClassRequirement::ACompatible,
            ClassRequirement::BOnly if self.cfg.class_b.units == 0 => {
                return Err(AdmissionError::NoCompatibleUnit { id });
            }
            req => req,
        };

        let work = spec.total_work as u64;
        match self.cfg.arrivals {
            ArrivalMode::Static => {
                if spec.arrival_time != 0 {
                    trace!(job = %id, arrival = spec.arrival_time, "静态到达模式忽略到达时间");
                }
                let mut job = Job::new(id, work, requirement, SimTime::ZERO);
                job.state = JobState::Pending;
                self.jobs.insert(id, job);
                self.queue_for(requirement).enqueue(id, work);
            }
            ArrivalMode::Dynamic => {
                let arrival = SimTime(spec.arrival_time as u64);
                self.jobs.insert(id, Job::new(id, work, requirement, arrival));
                self.timeline.schedule(arrival, Event::Arrival { job: id });
            }
        }
        Ok(id)
    }

    pub(crate) fn job_ref(&self, id: JobId) -> Result<&Job, SimError> {
        self.jobs
            .get(&id)
            .ok_or_else(|| SimError::invariant(self.now(), format!("unknown job {id}")))
    }

    pub(crate) fn job_mut(&mut self, id: JobId) -> Result<&mut Job, SimError> {
        let now = self.now();
        self.jobs
            .get_mut(&id)
            .ok_or_else(|| SimError::invariant(now, format!("unknown job {id}")))
    }

    /// 把作业放入与其需求对应的等待队列
    pub(crate) fn enqueue(&mut self, id: JobId) -> Result<(), SimError> {
        let job = self.job_mut(id)?;
        job.state = JobState::Pending;
        let (requirement, remaining) = (job.requirement, job.remaining);
        self.queue_for(requirement).enqueue(id, remaining);
        Ok(())
    }

    fn queue_for(&mut self, requirement: ClassRequirement) -> &mut Box<dyn PendingQueue> {
        match requirement {
            ClassRequirement::BOnly => &mut self.pending_b,
            _ => &mut self.pending_a,
        }
    }

    /// 是否存在可以立即承载该需求的空闲单元
    pub(crate) fn has_idle_for(&self, requirement: ClassRequirement) -> bool {
        match requirement {
            ClassRequirement::BOnly => self.pool.idle_count(ResourceClass::B) > 0,
            _ => self.pool.total_idle() > 0,
        }
    }

    /// 在当前时刻把作业标记为完成
    pub(crate) fn finish(&mut self, id: JobId, unit: UnitId) -> Result<(), SimError> {
        let now = self.now();
        let job = self.job_mut(id)?;
        job.remaining = 0;
        job.completion = Some(now);
        job.state = JobState::Completed;
        self.completed.push(id);
        self.trace.push(now, TraceAction::Complete, id, unit);
        debug!(t = %now, job = %id, unit = %unit, "作业完成");
        Ok(())
    }

    /// 事件必须对应单元上当前的绑定，否则说明时间线与单元池不一致
    fn take_binding(&mut self, job: JobId, unit: UnitId, seq: u64) -> Result<Binding, SimError> {
        let now = self.now();
        let current = self.pool.unit(unit).and_then(|u| u.binding()).copied();
        match current {
            Some(b) if b.job == job && b.event_seq == seq => self
                .pool
                .release(unit)
                .map_err(|f| SimError::pool(now, f)),
            other => Err(SimError::invariant(
                now,
                format!(
                    "event for job {job} on {unit} does not match binding {:?}",
                    other.map(|b| b.job)
                ),
            )),
        }
    }

    /// 首次调用时为 t=0 已在队列中的作业派发单元
    fn start(&mut self) -> Result<(), SimError> {
        if !self.started {
            self.started = true;
            self.dispatch()?;
        }
        Ok(())
    }

    /// 处理一个事件。时间线为空时返回 false。
    pub fn step(&mut self) -> Result<bool, SimError> {
        self.start()?;
        let Some(item) = self.timeline.pop_earliest() else {
            if self.pending_len() > 0 {
                return Err(SimError::Stalled(Box::new(self.snapshot())));
            }
            return Ok(false);
        };
        debug!(
            now = %self.now(),
            seq = item.seq,
            ev = ?item.ev,
            remaining_queue = self.timeline.len(),
            "执行事件"
        );
        match item.ev {
            Event::Arrival { job } => self.on_arrival(job)?,
            Event::Completion { job, unit } => self.on_completion(job, unit, item.seq)?,
            Event::QuantumExpiry { job, unit } => self.on_quantum_expiry(job, unit, item.seq)?,
        }
        Ok(true)
    }

    /// 运行直到时间线为空，并返回统计结果。
    #[tracing::instrument(skip(self), fields(jobs = self.jobs.len(), units = self.pool.len()))]
    pub fn run(mut self) -> Result<SimReport, SimError> {
        info!(
            order = ?self.cfg.order,
            preemption = ?self.cfg.preemption,
            arrivals = ?self.cfg.arrivals,
            "▶️  开始运行调度仿真"
        );

        let mut event_count = 0u64;
        while self.step()? {
            event_count += 1;
        }
        self.check_terminal()?;

        info!(
            total_events = event_count,
            final_time = %self.now(),
            completed = self.completed.len(),
            context_switches = self.context_switches,
            "✅ 仿真完成"
        );
        Ok(self.into_report())
    }

    fn on_arrival(&mut self, id: JobId) -> Result<(), SimError> {
        let now = self.now();
        let job = self.job_ref(id)?;
        if job.state != JobState::Incoming {
            return Err(SimError::invariant(
                now,
                format!("arrival for job {id} in state {:?}", job.state),
            ));
        }
        let requirement = job.requirement;
        self.enqueue(id)?;
        debug!(t = %now, job = %id, ?requirement, "作业到达");

        if self.cfg.preemption == PreemptionMode::OnArrival && !self.has_idle_for(requirement) {
            self.try_preempt(id)?;
        }
        self.dispatch()
    }

    fn on_completion(&mut self, id: JobId, unit: UnitId, seq: u64) -> Result<(), SimError> {
        let binding = self.take_binding(id, unit, seq)?;
        let now = self.now();
        let remaining = self.job_ref(id)?.remaining;
        if binding.slice != remaining {
            return Err(SimError::invariant(
                now,
                format!("job {id} completed a slice of {} with {remaining} remaining", binding.slice),
            ));
        }
        self.finish(id, unit)?;
        self.dispatch()?;
        self.try_migrate(unit)?;
        Ok(())
    }

    fn on_quantum_expiry(&mut self, id: JobId, unit: UnitId, seq: u64) -> Result<(), SimError> {
        let binding = self.take_binding(id, unit, seq)?;
        let now = self.now();
        let job = self.job_mut(id)?;
        if binding.slice >= job.remaining {
            return Err(SimError::invariant(
                now,
                format!("quantum expiry for job {id} would leave no remaining work"),
            ));
        }
        job.remaining -= binding.slice;
        let remaining = job.remaining;
        self.trace.push(now, TraceAction::Expire, id, unit);
        debug!(t = %now, job = %id, unit = %unit, remaining, "时间片到期，回到队尾");
        self.enqueue(id)?;
        self.dispatch()
    }

    /// 当前等待队列与单元状态
    pub fn snapshot(&self) -> StallSnapshot {
        StallSnapshot {
            at: self.now(),
            pending_a: self.pending_a.snapshot(),
            pending_b: self.pending_b.snapshot(),
            units: self
                .pool
                .units()
                .iter()
                .map(|u| UnitSnapshot {
                    unit: u.id,
                    class: u.class,
                    job: u.binding().map(|b| b.job),
                })
                .collect(),
        }
    }

    /// 终止时：时间线与队列为空、所有单元空闲、准入数等于完成数
    fn check_terminal(&self) -> Result<(), SimError> {
        let now = self.now();
        if !self.timeline.is_empty() || self.pending_len() > 0 {
            return Err(SimError::invariant(now, "terminated with outstanding work"));
        }
        if !self.pool.all_idle() {
            return Err(SimError::invariant(
                now,
                format!("units still busy at termination: {}", self.snapshot()),
            ));
        }
        if self.completed.len() != self.jobs.len() {
            return Err(SimError::invariant(
                now,
                format!(
                    "accepted {} jobs but completed {}",
                    self.jobs.len(),
                    self.completed.len()
                ),
            ));
        }
        Ok(())
    }

    fn into_report(self) -> SimReport {
        let records: Vec<JobRecord> = self
            .completed
            .iter()
            .filter_map(|id| self.jobs.get(id))
            .filter_map(JobRecord::from_job)
            .collect();
        let summary = Summary::from_records(&records, self.rejected.len(), self.context_switches);
        SimReport {
            records,
            summary,
            rejected: self.rejected,
            trace: self.trace.events,
        }
    }
}
