//! 统计信息
//!
//! 从已完成作业汇总每个作业的记录和整体指标。

use crate::sched::{AdmissionError, Job, JobId};
use crate::sim::SimTime;
use crate::trace::TraceEvent;
use serde::Serialize;

/// 单个作业的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobRecord {
    pub id: JobId,
    pub arrival_time: SimTime,
    pub start_time: SimTime,
    pub completion_time: SimTime,
    /// `turnaround_time - total_work`
    pub wait_time: i64,
    /// `completion_time - arrival_time`
    pub turnaround_time: u64,
}

impl JobRecord {
    /// 作业未完成时返回 None
    pub fn from_job(job: &Job) -> Option<Self> {
        let completion = job.completion?;
        let start = job.start?;
        let turnaround = completion.since(job.arrival);
        Some(Self {
            id: job.id,
            arrival_time: job.arrival,
            start_time: start,
            completion_time: completion,
            wait_time: turnaround as i64 - job.total_work as i64,
            turnaround_time: turnaround,
        })
    }
}

/// 整体指标
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct Summary {
    pub completed: usize,
    pub rejected: usize,
    pub average_wait_time: f64,
    pub average_turnaround_time: f64,
    pub context_switch_count: u64,
    pub makespan: SimTime,
}

impl Summary {
    pub fn from_records(records: &[JobRecord], rejected: usize, context_switches: u64) -> Self {
        let n = records.len();
        let (wait, turnaround) = records.iter().fold((0i128, 0u128), |(w, t), r| {
            (w + r.wait_time as i128, t + r.turnaround_time as u128)
        });
        let avg = |total: f64| if n == 0 { 0.0 } else { total / n as f64 };
        Self {
            completed: n,
            rejected,
            average_wait_time: avg(wait as f64),
            average_turnaround_time: avg(turnaround as f64),
            context_switch_count: context_switches,
            makespan: records
                .iter()
                .map(|r| r.completion_time)
                .max()
                .unwrap_or(SimTime::ZERO),
        }
    }
}

/// 一次仿真的完整输出
#[derive(Debug, Clone, Serialize)]
pub struct SimReport {
    /// 按完成顺序
    pub records: Vec<JobRecord>,
    pub summary: Summary,
    pub rejected: Vec<AdmissionError>,
    #[serde(skip)]
    pub trace: Vec<TraceEvent>,
}

impl SimReport {
    pub fn record(&self, id: JobId) -> Option<&JobRecord> {
        self.records.iter().find(|r| r.id == id)
    }
}
