mod preemption;
mod scenarios;

use crate::sched::{Engine, SchedConfig};
use crate::sim::JobSpec;
use crate::stats::SimReport;

/// 准入全部作业并运行到结束
fn run_jobs(cfg: SchedConfig, jobs: &[JobSpec]) -> SimReport {
    let mut engine = Engine::new(cfg).expect("valid config");
    engine.admit_all(jobs);
    engine.run().expect("simulation run")
}
