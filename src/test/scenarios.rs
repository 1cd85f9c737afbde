use super::run_jobs;
use crate::sched::{
    ArrivalMode, ClassRequirement, ClassSpec, Engine, JobId, PreemptionMode, QueueOrder,
    SchedConfig, UnitId,
};
use crate::sim::{JobSpec, SimTime};
use crate::trace::{TraceAction, TraceEvent};

fn completion_of(report: &crate::stats::SimReport, id: u64) -> SimTime {
    report
        .record(JobId(id))
        .map(|r| r.completion_time)
        .expect("job completed")
}

#[test]
fn fifo_two_units_runs_both_jobs_in_parallel() {
    let report = run_jobs(
        SchedConfig::fifo(2),
        &[JobSpec::any(1, 5), JobSpec::any(2, 3)],
    );

    assert_eq!(completion_of(&report, 1), SimTime(5));
    assert_eq!(completion_of(&report, 2), SimTime(3));
    assert_eq!(report.summary.context_switch_count, 2);

    let dispatches: Vec<(JobId, UnitId)> = report
        .trace
        .iter()
        .filter(|e| e.action == TraceAction::Dispatch)
        .map(|e| (e.job, e.unit))
        .collect();
    assert_eq!(
        dispatches,
        vec![(JobId(1), UnitId(0)), (JobId(2), UnitId(1))]
    );
}

#[test]
fn sjf_single_unit_runs_shortest_first() {
    let report = run_jobs(
        SchedConfig::sjf(1),
        &[
            JobSpec::any(1, 10),
            JobSpec::any(2, 2),
            JobSpec::any(3, 6),
        ],
    );

    let order: Vec<JobId> = report
        .trace
        .iter()
        .filter(|e| e.action == TraceAction::Dispatch)
        .map(|e| e.job)
        .collect();
    assert_eq!(order, vec![JobId(2), JobId(3), JobId(1)]);
    assert_eq!(completion_of(&report, 2), SimTime(2));
    assert_eq!(completion_of(&report, 3), SimTime(8));
    assert_eq!(completion_of(&report, 1), SimTime(18));
    assert_eq!(report.summary.context_switch_count, 3);
}

#[test]
fn sjf_with_dynamic_arrivals_preempts_to_reach_same_completions() {
    let cfg = SchedConfig {
        arrivals: ArrivalMode::Dynamic,
        preemption: PreemptionMode::OnArrival,
        ..SchedConfig::sjf(1)
    };
    let report = run_jobs(
        cfg,
        &[
            JobSpec::any(1, 10),
            JobSpec::any(2, 2),
            JobSpec::any(3, 6),
        ],
    );

    // job 1 is dispatched on its own arrival, then displaced by job 2
    assert_eq!(
        report
            .trace
            .iter()
            .filter(|e| e.action == TraceAction::Preempt)
            .map(|e| e.job)
            .collect::<Vec<_>>(),
        vec![JobId(1)]
    );
    assert_eq!(completion_of(&report, 2), SimTime(2));
    assert_eq!(completion_of(&report, 3), SimTime(8));
    assert_eq!(completion_of(&report, 1), SimTime(18));
    assert_eq!(report.summary.context_switch_count, 4);
}

/// 一个 A 类单元（u0，速度 2）和一个 B 类单元（u1，速度 1），动态到达 + 到达抢占
fn two_class_dynamic() -> SchedConfig {
    SchedConfig {
        class_a: ClassSpec::new(1, 2),
        class_b: ClassSpec::new(1, 1),
        migration: false,
        ..SchedConfig::sjf_dynamic(1, 1)
    }
}

#[test]
fn b_only_arrival_does_not_displace_shorter_b_only_job() {
    // t=10: u0 runs A-compatible job 2 (projected 13 - 10/2 = 8),
    //       u1 runs B-only job 1 (projected 14 - 10 = 4)
    let jobs = [
        JobSpec::new(1, 14, ClassRequirement::BOnly),
        JobSpec::new(2, 13, ClassRequirement::ACompatible),
        JobSpec::new(3, 6, ClassRequirement::BOnly).arriving_at(10),
    ];
    let mut engine = Engine::new(two_class_dynamic()).expect("config");
    engine.admit_all(&jobs);

    while engine.now() < SimTime(10) || engine.job(JobId(3)).and_then(|j| j.start).is_none() {
        if engine.now() == SimTime(10) {
            // job 3 has arrived but cannot be placed
            assert_eq!(engine.select_victim(JobId(3)).expect("select"), None);
        }
        assert!(engine.step().expect("step"));
    }

    let report = engine.run().expect("run");
    assert!(
        report.trace.iter().all(|e| e.action != TraceAction::Preempt),
        "no job may be displaced: {:?}",
        report.trace
    );
    let job3 = report.record(JobId(3)).expect("job 3");
    assert_eq!(job3.start_time, SimTime(14));
    assert_eq!(job3.completion_time, SimTime(20));
    assert_eq!(completion_of(&report, 2), SimTime(26));
}

#[test]
fn b_only_arrival_displaces_flexible_job_on_class_b_unit() {
    // job 1 is A-compatible but took the fast unit; job 3 needs class B
    let jobs = [
        JobSpec::new(1, 14, ClassRequirement::ACompatible),
        JobSpec::new(2, 13, ClassRequirement::ACompatible),
        JobSpec::new(3, 6, ClassRequirement::BOnly).arriving_at(10),
    ];
    let report = run_jobs(two_class_dynamic(), &jobs);

    let preempt: Vec<&TraceEvent> = report
        .trace
        .iter()
        .filter(|e| e.action == TraceAction::Preempt)
        .collect();
    assert_eq!(preempt.len(), 1);
    assert_eq!(preempt[0].job, JobId(1));
    assert_eq!(preempt[0].unit, UnitId(1));
    assert_eq!(preempt[0].t, SimTime(10));

    assert_eq!(completion_of(&report, 3), SimTime(16));
    // 4 remaining units resumed on u1 at t=16
    assert_eq!(completion_of(&report, 1), SimTime(20));
    assert_eq!(completion_of(&report, 2), SimTime(26));
    let job1 = report.record(JobId(1)).expect("job 1");
    assert_eq!(job1.start_time, SimTime::ZERO);
    assert_eq!(job1.arrival_time, SimTime::ZERO);
    assert_eq!(job1.wait_time, 20 - 14);
}

#[test]
fn round_robin_single_unit_runs_three_slices() {
    let report = run_jobs(SchedConfig::round_robin(1, 4), &[JobSpec::any(1, 10)]);

    let segments: Vec<(TraceAction, SimTime)> =
        report.trace.iter().map(|e| (e.action, e.t)).collect();
    assert_eq!(
        segments,
        vec![
            (TraceAction::Dispatch, SimTime(0)),
            (TraceAction::Expire, SimTime(4)),
            (TraceAction::Dispatch, SimTime(4)),
            (TraceAction::Expire, SimTime(8)),
            (TraceAction::Dispatch, SimTime(8)),
            (TraceAction::Complete, SimTime(10)),
        ]
    );
    assert_eq!(report.summary.context_switch_count, 3);
    assert_eq!(completion_of(&report, 1), SimTime(10));
}

#[test]
fn engine_accessors_follow_each_step() {
    let mut engine = Engine::new(SchedConfig::fifo(1)).expect("config");
    engine.admit_all(&[JobSpec::any(1, 2), JobSpec::any(2, 3)]);
    assert_eq!(engine.config().order, QueueOrder::Fifo);
    assert_eq!(engine.jobs().count(), 2);
    assert_eq!(engine.context_switches(), 0);

    // first step dispatches job 1, then pops its completion and dispatches job 2
    assert!(engine.step().expect("step"));
    assert_eq!(engine.now(), SimTime(2));
    assert_eq!(engine.completed(), &[JobId(1)]);
    assert_eq!(engine.context_switches(), 2);
    assert_eq!(engine.jobs().filter(|j| j.is_completed()).count(), 1);

    assert!(engine.step().expect("step"));
    assert_eq!(engine.completed(), &[JobId(1), JobId(2)]);
    assert!(!engine.step().expect("drained"));
}
