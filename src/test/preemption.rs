use super::run_jobs;
use crate::sched::{
    ArrivalMode, ClassRequirement, ClassSpec, Engine, JobId, JobState, QueueOrder, SchedConfig,
    SimError, UnitId,
};
use crate::sim::{JobSpec, SimTime};
use crate::stats::SimReport;
use crate::trace::{TraceAction, TraceEvent};

/// 两个 B 类单元（u0、u1），没有 A 类单元
fn fast_pair() -> SchedConfig {
    SchedConfig {
        class_a: ClassSpec::new(0, 2),
        class_b: ClassSpec::new(2, 1),
        migration: false,
        ..SchedConfig::sjf_dynamic(0, 2)
    }
}

fn b_only(id: u64, work: i64) -> JobSpec {
    JobSpec::new(id, work, ClassRequirement::BOnly)
}

fn preemptions(report: &SimReport) -> Vec<&TraceEvent> {
    report
        .trace
        .iter()
        .filter(|e| e.action == TraceAction::Preempt)
        .collect()
}

fn completion(report: &SimReport, id: u64) -> SimTime {
    report
        .record(JobId(id))
        .map(|r| r.completion_time)
        .expect("job completed")
}

#[test]
fn flexible_victim_beats_job_with_more_remaining_work() {
    let report = run_jobs(
        fast_pair(),
        &[
            b_only(1, 20),
            JobSpec::any(2, 5),
            b_only(3, 3).arriving_at(1),
        ],
    );

    let p = preemptions(&report);
    assert_eq!(p.len(), 1);
    assert_eq!((p[0].job, p[0].unit, p[0].t), (JobId(2), UnitId(1), SimTime(1)));
    assert_eq!(completion(&report, 3), SimTime(4));
    // 4 units left after running 1 of 5, resumed at t=4
    assert_eq!(completion(&report, 2), SimTime(8));
    assert_eq!(completion(&report, 1), SimTime(20));
}

#[test]
fn victim_with_largest_projected_remaining_work_is_chosen() {
    let report = run_jobs(
        fast_pair(),
        &[b_only(1, 20), b_only(2, 30), b_only(3, 5).arriving_at(2)],
    );

    let p = preemptions(&report);
    assert_eq!(p.len(), 1);
    assert_eq!((p[0].job, p[0].unit), (JobId(2), UnitId(1)));
    assert_eq!(completion(&report, 3), SimTime(7));
    assert_eq!(completion(&report, 1), SimTime(20));
    assert_eq!(completion(&report, 2), SimTime(7 + 28));
}

#[test]
fn equal_projected_work_breaks_tie_on_lowest_unit() {
    let report = run_jobs(
        fast_pair(),
        &[b_only(1, 20), b_only(2, 20), b_only(3, 5).arriving_at(2)],
    );

    let p = preemptions(&report);
    assert_eq!(p.len(), 1);
    assert_eq!((p[0].job, p[0].unit), (JobId(1), UnitId(0)));
    assert_eq!(completion(&report, 3), SimTime(7));
    assert_eq!(completion(&report, 2), SimTime(20));
    assert_eq!(completion(&report, 1), SimTime(25));
}

#[test]
fn flexible_arrival_never_displaces_b_only_job() {
    let cfg = SchedConfig {
        class_b: ClassSpec::new(1, 1),
        ..fast_pair()
    };
    let report = run_jobs(cfg, &[b_only(1, 20), JobSpec::any(2, 2).arriving_at(1)]);

    assert!(preemptions(&report).is_empty());
    assert_eq!(completion(&report, 2), SimTime(22));
}

#[test]
fn flexible_arrival_displaces_longest_flexible_job_on_any_class() {
    let cfg = SchedConfig {
        class_a: ClassSpec::new(1, 2),
        class_b: ClassSpec::new(1, 1),
        migration: false,
        ..SchedConfig::sjf_dynamic(1, 1)
    };
    // job 1 takes the fast unit u1, job 2 the slow unit u0
    let report = run_jobs(
        cfg,
        &[
            JobSpec::any(1, 20),
            JobSpec::any(2, 30),
            JobSpec::any(3, 4).arriving_at(2),
        ],
    );

    // projected at t=2: job 2 = 30 - 2/2 = 29, job 1 = 20 - 2 = 18
    let p = preemptions(&report);
    assert_eq!(p.len(), 1);
    assert_eq!((p[0].job, p[0].unit), (JobId(2), UnitId(0)));
    assert_eq!(completion(&report, 3), SimTime(2 + 4 * 2));
    assert_eq!(completion(&report, 1), SimTime(20));
    assert_eq!(completion(&report, 2), SimTime(10 + 29 * 2));
}

#[test]
fn arrival_no_longer_than_running_job_waits() {
    let cfg = SchedConfig {
        arrivals: ArrivalMode::Dynamic,
        preemption: crate::sched::PreemptionMode::OnArrival,
        ..SchedConfig::sjf(1)
    };
    let report = run_jobs(cfg, &[JobSpec::any(1, 10), JobSpec::any(2, 7).arriving_at(3)]);

    // projected 7 is not strictly greater than 7
    assert!(preemptions(&report).is_empty());
    assert_eq!(completion(&report, 2), SimTime(17));
}

#[test]
fn fifo_order_never_preempts() {
    let cfg = SchedConfig {
        order: QueueOrder::Fifo,
        ..fast_pair()
    };
    let jobs = [b_only(1, 20), b_only(2, 20), b_only(3, 1).arriving_at(2)];
    let mut engine = Engine::new(cfg).expect("config");
    engine.admit_all(&jobs);
    for _ in 0..3 {
        assert!(engine.step().expect("step"));
    }
    assert_eq!(engine.now(), SimTime(2));
    assert_eq!(engine.select_victim(JobId(3)).expect("select"), None);

    let report = engine.run().expect("run");
    assert!(preemptions(&report).is_empty());
    assert_eq!(completion(&report, 3), SimTime(21));
}

#[test]
fn displacing_with_zero_projected_work_completes_the_job() {
    let mut engine = Engine::new(SchedConfig::sjf(1)).expect("config");
    engine.admit(&JobSpec::any(1, 5)).expect("admit");
    engine.dispatch().expect("dispatch");
    assert_eq!(engine.job(JobId(1)).map(|j| j.state), Some(JobState::Running(UnitId(0))));

    engine.displace(UnitId(0), 0).expect("displace");

    let job = engine.job(JobId(1)).expect("job");
    assert_eq!(job.state, JobState::Completed);
    assert_eq!(job.remaining, 0);
    assert_eq!(job.completion, Some(SimTime::ZERO));
    assert!(engine.pool().all_idle());
    assert_eq!(
        engine.trace().events.last().map(|e| e.action),
        Some(TraceAction::Complete)
    );
    assert!(engine.trace().jobs_with(TraceAction::Preempt).is_empty());

    let report = engine.run().expect("run");
    assert_eq!(report.records.len(), 1);
}

#[test]
fn negative_projected_work_is_a_fatal_invariant_breach() {
    let cfg = SchedConfig {
        arrivals: ArrivalMode::Dynamic,
        ..SchedConfig::sjf(2)
    };
    let mut engine = Engine::new(cfg).expect("config");
    engine.admit_all(&[JobSpec::any(1, 10), JobSpec::any(2, 1).arriving_at(8)]);
    assert!(engine.step().expect("arrival 1"));
    assert!(engine.step().expect("arrival 2"));
    assert_eq!(engine.now(), SimTime(8));

    // corrupt the accounting: 8 units have already run
    engine.jobs.get_mut(&JobId(1)).expect("job 1").remaining = 3;
    let unit = engine.pool().unit(UnitId(0)).expect("unit").clone();
    let binding = *unit.binding().expect("bound");
    let err = engine
        .projected_remaining(&unit, &binding)
        .expect_err("must not clamp");
    assert!(matches!(err, SimError::Invariant { at: SimTime(8), .. }));
}
