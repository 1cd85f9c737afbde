//! 作业调度仿真
//!
//! 读取 workload.json，按所选策略运行调度引擎，输出每个作业的结果与汇总指标。

use clap::{Parser, ValueEnum};
use jobsim_rs::sched::{ClassSpec, Engine, PreemptionMode, SchedConfig};
use jobsim_rs::sim::WorkloadSpec;
use jobsim_rs::stats::SimReport;
use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

const DEFAULT_QUANTUM: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Policy {
    /// 单类别，先来先服务
    Fifo,
    /// 单类别，时间片轮转
    Rr,
    /// 单类别，最短作业优先
    Sjf,
    /// 快慢两类单元，不区分内存需求
    Hetero,
    /// 按内存需求分区，所有作业 t=0 到达
    Partitioned,
    /// 按内存需求分区，动态到达 + 抢占
    Dynamic,
}

#[derive(Debug, Parser)]
#[command(name = "sched-sim", about = "Simulate job scheduling on a heterogeneous unit pool")]
struct Args {
    /// Path to workload.json
    #[arg(long)]
    workload: PathBuf,

    /// Scheduling policy preset; fields in the workload's config block override it
    #[arg(long, value_enum, default_value_t = Policy::Dynamic)]
    policy: Policy,

    /// Unit count for single-class policies (fifo, rr, sjf)
    #[arg(long, default_value_t = 6)]
    units: usize,

    /// Override number of slow (class A) units
    #[arg(long)]
    class_a_units: Option<usize>,

    /// Override number of fast (class B) units
    #[arg(long)]
    class_b_units: Option<usize>,

    /// Override how many times slower a class A unit is
    #[arg(long)]
    slow_factor: Option<u64>,

    /// Round robin quantum in work units
    #[arg(long)]
    quantum: Option<u64>,

    /// Disable opportunistic migration to freed fast units
    #[arg(long)]
    no_migration: bool,

    /// Divide reported averages by this factor (e.g. 4e9 for seconds at 4 GHz)
    #[arg(long, default_value_t = 1.0)]
    time_scale: f64,

    /// Print one line per completed job
    #[arg(long)]
    records: bool,

    /// Write the full report (records, summary, rejections) as JSON
    #[arg(long)]
    report_json: Option<PathBuf>,

    /// Write the decision trace as JSON
    #[arg(long)]
    trace_json: Option<PathBuf>,
}

fn preset(args: &Args) -> SchedConfig {
    let slow = 3;
    let fast = 3;
    match args.policy {
        Policy::Fifo => SchedConfig::fifo(args.units),
        Policy::Rr => SchedConfig::round_robin(args.units, args.quantum.unwrap_or(DEFAULT_QUANTUM)),
        Policy::Sjf => SchedConfig::sjf(args.units),
        Policy::Hetero => SchedConfig::sjf_heterogeneous(slow, fast),
        Policy::Partitioned => SchedConfig::sjf_partitioned(slow, fast),
        Policy::Dynamic => SchedConfig::sjf_dynamic(slow, fast),
    }
}

/// 预设 → workload 中的 config → 命令行覆盖
fn resolve_config(args: &Args, workload: &WorkloadSpec) -> Result<SchedConfig, serde_json::Error> {
    let mut cfg = match &workload.config {
        Some(block) => preset(args).overlay(block)?,
        None => preset(args),
    };
    if let Some(units) = args.class_a_units {
        cfg.class_a = ClassSpec::new(units, cfg.class_a.speed);
    }
    if let Some(units) = args.class_b_units {
        cfg.class_b = ClassSpec::new(units, cfg.class_b.speed);
    }
    if let Some(factor) = args.slow_factor {
        cfg.class_a.speed = factor;
    }
    if let (PreemptionMode::Quantum { .. }, Some(quantum)) = (cfg.preemption, args.quantum) {
        cfg.preemption = PreemptionMode::Quantum { quantum };
    }
    if args.no_migration {
        cfg.migration = false;
    }
    Ok(cfg)
}

fn print_report(report: &SimReport, time_scale: f64, records: bool) {
    for rej in &report.rejected {
        println!("reject id={} reason=\"{}\"", rej.job(), rej);
    }
    if records {
        for r in &report.records {
            println!(
                "job id={} arrival={} start={} completion={} wait={} turnaround={}",
                r.id,
                r.arrival_time,
                r.start_time,
                r.completion_time,
                r.wait_time,
                r.turnaround_time
            );
        }
    }
    let s = &report.summary;
    println!(
        "summary completed={} rejected={} avg_wait={} avg_turnaround={} context_switches={} makespan={}",
        s.completed,
        s.rejected,
        s.average_wait_time / time_scale,
        s.average_turnaround_time / time_scale,
        s.context_switch_count,
        s.makespan
    );
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let raw = fs::read_to_string(&args.workload)
        .map_err(|e| format!("read {}: {e}", args.workload.display()))?;
    let workload: WorkloadSpec = serde_json::from_str(&raw)
        .map_err(|e| format!("parse {}: {e}", args.workload.display()))?;

    let cfg = resolve_config(&args, &workload)
        .map_err(|e| format!("config in {}: {e}", args.workload.display()))?;
    tracing::info!(?cfg, jobs = workload.jobs.len(), "配置已解析");

    let mut engine = Engine::new(cfg)?;
    engine.admit_all(&workload.jobs);
    let report = engine.run()?;

    print_report(&report, args.time_scale, args.records);

    if let Some(path) = args.report_json {
        let json = serde_json::to_string_pretty(&report)?;
        fs::write(&path, json)?;
        tracing::info!(path = %path.display(), "已写出报告");
    }
    if let Some(path) = args.trace_json {
        let json = serde_json::to_string_pretty(&report.trace)?;
        fs::write(&path, json)?;
        tracing::info!(path = %path.display(), events = report.trace.len(), "已写出决策轨迹");
    }
    Ok(())
}

fn main() -> ExitCode {
    // 日志走 stderr，stdout 只留结果
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();

    let args = Args::parse();
    if !(args.time_scale > 0.0) {
        eprintln!("error: --time-scale must be positive");
        return ExitCode::FAILURE;
    }
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
