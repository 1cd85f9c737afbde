//! 调度引擎
//!
//! 单元池、作业、配置与离散事件驱动的派发/抢占/迁移逻辑。

mod config;
mod dispatch;
mod engine;
mod error;
mod id;
mod job;
mod migrate;
mod pool;
mod preempt;

pub use config::{ArrivalMode, ClassSpec, PreemptionMode, QueueOrder, SchedConfig};
pub use engine::Engine;
pub use error::{AdmissionError, ConfigError, SimError, StallSnapshot, UnitSnapshot};
pub use id::{JobId, UnitId};
pub use job::{ClassLimits, ClassRequirement, Job, JobState, ResourceClass};
pub use pool::{Binding, PoolFault, Unit, UnitPool, UnitState};
pub use preempt::Candidate;
