//! 仿真核心模块
//!
//! 此模块包含离散事件仿真的基础组件：仿真时间、事件、事件时间线以及工作负载描述。

// 子模块声明
mod event;
mod scheduled_event;
mod time;
mod timeline;
mod workload;

// 重新导出公共接口
pub use event::Event;
pub use scheduled_event::ScheduledEvent;
pub use time::SimTime;
pub use timeline::Timeline;
pub use workload::{JobSpec, WorkloadSpec};
