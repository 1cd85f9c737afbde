//! 调度决策轨迹（用于验证与调试）
//!
//! 设计目标：
//! - **结构化**：用 JSON 事件而不是解析文本日志
//! - **确定性**：相同输入与配置产生逐字节相同的轨迹

mod types;

pub use types::{TraceAction, TraceEvent, TraceLogger};
