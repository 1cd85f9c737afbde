//! 仿真时间类型
//!
//! 仿真时间是一个逻辑标量（以 work unit 计），与真实耗时无关。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 仿真时间（逻辑时间单位）。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SimTime(pub u64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0);

    /// `self + d`，溢出时返回 None
    pub fn checked_add(self, d: u64) -> Option<SimTime> {
        self.0.checked_add(d).map(SimTime)
    }

    /// 从 `earlier` 到 `self` 经过的时间；`earlier` 在之后则为 0
    pub fn since(self, earlier: SimTime) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
