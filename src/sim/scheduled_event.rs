//! 调度事件
//!
//! 定义调度事件结构及其优先级比较。

use super::event::Event;
use super::time::SimTime;
use std::cmp::Ordering;

/// 调度事件，包含执行时间、序列号和事件对象。
#[derive(Debug, Clone)]
pub struct ScheduledEvent {
    pub at: SimTime,
    pub seq: u64,
    pub ev: Event,
}

impl ScheduledEvent {
    /// 全序键：(时间, 事件类别, 作业 id, 序列号)
    fn key(&self) -> (SimTime, u8, u64, u64) {
        (self.at, self.ev.rank(), self.ev.job().0, self.seq)
    }
}

// BinaryHeap 是 max-heap；我们需要最小键优先，因此反向比较。
impl Ord for ScheduledEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key()).reverse()
    }
}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ScheduledEvent {
    fn eq(&self, other: &Self) -> bool {
        self.at == other.at && self.seq == other.seq
    }
}

impl Eq for ScheduledEvent {}
