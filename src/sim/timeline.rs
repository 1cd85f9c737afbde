//! 事件时间线
//!
//! 维护当前仿真时间与未来事件的最小堆。时钟只会推进到被弹出事件的时间戳。

use super::event::Event;
use super::scheduled_event::ScheduledEvent;
use super::time::SimTime;
use std::collections::{BTreeSet, BinaryHeap};
use tracing::{debug, trace};

/// 事件时间线：维护当前时间与事件队列。
///
/// 取消采用惰性删除：被取消的事件仍留在堆里，弹出时跳过。
#[derive(Debug, Default)]
pub struct Timeline {
    now: SimTime,
    next_seq: u64,
    q: BinaryHeap<ScheduledEvent>,
    /// 仍有效（未弹出、未取消）的事件序列号
    live: BTreeSet<u64>,
}

impl Timeline {
    /// 获取当前仿真时间
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// 调度事件在指定时间执行，返回可用于 [`Timeline::cancel`] 的序列号
    pub fn schedule(&mut self, at: SimTime, ev: Event) -> u64 {
        let seq = self.next_seq;
        trace!(now = %self.now, at = %at, seq, ?ev, "调度事件");

        self.next_seq = self.next_seq.wrapping_add(1);
        self.q.push(ScheduledEvent { at, seq, ev });
        self.live.insert(seq);

        debug!(queue_size = self.live.len(), "事件已加入队列");
        seq
    }

    /// 取消一个尚未弹出的事件。返回 false 表示该事件已弹出或从未存在。
    pub fn cancel(&mut self, seq: u64) -> bool {
        let removed = self.live.remove(&seq);
        if removed {
            trace!(seq, "取消事件");
        }
        removed
    }

    /// 弹出最早的有效事件并把时钟推进到它的时间戳。
    pub fn pop_earliest(&mut self) -> Option<ScheduledEvent> {
        while let Some(item) = self.q.pop() {
            if !self.live.remove(&item.seq) {
                continue;
            }
            self.now = self.now.max(item.at);
            return Some(item);
        }
        None
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}
