//! 等待队列（Pending queues）
//!
//! 每个资源类别一条等待队列；排序策略可插拔：到达顺序（FIFO）或剩余工作最短优先（SJF）。

use crate::sched::{JobId, QueueOrder};

mod fifo;
mod shortest;

pub use fifo::FifoQueue;
pub use shortest::ShortestRemainingQueue;

/// 等待中作业的队列抽象
pub trait PendingQueue: std::fmt::Debug {
    /// 入队：`remaining` 是作业此刻的剩余工作量
    fn enqueue(&mut self, job: JobId, remaining: u64);
    /// 出队：按队列策略返回优先级最高的作业
    fn dequeue(&mut self) -> Option<JobId>;
    /// 按出队顺序列出当前作业（用于快照）
    fn snapshot(&self) -> Vec<JobId>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 按配置构造队列
pub fn new_queue(order: QueueOrder) -> Box<dyn PendingQueue> {
    match order {
        QueueOrder::Fifo => Box::new(FifoQueue::default()),
        QueueOrder::ShortestRemaining => Box::new(ShortestRemainingQueue::default()),
    }
}
