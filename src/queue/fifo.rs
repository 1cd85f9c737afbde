//! FIFO 队列
//!
//! 按入队顺序出队；被时间片打断的作业重新排到队尾。

use std::collections::VecDeque;

use crate::sched::JobId;

use super::PendingQueue;

#[derive(Debug, Default)]
pub struct FifoQueue {
    q: VecDeque<JobId>,
}

impl PendingQueue for FifoQueue {
    fn enqueue(&mut self, job: JobId, _remaining: u64) {
        self.q.push_back(job);
    }

    fn dequeue(&mut self) -> Option<JobId> {
        self.q.pop_front()
    }

    fn snapshot(&self) -> Vec<JobId> {
        self.q.iter().copied().collect()
    }

    fn len(&self) -> usize {
        self.q.len()
    }
}
