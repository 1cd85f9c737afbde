//! Shortest-remaining-work queue.
//!
//! Orders jobs by `(remaining work, job id)`. A pending job's remaining work
//! does not change while it waits, so the key is fixed at enqueue time.

use std::collections::BTreeSet;

use crate::sched::JobId;

use super::PendingQueue;

#[derive(Debug, Default)]
pub struct ShortestRemainingQueue {
    q: BTreeSet<(u64, JobId)>,
}

impl PendingQueue for ShortestRemainingQueue {
    fn enqueue(&mut self, job: JobId, remaining: u64) {
        self.q.insert((remaining, job));
    }

    fn dequeue(&mut self) -> Option<JobId> {
        self.q.pop_first().map(|(_, job)| job)
    }

    fn snapshot(&self) -> Vec<JobId> {
        self.q.iter().map(|&(_, job)| job).collect()
    }

    fn len(&self) -> usize {
        self.q.len()
    }
}
