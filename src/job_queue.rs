use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};

use tracing::debug;

pub const JOB_QUEUE_CAPACITY: usize = 128;

/// Bounded FIFO between the shell and the rendering workers. Duplicate jobs
/// and jobs beyond the capacity are dropped; `remove` blocks until a job
/// arrives or the queue is closed.
pub struct JobQueue<T> {
    state: Mutex<QueueState<T>>,
    not_empty: Condvar,
}

struct QueueState<T> {
    jobs: VecDeque<T>,
    closed: bool,
}

impl<T: PartialEq> JobQueue<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                jobs: VecDeque::new(),
                closed: false,
            }),
            not_empty: Condvar::new(),
        }
    }

    pub fn add(&self, job: T) {
        let Ok(mut state) = self.state.lock() else {
            return;
        };
        if state.closed || state.jobs.len() >= JOB_QUEUE_CAPACITY {
            debug!("job queue full, dropping job");
            return;
        }
        if state.jobs.contains(&job) {
            return;
        }
        state.jobs.push_back(job);
        self.not_empty.notify_one();
    }

    /// Blocks until a job is available. Returns `None` once the queue has
    /// been closed and drained.
    pub fn remove(&self) -> Option<T> {
        let mut state = self.state.lock().ok()?;
        loop {
            if let Some(job) = state.jobs.pop_front() {
                return Some(job);
            }
            if state.closed {
                return None;
            }
            state = self.not_empty.wait(state).ok()?;
        }
    }

    pub fn clear(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.jobs.clear();
        }
    }

    /// Closes the queue; blocked consumers wake up and drain the remainder.
    pub fn close(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.closed = true;
        }
        self.not_empty.notify_all();
    }

    pub fn len(&self) -> usize {
        self.state.lock().map(|state| state.jobs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: PartialEq> Default for JobQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicates_are_dropped() {
        let queue = JobQueue::new();
        queue.add(7);
        queue.add(7);
        queue.add(8);
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn close_drains_then_returns_none() {
        let queue = JobQueue::new();
        queue.add(1);
        queue.close();
        assert_eq!(queue.remove(), Some(1));
        assert_eq!(queue.remove(), None);
    }

    #[test]
    fn closed_queue_rejects_jobs() {
        let queue = JobQueue::new();
        queue.close();
        queue.add(1);
        assert!(queue.is_empty());
    }
}
