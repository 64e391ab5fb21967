//! Ready structure: per-priority FIFO queues plus the task roster.
//!
//! `MAX_PRIO + 1` independent FIFOs, one per priority, each backed by a
//! `VecDeque` rather than a pointer-chased linked list — only FIFO
//! semantics and O(1) head/tail are required, not a particular
//! allocation strategy.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::task::{Task, TaskStatus};
use crate::MAX_PRIO;

const PRIORITY_LEVELS: usize = MAX_PRIO as usize + 1;

/// The roster of every task ever created, plus the per-priority ready
/// queues. The roster owns tasks; queues hold clones of the same `Arc`,
/// never independent state — removing a task from a queue never frees
/// it. Only the roster sweep in `end` frees task memory.
pub(crate) struct Ready {
    queues: [VecDeque<Arc<Task>>; PRIORITY_LEVELS],
    roster: Vec<Arc<Task>>,
}

impl Ready {
    pub(crate) fn new() -> Self {
        Self {
            queues: std::array::from_fn(|_| VecDeque::new()),
            roster: Vec::new(),
        }
    }

    /// Appends `task` to the roster. Does not enqueue it.
    pub(crate) fn register(&mut self, task: Arc<Task>) {
        self.roster.push(task);
    }

    /// Appends `task` to its priority queue and marks it READY.
    pub(crate) fn enqueue(&mut self, task: Arc<Task>) {
        task.set_status(TaskStatus::Ready);
        self.queues[task.priority as usize].push_back(task);
    }

    /// Returns the head of the highest non-empty priority queue, without
    /// removing it.
    pub(crate) fn peek_highest(&self) -> Option<Arc<Task>> {
        self.queues.iter().rev().find_map(|q| q.front().cloned())
    }

    /// Removes and returns the head of the highest non-empty priority
    /// queue.
    pub(crate) fn pop_highest(&mut self) -> Option<Arc<Task>> {
        self.queues.iter_mut().rev().find_map(|q| q.pop_front())
    }

    /// Every task registered so far, waiting on `io`.
    pub(crate) fn waiting_on(&self, io: usize) -> Vec<Arc<Task>> {
        self.roster
            .iter()
            .filter(|task| task.is_waiting_on(io))
            .cloned()
            .collect()
    }

    pub(crate) fn roster(&self) -> &[Arc<Task>] {
        &self.roster
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(priority: u32) -> Arc<Task> {
        Arc::new(Task::new(priority, 1, Box::new(|_| {})))
    }

    #[test]
    fn fifo_within_a_priority() {
        let mut ready = Ready::new();
        let a = task(1);
        let b = task(1);
        ready.enqueue(a.clone());
        ready.enqueue(b.clone());

        assert!(Arc::ptr_eq(&ready.pop_highest().unwrap(), &a));
        assert!(Arc::ptr_eq(&ready.pop_highest().unwrap(), &b));
        assert!(ready.pop_highest().is_none());
    }

    #[test]
    fn higher_priority_wins_regardless_of_order() {
        let mut ready = Ready::new();
        let low = task(0);
        let high = task(MAX_PRIO);
        ready.enqueue(low.clone());
        ready.enqueue(high.clone());

        assert!(Arc::ptr_eq(&ready.pop_highest().unwrap(), &high));
        assert!(Arc::ptr_eq(&ready.pop_highest().unwrap(), &low));
    }

    #[test]
    fn peek_does_not_remove() {
        let mut ready = Ready::new();
        let t = task(3);
        ready.enqueue(t.clone());

        assert!(Arc::ptr_eq(&ready.peek_highest().unwrap(), &t));
        assert!(Arc::ptr_eq(&ready.peek_highest().unwrap(), &t));
        assert!(Arc::ptr_eq(&ready.pop_highest().unwrap(), &t));
    }

    #[test]
    fn waiting_on_filters_by_device_and_status() {
        let mut ready = Ready::new();
        let waiting = task(0);
        waiting.set_waiting(2);
        let ready_task = task(0);
        ready.register(waiting.clone());
        ready.register(ready_task.clone());
        ready.enqueue(ready_task);

        let found = ready.waiting_on(2);
        assert_eq!(found.len(), 1);
        assert!(Arc::ptr_eq(&found[0], &waiting));
        assert!(ready.waiting_on(5).is_empty());
    }
}
