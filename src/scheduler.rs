//! Scheduler core: the decision function.
//!
//! Invoked at every scheduling point — after a fork, inside every
//! `exec`/`wait`/`signal`, and on task termination. Computes the
//! highest-priority runnable task, compares it against whatever is
//! current, and mutates state accordingly: priority and quantum alone
//! determine what runs next.

use std::sync::Arc;

use crate::config::Config;
use crate::gate::Gate;
use crate::queue::Ready;
use crate::task::{Task, TaskStatus};

/// Process-wide scheduler state: the ready structure, the currently
/// running task (if any), and the completion gate `end` blocks on.
pub(crate) struct Scheduler {
    config: Config,
    ready: Ready,
    current: Option<Arc<Task>>,
    completion_gate: Arc<Gate>,
    any_forked: bool,
}

impl Scheduler {
    pub(crate) fn new(config: Config) -> Self {
        Self {
            config,
            ready: Ready::new(),
            current: None,
            completion_gate: Arc::new(Gate::new()),
            any_forked: false,
        }
    }

    pub(crate) fn config(&self) -> Config {
        self.config
    }

    pub(crate) fn completion_gate(&self) -> Arc<Gate> {
        Arc::clone(&self.completion_gate)
    }

    pub(crate) fn any_forked(&self) -> bool {
        self.any_forked
    }

    pub(crate) fn current(&self) -> Option<Arc<Task>> {
        self.current.clone()
    }

    /// Registers a freshly forked task in the roster and its ready queue.
    /// Does not touch `current` — the caller decides separately whether
    /// this is the first dispatch (`decide`) or an ordinary fork from a
    /// running task (`exec`).
    pub(crate) fn admit(&mut self, task: Arc<Task>) {
        self.ready.register(task.clone());
        self.ready.enqueue(task);
        self.any_forked = true;
    }

    pub(crate) fn waiting_on(&self, io: usize) -> Vec<Arc<Task>> {
        self.ready.waiting_on(io)
    }

    pub(crate) fn wake_waiters(&mut self, waiters: &[Arc<Task>]) {
        for task in waiters {
            task.clear_device();
            self.ready.enqueue(task.clone());
        }
    }

    pub(crate) fn roster(&self) -> &[Arc<Task>] {
        self.ready.roster()
    }

    /// The decision function: picks exactly one of {continue current,
    /// preempt with next, park current and run next, signal global
    /// completion}.
    pub(crate) fn decide(&mut self) {
        let next = self.ready.peek_highest();

        let Some(current) = self.current.clone() else {
            // Case A: no current task yet — dispatch the first one.
            if let Some(next) = next {
                self.ready.pop_highest();
                self.current = Some(next.clone());
                self.wake(&next);
                tracing::trace!(target: "sched::decide", task = %next.id().map(|id| id.to_string()).unwrap_or_default(), "dispatch");
            }
            return;
        };

        match current.status() {
            TaskStatus::Terminated | TaskStatus::Waiting => {
                // Case B: current is done or blocked.
                if let Some(next) = next {
                    self.ready.pop_highest();
                    self.current = Some(next.clone());
                    self.wake(&next);
                    tracing::trace!(target: "sched::decide", task = %next.id().map(|id| id.to_string()).unwrap_or_default(), "dispatch");
                } else {
                    self.current = None;
                    self.completion_gate.post();
                    tracing::trace!(target: "sched::decide", "complete");
                }
            }
            TaskStatus::Running => {
                // Case C: current is still runnable.
                match next {
                    None => self.continue_current(&current),
                    Some(next) => {
                        let preempt = next.priority > current.priority
                            || (next.priority == current.priority && current.remaining() == 0);
                        if preempt {
                            self.ready.pop_highest();
                            current.refill(self.config.quantum);
                            self.ready.enqueue(current);
                            self.current = Some(next.clone());
                            self.wake(&next);
                            tracing::trace!(target: "sched::decide", "preempt");
                        } else {
                            self.continue_current(&current);
                        }
                    }
                }
            }
            TaskStatus::New | TaskStatus::Ready => {
                // Current is never observed in these states between
                // scheduling points; nothing to do if it somehow is.
            }
        }
    }

    fn continue_current(&self, current: &Arc<Task>) {
        if current.remaining() == 0 {
            current.refill(self.config.quantum);
        }
        self.wake(current);
        tracing::trace!(target: "sched::decide", "continue");
    }

    fn wake(&self, task: &Arc<Task>) {
        task.set_status(TaskStatus::Running);
        task.gate.post();
    }
}
