//! Task record.
//!
//! A task is a control block — identity, priority, remaining quantum,
//! status, and the parking primitive — backed by a real OS thread rather
//! than a hand-rolled register save area.

use std::fmt;
use std::sync::{Mutex, MutexGuard, OnceLock};
use std::thread::{self, JoinHandle};

use crate::error::fatal;
use crate::gate::Gate;

/// A boxed task body, run exactly once with the task's own priority.
pub type Handler = Box<dyn FnOnce(u32) + Send + 'static>;

/// Opaque task identity, wrapping the underlying OS thread's id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(thread::ThreadId);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

/// Lifecycle status of a task in the scheduler's state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TaskStatus {
    New,
    Ready,
    Running,
    Waiting,
    Terminated,
}

/// The fields the scheduler core mutates at every scheduling point.
/// Bundled behind one lock since they always change together and are
/// always accessed while the process-wide scheduler lock is already
/// held — this lock exists only to satisfy `Send + Sync`, not to protect
/// against real contention (invariant 3 guarantees there is none).
struct RuntimeState {
    remaining: u32,
    status: TaskStatus,
    device: Option<usize>,
}

/// A task record: identity, priority, remaining quantum, handler,
/// lifecycle status, I/O-wait device, and the gate used to park/resume
/// its OS thread.
pub(crate) struct Task {
    pub(crate) priority: u32,
    handler: Mutex<Option<Handler>>,
    pub(crate) gate: Gate,
    state: Mutex<RuntimeState>,
    id: OnceLock<TaskId>,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl Task {
    /// Builds a new task record. `remaining = quantum`, `status = NEW`,
    /// `device = None`, and the gate starts unposted.
    pub(crate) fn new(priority: u32, quantum: u32, handler: Handler) -> Self {
        Self {
            priority,
            handler: Mutex::new(Some(handler)),
            gate: Gate::new(),
            state: Mutex::new(RuntimeState {
                remaining: quantum,
                status: TaskStatus::New,
                device: None,
            }),
            id: OnceLock::new(),
            join: Mutex::new(None),
        }
    }

    /// Records the OS thread spawned for this task. Called once, right
    /// after `thread::Builder::spawn` succeeds.
    pub(crate) fn bind_thread(&self, handle: JoinHandle<()>) {
        let id = TaskId(handle.thread().id());
        // `fork` is the only caller and calls this exactly once per task.
        let _ = self.id.set(id);
        *self
            .join
            .lock()
            .unwrap_or_else(|_| fatal!("task join-handle mutex poisoned")) = Some(handle);
    }

    /// The task's id, once its OS thread has been spawned.
    pub(crate) fn id(&self) -> Option<TaskId> {
        self.id.get().copied()
    }

    /// Takes the handler out, leaving `None` behind. The bootstrap thread
    /// calls this exactly once, right after parking on its own gate for
    /// the first time.
    pub(crate) fn take_handler(&self) -> Option<Handler> {
        self.handler
            .lock()
            .unwrap_or_else(|_| fatal!("task handler mutex poisoned"))
            .take()
    }

    fn state(&self) -> MutexGuard<'_, RuntimeState> {
        self.state
            .lock()
            .unwrap_or_else(|_| fatal!("task state mutex poisoned"))
    }

    pub(crate) fn status(&self) -> TaskStatus {
        self.state().status
    }

    pub(crate) fn set_status(&self, status: TaskStatus) {
        self.state().status = status;
    }

    pub(crate) fn remaining(&self) -> u32 {
        self.state().remaining
    }

    /// Decrements the remaining quantum by one, as the cost of a
    /// scheduling point. Saturates at zero rather than wrapping.
    pub(crate) fn consume_one(&self) {
        let mut state = self.state();
        state.remaining = state.remaining.saturating_sub(1);
    }

    /// Re-arms the quantum to `quantum`.
    pub(crate) fn refill(&self, quantum: u32) {
        self.state().remaining = quantum;
    }

    /// Marks the task WAITING on the given I/O device.
    pub(crate) fn set_waiting(&self, io: usize) {
        let mut state = self.state();
        state.status = TaskStatus::Waiting;
        state.device = Some(io);
    }

    /// `true` if the task is WAITING on exactly this I/O device.
    pub(crate) fn is_waiting_on(&self, io: usize) -> bool {
        let state = self.state();
        state.status == TaskStatus::Waiting && state.device == Some(io)
    }

    /// Clears the I/O device a task was waiting on. Called by `signal`
    /// just before the task is re-enqueued (which sets status READY).
    pub(crate) fn clear_device(&self) {
        self.state().device = None;
    }

    /// Joins the task's OS thread. Called exactly once, from `end`, for
    /// every task in the roster.
    pub(crate) fn join(&self) {
        let handle = self
            .join
            .lock()
            .unwrap_or_else(|_| fatal!("task join-handle mutex poisoned"))
            .take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                fatal!("task thread panicked instead of returning");
            }
        }
    }
}
