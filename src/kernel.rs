//! Embedding API.
//!
//! `init`/`fork`/`exec`/`wait`/`signal`/`end` are the only symbols an
//! embedder calls directly. All of them funnel through a process-wide
//! `OnceLock<Mutex<Option<Scheduler>>>` handle, kept as a singleton
//! rather than an instance the embedder threads through by hand, since
//! task handlers have signature `fn(priority)` and have no way to carry
//! a handle.

use std::sync::{Arc, Mutex, OnceLock};
use std::thread;

use crate::config::Config;
use crate::error::{fatal, SchedulerError};
use crate::scheduler::Scheduler;
use crate::task::{Handler, Task, TaskId, TaskStatus};
use crate::MAX_PRIO;

static HANDLE: OnceLock<Mutex<Option<Scheduler>>> = OnceLock::new();

fn handle() -> &'static Mutex<Option<Scheduler>> {
    HANDLE.get_or_init(|| Mutex::new(None))
}

/// Runs one scheduling point on behalf of whichever task is current:
/// charges it one virtual-time unit, invokes the decision function, and
/// returns that task so the caller can park it on its own gate. Returns
/// `None` when there was no current task (the very first `fork`, issued
/// from the initializing context rather than a running task).
fn scheduling_point(sched: &mut Scheduler) -> Option<Arc<Task>> {
    let caller = sched.current();
    if let Some(caller) = &caller {
        caller.consume_one();
    }
    sched.decide();
    caller
}

/// Initializes the scheduler. Must be called before any other function
/// in this module, and again only after a matching [`end`].
pub fn init(config: Config) -> Result<(), SchedulerError> {
    let mut guard = handle()
        .lock()
        .unwrap_or_else(|_| fatal!("scheduler mutex poisoned in init"));
    if guard.is_some() {
        return Err(SchedulerError::AlreadyInitialized);
    }
    let span = tracing::info_span!("init", quantum = config.quantum(), io_count = config.io_count());
    let _enter = span.enter();
    *guard = Some(Scheduler::new(config));
    tracing::info!("scheduler initialized");
    Ok(())
}

/// Creates a task running `handler(priority)` on its own OS thread, and
/// registers it with the scheduler. If no task is currently running,
/// dispatches it immediately; otherwise charges the calling task one
/// virtual-time unit as the cost of forking and parks it.
pub fn fork(priority: u32, handler: Handler) -> Result<TaskId, SchedulerError> {
    if priority > MAX_PRIO {
        return Err(SchedulerError::InvalidPriority {
            priority,
            max: MAX_PRIO,
        });
    }

    let mut guard = handle()
        .lock()
        .unwrap_or_else(|_| fatal!("scheduler mutex poisoned in fork"));
    let sched = guard.as_mut().ok_or(SchedulerError::NotInitialized)?;

    let span = tracing::info_span!("fork", priority);
    let _enter = span.enter();

    let task = Arc::new(Task::new(priority, sched.config().quantum(), handler));
    sched.admit(Arc::clone(&task));

    let spawned = Arc::clone(&task);
    let join = thread::Builder::new()
        .spawn(move || task_bootstrap(spawned))
        .unwrap_or_else(|_| fatal!("failed to spawn task thread"));
    task.bind_thread(join);
    let id = task
        .id()
        .unwrap_or_else(|| fatal!("task id missing immediately after bind_thread"));
    tracing::trace!(task = %id, "forked");

    let parked = scheduling_point(sched);
    drop(guard);
    if let Some(parked) = parked {
        parked.gate.wait();
    }

    Ok(id)
}

/// Charges the calling task one virtual-time unit and invokes the
/// decision function, then parks the calling task on its own gate until
/// it is scheduled again.
pub fn exec() -> Result<(), SchedulerError> {
    let parked = {
        let mut guard = handle()
            .lock()
            .unwrap_or_else(|_| fatal!("scheduler mutex poisoned in exec"));
        let sched = guard.as_mut().ok_or(SchedulerError::NotInitialized)?;
        scheduling_point(sched)
    };
    if let Some(parked) = parked {
        parked.gate.wait();
    }
    Ok(())
}

/// Marks the calling task WAITING on I/O device `io`, then behaves like
/// [`exec`] (the wait instruction still costs one virtual-time unit).
pub fn wait(io: usize) -> Result<(), SchedulerError> {
    let parked = {
        let mut guard = handle()
            .lock()
            .unwrap_or_else(|_| fatal!("scheduler mutex poisoned in wait"));
        let sched = guard.as_mut().ok_or(SchedulerError::NotInitialized)?;
        if io >= sched.config().io_count() {
            return Err(SchedulerError::InvalidIoDevice {
                io,
                io_count: sched.config().io_count(),
            });
        }
        let current = sched.current().ok_or(SchedulerError::NotInitialized)?;
        current.set_waiting(io);
        scheduling_point(sched)
    };
    if let Some(parked) = parked {
        parked.gate.wait();
    }
    Ok(())
}

/// Wakes every task WAITING on I/O device `io`, returning the number
/// moved from WAITING to READY, then behaves like [`exec`] on behalf of
/// the signaling task.
pub fn signal(io: usize) -> Result<usize, SchedulerError> {
    let (count, parked) = {
        let mut guard = handle()
            .lock()
            .unwrap_or_else(|_| fatal!("scheduler mutex poisoned in signal"));
        let sched = guard.as_mut().ok_or(SchedulerError::NotInitialized)?;
        if io >= sched.config().io_count() {
            return Err(SchedulerError::InvalidIoDevice {
                io,
                io_count: sched.config().io_count(),
            });
        }
        let waiters = sched.waiting_on(io);
        let count = waiters.len();
        sched.wake_waiters(&waiters);
        tracing::trace!(io, woken = count, "signal");
        let parked = scheduling_point(sched);
        (count, parked)
    };
    if let Some(parked) = parked {
        parked.gate.wait();
    }
    Ok(count)
}

/// Blocks until every forked task has terminated, joins their OS
/// threads, and clears the global scheduler. Safe to call again after a
/// fresh [`init`]; calling it twice without an intervening `init`
/// returns [`SchedulerError::NotInitialized`] rather than panicking.
pub fn end() -> Result<(), SchedulerError> {
    let span = tracing::info_span!("end");
    let _enter = span.enter();

    let (completion_gate, any_forked, roster) = {
        let guard = handle()
            .lock()
            .unwrap_or_else(|_| fatal!("scheduler mutex poisoned in end"));
        let sched = guard.as_ref().ok_or(SchedulerError::NotInitialized)?;
        (
            sched.completion_gate(),
            sched.any_forked(),
            sched.roster().to_vec(),
        )
    };

    if any_forked {
        completion_gate.wait();
    }
    for task in &roster {
        task.join();
    }

    let mut guard = handle()
        .lock()
        .unwrap_or_else(|_| fatal!("scheduler mutex poisoned in end"));
    *guard = None;
    tracing::info!("scheduler ended");
    Ok(())
}

/// The body every forked OS thread runs. Parks until the scheduler
/// dispatches it, runs the task's handler exactly once, then marks
/// itself TERMINATED and hands control back to the decision function
/// without parking again — the thread simply returns and is later
/// joined by [`end`].
fn task_bootstrap(task: Arc<Task>) {
    task.gate.wait();

    let handler = task
        .take_handler()
        .unwrap_or_else(|| fatal!("task dispatched with no handler"));
    handler(task.priority);

    task.set_status(TaskStatus::Terminated);
    tracing::trace!(task = %task.id().map(|id| id.to_string()).unwrap_or_default(), "terminated");

    let mut guard = handle()
        .lock()
        .unwrap_or_else(|_| fatal!("scheduler mutex poisoned in task_bootstrap"));
    if let Some(sched) = guard.as_mut() {
        sched.decide();
    }
}
