//! # cothread
//!
//! A cooperative, priority-preemptive thread scheduler built on real OS
//! threads.
//!
//! Each "task" is an ordinary OS thread that immediately parks itself; the
//! library's decision function decides, at every scheduling point, which
//! single task gets to run next, and reposts exactly that task's gate. The
//! result is deterministic priority scheduling with FIFO round-robin among
//! equal priorities, running on top of however many real threads the host
//! happens to have spawned.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     Embedder / task bodies                │
//! ├──────────────────────────────────────────────────────────┤
//! │              Embedding API (kernel.rs)                     │
//! │     init · fork · exec · wait · signal · end               │
//! ├───────────────┬────────────────────────┬──────────────────┤
//! │  Scheduler     │   Ready structure      │  Task record     │
//! │  scheduler.rs  │   queue.rs             │  task.rs         │
//! │  ─ decide()    │   ─ per-priority FIFO  │  ─ status/gate   │
//! ├───────────────┴────────────────────────┴──────────────────┤
//! │                     Gate (gate.rs)                          │
//! │          Mutex<bool> + Condvar binary semaphore             │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Scheduling policy
//!
//! - Strictly higher priority always preempts, regardless of quantum.
//! - Equal priority round-robins once the running task's quantum drains.
//! - Strictly lower priority never preempts.
//!
//! ## Concurrency model
//!
//! At most one task is ever unparked at a time: every scheduling point
//! parks the calling task immediately after asking the decision function
//! what happens next, and the decision function posts exactly one gate per
//! invocation (none, on the final termination). This is a correctness
//! invariant, not an optimization — see [`fork`], [`exec`], [`wait`], and
//! [`signal`].

mod config;
mod error;
mod gate;
mod kernel;
mod queue;
mod scheduler;
mod task;

/// Number of priority levels is `MAX_PRIO + 1`; valid task priorities are
/// `0..=MAX_PRIO`.
pub const MAX_PRIO: u32 = 5;

/// Maximum number of I/O devices a [`Config`] may declare.
pub const MAX_EVENTS: usize = 256;

pub use config::Config;
pub use error::SchedulerError;
pub use kernel::{end, exec, fork, init, signal, wait};
pub use task::{Handler, TaskId};
