//! Binary gate: the per-task (and per-scheduler) parking primitive.
//!
//! A `Gate` is a binary semaphore initialized to "not posted". `wait`
//! blocks the calling OS thread until some other thread `post`s the gate,
//! consuming the post in the process — the usual `sem_wait`/`sem_post`
//! pair, built on `Condvar` + `Mutex<bool>` instead of a kernel semaphore
//! object, since the embedder links this as an ordinary Rust dependency
//! rather than linking against libc directly.

use std::sync::{Condvar, Mutex};

use crate::error::fatal;

pub(crate) struct Gate {
    posted: Mutex<bool>,
    condvar: Condvar,
}

impl Gate {
    /// A gate initialized to 0 (not posted).
    pub(crate) fn new() -> Self {
        Self {
            posted: Mutex::new(false),
            condvar: Condvar::new(),
        }
    }

    /// Posts the gate once, waking at most one parked waiter.
    pub(crate) fn post(&self) {
        let mut posted = self
            .posted
            .lock()
            .unwrap_or_else(|_| fatal!("gate mutex poisoned in post"));
        *posted = true;
        self.condvar.notify_one();
    }

    /// Blocks until the gate is posted, then consumes the post.
    pub(crate) fn wait(&self) {
        let mut posted = self
            .posted
            .lock()
            .unwrap_or_else(|_| fatal!("gate mutex poisoned in wait"));
        while !*posted {
            posted = self
                .condvar
                .wait(posted)
                .unwrap_or_else(|_| fatal!("gate condvar poisoned in wait"));
        }
        *posted = false;
    }
}
