//! Minimal end-to-end usage: a coordinator forks a worker that waits on
//! an I/O device and a notifier that signals it.
//!
//! The coordinator (priority 0) forks the worker before the notifier so
//! the worker has already reached `wait(0)` by the time the notifier
//! runs — both forked children outrank the coordinator, so each fork
//! immediately preempts it and only hands control back once the child
//! either blocks or terminates.

use std::sync::{Arc, Mutex};

use cothread::Config;

fn main() {
    tracing_subscriber::fmt::init();

    let trace = Arc::new(Mutex::new(Vec::new()));

    cothread::init(Config::new(2, 1).expect("valid config")).expect("init");

    let coordinator_trace = Arc::clone(&trace);
    cothread::fork(
        0,
        Box::new(move |_priority| {
            let worker_trace = Arc::clone(&coordinator_trace);
            cothread::fork(
                1,
                Box::new(move |priority| {
                    worker_trace.lock().unwrap().push(format!("worker[{priority}] waiting"));
                    cothread::wait(0).expect("device 0 exists");
                    worker_trace.lock().unwrap().push(format!("worker[{priority}] resumed"));
                }),
            )
            .expect("fork worker");

            let notifier_trace = Arc::clone(&coordinator_trace);
            cothread::fork(
                2,
                Box::new(move |priority| {
                    let woken = cothread::signal(0).expect("device 0 exists");
                    notifier_trace
                        .lock()
                        .unwrap()
                        .push(format!("notifier[{priority}] woke {woken} task(s)"));
                }),
            )
            .expect("fork notifier");
        }),
    )
    .expect("fork coordinator");

    cothread::end().expect("end");

    for line in trace.lock().unwrap().iter() {
        println!("{line}");
    }
}
