//! Scheduling scenarios exercised against the public API with real OS
//! threads — dispatch, preemption, round-robin, fork avalanches, and
//! re-initialization.

use std::sync::{Arc, Mutex, MutexGuard};

use cothread::Config;

/// The scheduler is a process-wide singleton, so tests in this binary
/// cannot run concurrently against it. Every test takes this guard first
/// and holds it until it returns.
static SERIAL: Mutex<()> = Mutex::new(());

fn serialized() -> MutexGuard<'static, ()> {
    SERIAL.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn trace() -> Arc<Mutex<Vec<String>>> {
    Arc::new(Mutex::new(Vec::new()))
}

#[test]
fn single_task_end_to_end() {
    let _guard = serialized();

    let trace = trace();

    cothread::init(Config::new(2, 0).unwrap()).unwrap();

    let t = Arc::clone(&trace);
    cothread::fork(
        0,
        Box::new(move |_priority| {
            t.lock().unwrap().push("start".into());
            cothread::exec().unwrap();
            t.lock().unwrap().push("exec1".into());
            cothread::exec().unwrap();
            t.lock().unwrap().push("exec2".into());
            cothread::exec().unwrap();
            t.lock().unwrap().push("done".into());
        }),
    )
    .unwrap();

    cothread::end().unwrap();

    let trace = trace.lock().unwrap();
    assert_eq!(*trace, vec!["start", "exec1", "exec2", "done"]);
}

#[test]
fn priority_preemption() {
    let _guard = serialized();

    let trace = trace();

    cothread::init(Config::new(1, 0).unwrap()).unwrap();

    let l_trace = Arc::clone(&trace);
    cothread::fork(
        1,
        Box::new(move |_priority| {
            l_trace.lock().unwrap().push("L:start".into());
            cothread::exec().unwrap();
            l_trace.lock().unwrap().push("L:exec".into());

            let h_trace = Arc::clone(&l_trace);
            cothread::fork(
                3,
                Box::new(move |_priority| {
                    h_trace.lock().unwrap().push("H:start".into());
                    cothread::exec().unwrap();
                    h_trace.lock().unwrap().push("H:exec".into());
                }),
            )
            .unwrap();

            l_trace.lock().unwrap().push("L:done".into());
        }),
    )
    .unwrap();

    cothread::end().unwrap();

    let trace = trace.lock().unwrap();
    assert_eq!(
        *trace,
        vec!["L:start", "L:exec", "H:start", "H:exec", "L:done"]
    );
}

#[test]
fn round_robin_at_equal_priority() {
    let _guard = serialized();

    let trace = trace();

    // A driver task at the highest priority forks both A and B before
    // either runs, so the round-robin interleave below is deterministic
    // rather than racing against the test's own thread.
    cothread::init(Config::new(2, 0).unwrap()).unwrap();

    let driver_trace = Arc::clone(&trace);
    cothread::fork(
        5,
        Box::new(move |_priority| {
            let a_trace = Arc::clone(&driver_trace);
            cothread::fork(
                2,
                Box::new(move |_priority| {
                    for _ in 0..4 {
                        a_trace.lock().unwrap().push("A".into());
                        cothread::exec().unwrap();
                    }
                }),
            )
            .unwrap();

            let b_trace = Arc::clone(&driver_trace);
            cothread::fork(
                2,
                Box::new(move |_priority| {
                    for _ in 0..4 {
                        b_trace.lock().unwrap().push("B".into());
                        cothread::exec().unwrap();
                    }
                }),
            )
            .unwrap();
        }),
    )
    .unwrap();

    cothread::end().unwrap();

    let trace = trace.lock().unwrap();
    assert_eq!(
        *trace,
        vec!["A", "A", "B", "B", "A", "A", "B", "B"]
    );
}

#[test]
fn fork_avalanche_runs_children_in_fork_order() {
    let _guard = serialized();

    let trace = Arc::new(Mutex::new(Vec::new()));

    // quantum = 1: every fork call itself drains the parent's quantum,
    // so each child preempts immediately, runs to completion, and hands
    // control back to the parent for the next fork.
    cothread::init(Config::new(1, 0).unwrap()).unwrap();

    let parent_trace = Arc::clone(&trace);
    cothread::fork(
        0,
        Box::new(move |_priority| {
            for i in 0..100u32 {
                let child_trace = Arc::clone(&parent_trace);
                cothread::fork(0, Box::new(move |_priority| {
                    child_trace.lock().unwrap().push(i);
                }))
                .unwrap();
            }
        }),
    )
    .unwrap();

    cothread::end().unwrap();

    let trace = trace.lock().unwrap();
    let expected: Vec<u32> = (0..100).collect();
    assert_eq!(*trace, expected);
}

#[test]
fn reinitialization_after_end_succeeds() {
    let _guard = serialized();

    cothread::init(Config::new(1, 0).unwrap()).unwrap();
    cothread::fork(0, Box::new(|_priority| {})).unwrap();
    cothread::end().unwrap();

    cothread::init(Config::new(1, 0).unwrap()).unwrap();
    cothread::fork(0, Box::new(|_priority| {})).unwrap();
    cothread::end().unwrap();
}

#[test]
fn double_init_is_rejected() {
    let _guard = serialized();

    cothread::init(Config::new(1, 0).unwrap()).unwrap();

    let err = cothread::init(Config::new(1, 0).unwrap()).unwrap_err();
    assert_eq!(err, cothread::SchedulerError::AlreadyInitialized);

    cothread::end().unwrap();
}
