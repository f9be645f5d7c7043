// tests/runtime_fake_backend.rs

//! Runtime behaviour against a fake job backend: one-shot exit, failure
//! propagation in `--once` mode, and the skip/queue overlap behaviours.

mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use common::FakeBackend;
use tokio::sync::mpsc;
use tokio::time::timeout;

use nowpub::engine::{
    JobOutcome, OverlapBehaviour, PendingRun, RunReason, Runtime, RuntimeEvent, RuntimeOptions,
};

fn fake_backend(
    tx: &mpsc::Sender<RuntimeEvent>,
    auto_outcome: Option<JobOutcome>,
) -> (FakeBackend, Arc<Mutex<Vec<RunReason>>>) {
    let runs = Arc::new(Mutex::new(Vec::new()));
    let backend = FakeBackend {
        runs: Arc::clone(&runs),
        auto_outcome,
        runtime_tx: tx.clone(),
    };
    (backend, runs)
}

#[tokio::test]
async fn once_mode_runs_once_and_exits_when_idle() {
    let (tx, rx) = mpsc::channel::<RuntimeEvent>(16);
    let (backend, runs) = fake_backend(&tx, Some(JobOutcome::NoChanges));

    let runtime = Runtime::new(
        backend,
        PendingRun::new(OverlapBehaviour::Skip),
        RuntimeOptions { exit_when_idle: true },
        rx,
    );

    tx.send(RuntimeEvent::RunTriggered {
        reason: RunReason::Manual,
    })
    .await
    .unwrap();

    timeout(Duration::from_secs(5), runtime.run())
        .await
        .expect("runtime should exit when idle")
        .unwrap();

    assert_eq!(runs.lock().unwrap().as_slice(), &[RunReason::Manual]);
}

#[tokio::test]
async fn once_mode_surfaces_run_failure() {
    let (tx, rx) = mpsc::channel::<RuntimeEvent>(16);
    let (backend, _runs) = fake_backend(
        &tx,
        Some(JobOutcome::Failed {
            error: "fetch program exited with code 3".to_string(),
        }),
    );

    let runtime = Runtime::new(
        backend,
        PendingRun::new(OverlapBehaviour::Skip),
        RuntimeOptions { exit_when_idle: true },
        rx,
    );

    tx.send(RuntimeEvent::RunTriggered {
        reason: RunReason::Manual,
    })
    .await
    .unwrap();

    let result = timeout(Duration::from_secs(5), runtime.run())
        .await
        .expect("runtime should exit when idle");
    assert!(result.is_err());
}

#[tokio::test]
async fn skip_behaviour_drops_triggers_while_running() {
    let (tx, rx) = mpsc::channel::<RuntimeEvent>(16);
    let (backend, runs) = fake_backend(&tx, None);

    // Two triggers land while the (uncompleted) run is in flight, then the
    // run completes, then shutdown. With `skip`, nothing pending remains.
    for event in [
        RuntimeEvent::RunTriggered {
            reason: RunReason::Timer,
        },
        RuntimeEvent::RunTriggered {
            reason: RunReason::Timer,
        },
        RuntimeEvent::RunCompleted {
            outcome: JobOutcome::NoChanges,
        },
        RuntimeEvent::ShutdownRequested,
    ] {
        tx.send(event).await.unwrap();
    }

    let runtime = Runtime::new(
        backend,
        PendingRun::new(OverlapBehaviour::Skip),
        RuntimeOptions::default(),
        rx,
    );
    timeout(Duration::from_secs(5), runtime.run())
        .await
        .expect("runtime should stop on shutdown")
        .unwrap();

    assert_eq!(runs.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn queue_behaviour_starts_pending_run_after_completion() {
    let (tx, rx) = mpsc::channel::<RuntimeEvent>(16);
    let (backend, runs) = fake_backend(&tx, None);

    // Trigger while running is remembered; completion starts it; repeated
    // mid-run triggers coalesce into that single pending run.
    for event in [
        RuntimeEvent::RunTriggered {
            reason: RunReason::Manual,
        },
        RuntimeEvent::RunTriggered {
            reason: RunReason::Timer,
        },
        RuntimeEvent::RunTriggered {
            reason: RunReason::Timer,
        },
        RuntimeEvent::RunCompleted {
            outcome: JobOutcome::NoChanges,
        },
        RuntimeEvent::RunCompleted {
            outcome: JobOutcome::NoChanges,
        },
        RuntimeEvent::ShutdownRequested,
    ] {
        tx.send(event).await.unwrap();
    }

    let runtime = Runtime::new(
        backend,
        PendingRun::new(OverlapBehaviour::Queue),
        RuntimeOptions::default(),
        rx,
    );
    timeout(Duration::from_secs(5), runtime.run())
        .await
        .expect("runtime should stop on shutdown")
        .unwrap();

    assert_eq!(
        runs.lock().unwrap().as_slice(),
        &[RunReason::Manual, RunReason::Timer]
    );
}
