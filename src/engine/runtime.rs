// src/engine/runtime.rs

use anyhow::{anyhow, Result};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::engine::backend::JobBackend;
use crate::engine::overlap::PendingRun;

/// Why a run was triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunReason {
    /// The configured interval elapsed.
    Timer,
    /// Explicit one-shot invocation (`--once`).
    Manual,
}

/// How a run ended, as seen by the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Published { commit: String },
    NoChanges,
    Failed { error: String },
}

/// Events sent into the runtime from the ticker, the job backend, or
/// external signals.
///
/// - the ticker and `--once` wiring send `RunTriggered`
/// - the backend sends `RunCompleted`
/// - Ctrl-C handling sends `ShutdownRequested`
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    RunTriggered { reason: RunReason },
    RunCompleted { outcome: JobOutcome },
    ShutdownRequested,
}

/// Options that influence how the runtime behaves.
#[derive(Debug, Clone, Default)]
pub struct RuntimeOptions {
    /// If true, exit as soon as no run is in flight and nothing is pending.
    /// In scheduled mode this should be `false`.
    pub exit_when_idle: bool,
}

/// The orchestration runtime.
///
/// Responsibilities:
/// - Consume `RuntimeEvent`s from the ticker / backend / signal handler.
/// - Enforce "at most one run in flight", applying the overlap behaviour
///   to mid-run triggers.
/// - Keep the daemon alive across failed runs: recurrence is the retry.
pub struct Runtime<B: JobBackend> {
    backend: B,
    pending: PendingRun,
    options: RuntimeOptions,
    events_rx: mpsc::Receiver<RuntimeEvent>,

    run_in_flight: bool,
    last_failure: Option<String>,
}

impl<B: JobBackend> Runtime<B> {
    pub fn new(
        backend: B,
        pending: PendingRun,
        options: RuntimeOptions,
        events_rx: mpsc::Receiver<RuntimeEvent>,
    ) -> Self {
        Self {
            backend,
            pending,
            options,
            events_rx,
            run_in_flight: false,
            last_failure: None,
        }
    }

    /// Main event loop.
    ///
    /// In `exit_when_idle` mode the returned result reflects the last run:
    /// a failed one-shot run is a failed process.
    pub async fn run(mut self) -> Result<()> {
        info!("nowpub runtime started");

        while let Some(event) = self.events_rx.recv().await {
            debug!(?event, "runtime received event");

            let keep_running = match event {
                RuntimeEvent::RunTriggered { reason } => self.handle_trigger(reason).await?,
                RuntimeEvent::RunCompleted { outcome } => {
                    self.handle_completion(outcome).await?
                }
                RuntimeEvent::ShutdownRequested => {
                    info!("shutdown requested, stopping runtime");
                    false
                }
            };

            if !keep_running {
                break;
            }
        }

        info!("nowpub runtime exiting");

        if self.options.exit_when_idle {
            if let Some(error) = self.last_failure {
                return Err(anyhow!(error));
            }
        }
        Ok(())
    }

    async fn handle_trigger(&mut self, reason: RunReason) -> Result<bool> {
        if self.run_in_flight {
            self.pending.record_trigger(reason);
            return Ok(true);
        }
        self.start_run(reason).await?;
        Ok(true)
    }

    async fn handle_completion(&mut self, outcome: JobOutcome) -> Result<bool> {
        self.run_in_flight = false;

        match &outcome {
            JobOutcome::Published { commit } => {
                info!(%commit, "run published a new snapshot commit");
                self.last_failure = None;
            }
            JobOutcome::NoChanges => {
                info!("run completed with no data changes");
                self.last_failure = None;
            }
            JobOutcome::Failed { error } => {
                warn!(%error, "run failed; next trigger is the retry");
                self.last_failure = Some(error.clone());
            }
        }

        if let Some(reason) = self.pending.take() {
            self.start_run(reason).await?;
            return Ok(true);
        }

        if self.options.exit_when_idle {
            info!("runtime idle and exit_when_idle=true, stopping");
            return Ok(false);
        }

        Ok(true)
    }

    async fn start_run(&mut self, reason: RunReason) -> Result<()> {
        info!(?reason, "starting fetch-and-publish run");
        self.run_in_flight = true;
        self.backend.spawn_run(reason).await
    }
}
