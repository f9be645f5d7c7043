// src/engine/backend.rs

//! Pluggable job backend abstraction.
//!
//! The runtime talks to a `JobBackend` instead of invoking the pipeline
//! directly. Production code uses [`PipelineBackend`], which spawns one
//! pipeline run as a Tokio task and reports back with a `RunCompleted`
//! event; tests can provide their own backend that records triggers and
//! synthesizes completions.

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::debug;

use crate::engine::runtime::{JobOutcome, RunReason, RuntimeEvent};
use crate::exec::ProgramFetcher;
use crate::git::GitCli;
use crate::pipeline::{self, JobSpec, RunOutcome};

/// Trait abstracting how a triggered run is executed.
#[allow(async_fn_in_trait)]
pub trait JobBackend: Send {
    /// Dispatch one run. Must not block on the run itself: completion is
    /// reported asynchronously via `RuntimeEvent::RunCompleted`.
    async fn spawn_run(&mut self, reason: RunReason) -> Result<()>;
}

/// Real backend: runs the fetch-and-publish pipeline.
pub struct PipelineBackend {
    job: Arc<JobSpec>,
    git: Arc<GitCli>,
    fetcher: Arc<ProgramFetcher>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
}

impl PipelineBackend {
    pub fn new(
        job: JobSpec,
        git: GitCli,
        fetcher: ProgramFetcher,
        runtime_tx: mpsc::Sender<RuntimeEvent>,
    ) -> Self {
        Self {
            job: Arc::new(job),
            git: Arc::new(git),
            fetcher: Arc::new(fetcher),
            runtime_tx,
        }
    }
}

impl JobBackend for PipelineBackend {
    async fn spawn_run(&mut self, reason: RunReason) -> Result<()> {
        debug!(?reason, "dispatching pipeline run");

        let job = Arc::clone(&self.job);
        let git = Arc::clone(&self.git);
        let fetcher = Arc::clone(&self.fetcher);
        let tx = self.runtime_tx.clone();

        tokio::spawn(async move {
            let result = pipeline::run_once(job.as_ref(), git.as_ref(), fetcher.as_ref()).await;
            let outcome = match result {
                Ok(report) => match report.outcome {
                    RunOutcome::Published { commit } => JobOutcome::Published { commit },
                    RunOutcome::NoChanges => JobOutcome::NoChanges,
                },
                Err(err) => JobOutcome::Failed {
                    error: err.to_string(),
                },
            };
            let _ = tx.send(RuntimeEvent::RunCompleted { outcome }).await;
        });

        Ok(())
    }
}
