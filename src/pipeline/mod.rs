// src/pipeline/mod.rs

//! The fetch-and-publish orchestration routine.
//!
//! One run walks a linear state machine:
//!
//! ```text
//! Checkout → Preparing → Fetching → Publishing → (Success | Aborted)
//! ```
//!
//! Guarantees (each phase must hold before the next starts):
//! - Checkout: the work tree matches the latest mainline commit.
//! - Preparing: environment setup succeeded; otherwise no fetch happens.
//! - Fetching: the fetch program exited zero and wrote a snapshot;
//!   otherwise no branch is switched and no commit is reached.
//! - Publishing: the data branch carries mainline via a clean merge, the
//!   staged diff is scoped to the output directory, and either exactly one
//!   commit is pushed or (for an identical snapshot) nothing changes.
//!
//! No state persists between runs except the committed data and branch
//! history.

pub mod digest;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::model::ConfigFile;
use crate::errors::{Result, RunError};
use crate::exec::Fetcher;
use crate::git::GitBackend;

/// Staging directory (inside the work tree) that holds the fresh snapshot
/// while the branch switch and merge happen. Never staged or committed:
/// the pipeline only ever stages the output directory.
const STAGE_DIR: &str = ".nowpub-stage";

/// Everything one run needs, resolved from config up front.
///
/// The credential is deliberately absent here; it lives inside the
/// fetcher and never passes through the pipeline or the git backend.
#[derive(Debug, Clone)]
pub struct JobSpec {
    pub work_tree: PathBuf,
    pub remote: String,
    pub mainline_branch: String,
    pub data_branch: String,
    /// Relative to `work_tree`.
    pub output_dir: PathBuf,
    pub commit_message: String,
}

impl JobSpec {
    pub fn from_config(cfg: &ConfigFile, work_tree: PathBuf) -> Self {
        Self {
            work_tree,
            remote: cfg.repo.remote.clone(),
            mainline_branch: cfg.repo.mainline_branch.clone(),
            data_branch: cfg.repo.data_branch.clone(),
            output_dir: PathBuf::from(&cfg.fetch.output_dir),
            commit_message: cfg.publish.commit_message.clone(),
        }
    }
}

/// How a successful run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// A new snapshot commit was pushed to the data branch.
    Published { commit: String },
    /// The snapshot was byte-identical to the committed data; the run
    /// completed without creating a commit.
    NoChanges,
}

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub outcome: RunOutcome,
    /// Content digest of the fetched snapshot.
    pub digest: String,
}

#[derive(Debug, Clone, Copy)]
enum RunPhase {
    Checkout,
    Preparing,
    Fetching,
    Publishing,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunPhase::Checkout => f.write_str("checkout"),
            RunPhase::Preparing => f.write_str("preparing"),
            RunPhase::Fetching => f.write_str("fetching"),
            RunPhase::Publishing => f.write_str("publishing"),
        }
    }
}

/// Drive a single fetch-and-publish run to completion.
///
/// Every error aborts the run; nothing is retried here. The caller (the
/// engine) decides what a failure means — in scheduled mode the next tick
/// is the retry.
pub async fn run_once<G, F>(job: &JobSpec, git: &G, fetcher: &F) -> Result<RunReport>
where
    G: GitBackend,
    F: Fetcher,
{
    let output_abs = job.work_tree.join(&job.output_dir);

    info!(phase = %RunPhase::Checkout, branch = %job.mainline_branch, "updating mainline work tree");
    git.fetch_remote(&job.remote).await?;
    git.checkout(&job.mainline_branch).await?;

    let mainline_tracking = remote_tracking_ref(&job.remote, &job.mainline_branch);
    if git.has_ref(&mainline_tracking).await? {
        git.fast_forward(&mainline_tracking).await?;
    } else {
        debug!(refname = %mainline_tracking, "no remote tracking ref; skipping mainline update");
    }

    // A stale snapshot from an aborted run must not leak into this one.
    if output_abs.exists() {
        debug!(path = ?output_abs, "removing leftover output directory");
        fs::remove_dir_all(&output_abs)?;
    }

    info!(phase = %RunPhase::Preparing, "running environment setup");
    fetcher.prepare(&job.work_tree).await?;

    info!(phase = %RunPhase::Fetching, "running fetch program");
    fetcher.fetch(&job.work_tree).await?;

    if !output_abs.is_dir() {
        return Err(RunError::NoSnapshot {
            path: output_abs.display().to_string(),
        });
    }

    let digest = digest::compute_dir_digest(&output_abs)?;
    info!(%digest, "snapshot fetched");

    // Move the snapshot aside so the branch switch can neither clobber it
    // nor refuse because of it.
    let stage_root = job.work_tree.join(STAGE_DIR);
    if stage_root.exists() {
        fs::remove_dir_all(&stage_root)?;
    }
    fs::create_dir_all(&stage_root)?;
    let staged = stage_root.join("snapshot");
    fs::rename(&output_abs, &staged)?;

    let publish_result = publish(job, git, &staged, &output_abs).await;

    // The staging directory must not outlive the run, whatever happened.
    if let Err(err) = fs::remove_dir_all(&stage_root) {
        warn!(error = %err, path = ?stage_root, "failed to clean staging directory");
    }

    let outcome = publish_result?;
    Ok(RunReport { outcome, digest })
}

async fn publish<G: GitBackend>(
    job: &JobSpec,
    git: &G,
    staged: &Path,
    output_abs: &Path,
) -> Result<RunOutcome> {
    info!(phase = %RunPhase::Publishing, branch = %job.data_branch, "switching to data branch");

    let local_ref = format!("refs/heads/{}", job.data_branch);
    let tracking_ref = remote_tracking_ref(&job.remote, &job.data_branch);
    let local_exists = git.has_ref(&local_ref).await?;

    if local_exists || git.has_ref(&tracking_ref).await? {
        git.checkout(&job.data_branch).await?;
        // A previous daemon (or run) may have pushed ahead of this clone.
        if local_exists && git.has_ref(&tracking_ref).await? {
            git.fast_forward(&tracking_ref).await?;
        }
    } else {
        info!(branch = %job.data_branch, "data branch does not exist yet; creating from mainline");
        git.create_branch(&job.data_branch, &job.mainline_branch).await?;
    }

    if let Err(err) = git.merge(&job.mainline_branch).await {
        if let Err(abort_err) = git.abort_merge().await {
            warn!(error = %abort_err, "failed to abort conflicted merge");
        }
        let detail = match &err {
            RunError::Git { detail, .. } => detail.clone(),
            other => other.to_string(),
        };
        return Err(RunError::Merge {
            mainline: job.mainline_branch.clone(),
            data_branch: job.data_branch.clone(),
            detail,
        });
    }

    // Replace the committed snapshot with the fresh one.
    if output_abs.exists() {
        fs::remove_dir_all(output_abs)?;
    }
    fs::rename(staged, output_abs)?;

    git.stage_dir(&job.output_dir).await?;
    if !git.has_staged_changes(&job.output_dir).await? {
        info!("snapshot identical to committed data; nothing to publish");
        return Ok(RunOutcome::NoChanges);
    }

    git.commit(&job.commit_message).await?;
    let commit = git.head_commit().await?;

    if let Err(err) = git.push(&job.remote, &job.data_branch).await {
        let detail = match &err {
            RunError::Git { detail, .. } => detail.clone(),
            other => other.to_string(),
        };
        return Err(RunError::Push {
            remote: job.remote.clone(),
            branch: job.data_branch.clone(),
            detail,
        });
    }

    info!(%commit, branch = %job.data_branch, "published snapshot");
    Ok(RunOutcome::Published { commit })
}

fn remote_tracking_ref(remote: &str, branch: &str) -> String {
    format!("refs/remotes/{remote}/{branch}")
}
