// src/git/mod.rs

//! Version-control surface.
//!
//! The pipeline talks to a [`GitBackend`] instead of running git directly.
//! This keeps the publish sequence testable without real repositories
//! while the production implementation, [`GitCli`], shells out to the
//! `git` CLI against a configured work tree.
//!
//! The backend is never handed the API credential, so nothing it captures
//! (stderr, stdout) can leak it.

pub mod cli;

use std::path::Path;

use crate::errors::Result;

pub use cli::GitCli;

/// Fixed commit identity used for snapshot commits (and for any merge
/// commits the publish step creates).
#[derive(Debug, Clone)]
pub struct CommitAuthor {
    pub name: String,
    pub email: String,
}

/// Trait abstracting the git operations the pipeline needs.
#[allow(async_fn_in_trait)]
pub trait GitBackend {
    /// `git fetch <remote>` — update remote-tracking refs.
    async fn fetch_remote(&self, remote: &str) -> Result<()>;

    /// Switch the work tree to an existing branch.
    async fn checkout(&self, branch: &str) -> Result<()>;

    /// Create `branch` at `start_point` and switch to it.
    async fn create_branch(&self, branch: &str, start_point: &str) -> Result<()>;

    /// Whether the given fully-qualified ref (e.g. `refs/heads/main`,
    /// `refs/remotes/origin/main`) resolves.
    async fn has_ref(&self, refname: &str) -> Result<bool>;

    /// Fast-forward the current branch to `refname`; fails if histories
    /// have diverged.
    async fn fast_forward(&self, refname: &str) -> Result<()>;

    /// Merge `branch` into the current branch, non-interactively.
    async fn merge(&self, branch: &str) -> Result<()>;

    /// Abort an in-progress merge, restoring the pre-merge state.
    async fn abort_merge(&self) -> Result<()>;

    /// Stage all changes (including deletions) under `dir` only.
    async fn stage_dir(&self, dir: &Path) -> Result<()>;

    /// Whether the index differs from `HEAD` under `dir`.
    async fn has_staged_changes(&self, dir: &Path) -> Result<bool>;

    /// Commit the index with the fixed author identity and `message`.
    async fn commit(&self, message: &str) -> Result<()>;

    /// Resolve `HEAD` to a commit id.
    async fn head_commit(&self) -> Result<String>;

    /// `git push <remote> <branch>`.
    async fn push(&self, remote: &str, branch: &str) -> Result<()>;
}
