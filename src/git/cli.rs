// src/git/cli.rs

use std::path::{Path, PathBuf};
use std::process::Output;

use tokio::process::Command;
use tracing::{debug, trace};

use crate::errors::{Result, RunError};
use crate::git::{CommitAuthor, GitBackend};

/// Production git backend: shells out to the `git` CLI against a fixed
/// work tree.
///
/// Every command runs as `git -C <work_tree> ...`. Commands that may
/// create commits (merge, commit) additionally carry the configured
/// author identity via `-c user.name=... -c user.email=...`, so the
/// daemon never depends on ambient git configuration.
pub struct GitCli {
    work_tree: PathBuf,
    author: CommitAuthor,
}

impl GitCli {
    pub fn new(work_tree: PathBuf, author: CommitAuthor) -> Self {
        Self { work_tree, author }
    }

    pub fn work_tree(&self) -> &Path {
        &self.work_tree
    }

    async fn git(&self, args: &[&str]) -> Result<Output> {
        trace!(?args, "running git");
        let output = Command::new("git")
            .arg("-C")
            .arg(&self.work_tree)
            .args(args)
            .output()
            .await?;
        Ok(output)
    }

    async fn git_ok(&self, op: &'static str, args: &[&str]) -> Result<Output> {
        let output = self.git(args).await?;
        if !output.status.success() {
            return Err(RunError::Git {
                op: op.to_string(),
                detail: failure_detail(&output),
            });
        }
        debug!(op, "git command succeeded");
        Ok(output)
    }

    fn identity_args(&self) -> [String; 4] {
        [
            "-c".to_string(),
            format!("user.name={}", self.author.name),
            "-c".to_string(),
            format!("user.email={}", self.author.email),
        ]
    }

    async fn git_ok_with_identity(&self, op: &'static str, args: &[&str]) -> Result<Output> {
        let identity = self.identity_args();
        let mut full: Vec<&str> = identity.iter().map(String::as_str).collect();
        full.extend_from_slice(args);
        self.git_ok(op, &full).await
    }
}

/// Prefer stderr for the failure detail; fall back to stdout.
fn failure_detail(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    if !stderr.is_empty() {
        return stderr.to_string();
    }
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

impl GitBackend for GitCli {
    async fn fetch_remote(&self, remote: &str) -> Result<()> {
        self.git_ok("fetch", &["fetch", "--prune", remote]).await?;
        Ok(())
    }

    async fn checkout(&self, branch: &str) -> Result<()> {
        self.git_ok("checkout", &["checkout", branch]).await?;
        Ok(())
    }

    async fn create_branch(&self, branch: &str, start_point: &str) -> Result<()> {
        self.git_ok("checkout", &["checkout", "-b", branch, start_point])
            .await?;
        Ok(())
    }

    async fn has_ref(&self, refname: &str) -> Result<bool> {
        let output = self
            .git(&["rev-parse", "--verify", "--quiet", refname])
            .await?;
        Ok(output.status.success())
    }

    async fn fast_forward(&self, refname: &str) -> Result<()> {
        self.git_ok("merge --ff-only", &["merge", "--ff-only", refname])
            .await?;
        Ok(())
    }

    async fn merge(&self, branch: &str) -> Result<()> {
        // Merge can create a commit, so it needs the identity config.
        self.git_ok_with_identity("merge", &["merge", "--no-edit", branch])
            .await?;
        Ok(())
    }

    async fn abort_merge(&self) -> Result<()> {
        self.git_ok("merge --abort", &["merge", "--abort"]).await?;
        Ok(())
    }

    async fn stage_dir(&self, dir: &Path) -> Result<()> {
        let dir = dir.to_string_lossy();
        self.git_ok("add", &["add", "--all", "--", dir.as_ref()])
            .await?;
        Ok(())
    }

    async fn has_staged_changes(&self, dir: &Path) -> Result<bool> {
        let dir = dir.to_string_lossy();
        let output = self
            .git(&["diff", "--cached", "--quiet", "--", dir.as_ref()])
            .await?;
        // `diff --quiet` exits 0 for "no differences", 1 for "differences".
        match output.status.code() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(RunError::Git {
                op: "diff --cached".to_string(),
                detail: failure_detail(&output),
            }),
        }
    }

    async fn commit(&self, message: &str) -> Result<()> {
        self.git_ok_with_identity("commit", &["commit", "-m", message])
            .await?;
        Ok(())
    }

    async fn head_commit(&self) -> Result<String> {
        let output = self.git_ok("rev-parse", &["rev-parse", "HEAD"]).await?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    async fn push(&self, remote: &str, branch: &str) -> Result<()> {
        self.git_ok("push", &["push", remote, branch]).await?;
        Ok(())
    }
}
