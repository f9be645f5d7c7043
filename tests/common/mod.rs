// tests/common/mod.rs

//! Shared fakes for integration tests.
//!
//! `FakeGit` and `FakeFetcher` let pipeline tests run without real
//! repositories or processes; `FakeBackend` lets runtime tests record
//! which runs were dispatched and synthesize completions.

#![allow(dead_code)]

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use nowpub::engine::{JobBackend, JobOutcome, RunReason, RuntimeEvent};
use nowpub::errors::{Result, RunError};
use nowpub::exec::Fetcher;
use nowpub::git::GitBackend;

/// A fake git backend that records every operation as a plain string and
/// can be told to conflict on merge, reject pushes, or report an empty
/// staged diff.
pub struct FakeGit {
    pub ops: Arc<Mutex<Vec<String>>>,
    pub refs: Arc<Mutex<HashSet<String>>>,
    pub merge_conflict: bool,
    pub push_rejected: bool,
    pub staged_changes: bool,
}

impl FakeGit {
    pub fn with_refs(refs: &[&str]) -> Self {
        Self {
            ops: Arc::new(Mutex::new(Vec::new())),
            refs: Arc::new(Mutex::new(refs.iter().map(|s| s.to_string()).collect())),
            merge_conflict: false,
            push_rejected: false,
            staged_changes: true,
        }
    }

    pub fn recorded(&self) -> Vec<String> {
        self.ops.lock().unwrap().clone()
    }

    fn record(&self, op: impl Into<String>) {
        self.ops.lock().unwrap().push(op.into());
    }
}

impl GitBackend for FakeGit {
    async fn fetch_remote(&self, remote: &str) -> Result<()> {
        self.record(format!("fetch {remote}"));
        Ok(())
    }

    async fn checkout(&self, branch: &str) -> Result<()> {
        self.record(format!("checkout {branch}"));
        Ok(())
    }

    async fn create_branch(&self, branch: &str, start_point: &str) -> Result<()> {
        self.record(format!("checkout -b {branch} {start_point}"));
        self.refs
            .lock()
            .unwrap()
            .insert(format!("refs/heads/{branch}"));
        Ok(())
    }

    async fn has_ref(&self, refname: &str) -> Result<bool> {
        Ok(self.refs.lock().unwrap().contains(refname))
    }

    async fn fast_forward(&self, refname: &str) -> Result<()> {
        self.record(format!("merge --ff-only {refname}"));
        Ok(())
    }

    async fn merge(&self, branch: &str) -> Result<()> {
        self.record(format!("merge {branch}"));
        if self.merge_conflict {
            return Err(RunError::Git {
                op: "merge".to_string(),
                detail: "CONFLICT (content): fake conflict".to_string(),
            });
        }
        Ok(())
    }

    async fn abort_merge(&self) -> Result<()> {
        self.record("merge --abort");
        Ok(())
    }

    async fn stage_dir(&self, dir: &Path) -> Result<()> {
        self.record(format!("add {}", dir.display()));
        Ok(())
    }

    async fn has_staged_changes(&self, _dir: &Path) -> Result<bool> {
        Ok(self.staged_changes)
    }

    async fn commit(&self, message: &str) -> Result<()> {
        self.record(format!("commit {message}"));
        Ok(())
    }

    async fn head_commit(&self) -> Result<String> {
        Ok("fakecommit123".to_string())
    }

    async fn push(&self, remote: &str, branch: &str) -> Result<()> {
        self.record(format!("push {remote} {branch}"));
        if self.push_rejected {
            return Err(RunError::Git {
                op: "push".to_string(),
                detail: "non-fast-forward".to_string(),
            });
        }
        Ok(())
    }
}

/// A fake fetcher that writes fixed snapshot files instead of spawning a
/// process, or fails with a configured exit code.
pub struct FakeFetcher {
    pub output_dir: PathBuf,
    pub files: Vec<(String, String)>,
    pub exit_code: Option<i32>,
    pub create_output: bool,
}

impl FakeFetcher {
    pub fn writing(output_dir: &str, files: &[(&str, &str)]) -> Self {
        Self {
            output_dir: PathBuf::from(output_dir),
            files: files
                .iter()
                .map(|(n, c)| (n.to_string(), c.to_string()))
                .collect(),
            exit_code: None,
            create_output: true,
        }
    }

    pub fn failing(code: i32) -> Self {
        Self {
            output_dir: PathBuf::new(),
            files: Vec::new(),
            exit_code: Some(code),
            create_output: false,
        }
    }

    pub fn silent() -> Self {
        Self {
            output_dir: PathBuf::new(),
            files: Vec::new(),
            exit_code: None,
            create_output: false,
        }
    }
}

impl Fetcher for FakeFetcher {
    async fn prepare(&self, _work_tree: &Path) -> Result<()> {
        Ok(())
    }

    async fn fetch(&self, work_tree: &Path) -> Result<()> {
        if let Some(code) = self.exit_code {
            return Err(RunError::Fetch { code });
        }
        if !self.create_output {
            return Ok(());
        }
        let root = work_tree.join(&self.output_dir);
        fs::create_dir_all(&root)?;
        for (name, contents) in &self.files {
            fs::write(root.join(name), contents)?;
        }
        Ok(())
    }
}

/// A fake job backend that records dispatched runs and, if configured,
/// immediately reports a completion for each.
pub struct FakeBackend {
    pub runs: Arc<Mutex<Vec<RunReason>>>,
    pub auto_outcome: Option<JobOutcome>,
    pub runtime_tx: mpsc::Sender<RuntimeEvent>,
}

impl JobBackend for FakeBackend {
    async fn spawn_run(&mut self, reason: RunReason) -> anyhow::Result<()> {
        self.runs.lock().unwrap().push(reason);
        if let Some(outcome) = &self.auto_outcome {
            self.runtime_tx
                .send(RuntimeEvent::RunCompleted {
                    outcome: outcome.clone(),
                })
                .await
                .map_err(anyhow::Error::from)?;
        }
        Ok(())
    }
}
