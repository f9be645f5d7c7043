// src/errors.rs

//! Crate-wide error taxonomy for a fetch-and-publish run.
//!
//! Every variant is fatal to the run that produced it; nothing is retried
//! within a run. Recovery is the next scheduled trigger. An identical
//! snapshot (empty staged diff) is deliberately *not* represented here —
//! that case is a successful no-op outcome, not an error.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunError {
    /// Environment setup failed: missing credential variable, or the
    /// prepare command exited non-zero. The fetch program is never started.
    #[error("environment setup failed: {0}")]
    Setup(String),

    /// The fetch program signalled failure via its exit code.
    #[error("fetch program exited with code {code}")]
    Fetch { code: i32 },

    /// The fetch program exited successfully but wrote nothing under the
    /// configured output directory.
    #[error("fetch program produced no output directory at {path}")]
    NoSnapshot { path: String },

    /// A git subcommand failed for a reason outside the merge/push
    /// categories below.
    #[error("git {op} failed: {detail}")]
    Git { op: String, detail: String },

    /// Merging mainline into the data branch conflicted. The merge is
    /// aborted before this is returned; no partial merge state survives.
    #[error("merging '{mainline}' into '{data_branch}' failed: {detail}")]
    Merge {
        mainline: String,
        data_branch: String,
        detail: String,
    },

    /// The remote rejected the push (e.g. non-fast-forward).
    #[error("push to '{remote}/{branch}' rejected: {detail}")]
    Push {
        remote: String,
        branch: String,
        detail: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, RunError>;
