// src/exec/mod.rs

//! Process execution layer.
//!
//! This module owns the boundary to external processes, using
//! `tokio::process::Command`:
//!
//! - [`process`] runs a shell command line to completion, draining its
//!   output into the log.
//! - [`fetch`] wraps the fetch-program contract (credential via
//!   environment, exit code as the only signal) behind the [`Fetcher`]
//!   trait.

pub mod fetch;
pub mod process;

pub use fetch::{Fetcher, ProgramFetcher};
pub use process::run_shell;
