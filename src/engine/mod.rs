// src/engine/mod.rs

//! Trigger handling and the orchestration runtime.
//!
//! - [`runtime`] owns the event loop: triggers in, runs out, at most one
//!   run in flight.
//! - [`overlap`] decides what a trigger means while a run is in flight.
//! - [`ticker`] is the time-based trigger source.
//! - [`backend`] is the seam between the runtime and actual run
//!   execution, so tests can avoid spawning real pipelines.

pub mod backend;
pub mod overlap;
pub mod runtime;
pub mod ticker;

pub use backend::{JobBackend, PipelineBackend};
pub use overlap::{OverlapBehaviour, PendingRun};
pub use runtime::{JobOutcome, RunReason, Runtime, RuntimeEvent, RuntimeOptions};
pub use ticker::spawn_ticker;
