// src/engine/overlap.rs

use std::str::FromStr;

use tracing::{debug, warn};

use crate::engine::runtime::RunReason;

/// Behaviour when a trigger arrives while a run is already in flight.
///
/// - `Skip` (default): drop the trigger; the next scheduled tick is the
///   retry. This matches the original job's reliance on recurrence.
/// - `Queue`: remember at most one pending run and start it when the
///   current run finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlapBehaviour {
    #[default]
    Skip,
    Queue,
}

impl FromStr for OverlapBehaviour {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "skip" => Ok(OverlapBehaviour::Skip),
            "queue" => Ok(OverlapBehaviour::Queue),
            other => Err(format!(
                "invalid triggered_while_running_behaviour: {other} (expected \"skip\" or \"queue\")"
            )),
        }
    }
}

/// At-most-one pending run, recorded while a run is in flight.
///
/// There is only a single job here, so the teacher-pattern trigger queue
/// degenerates to a single slot: multiple mid-run triggers coalesce into
/// one pending run (in `Queue` mode) or are dropped (in `Skip` mode).
#[derive(Debug)]
pub struct PendingRun {
    behaviour: OverlapBehaviour,
    slot: Option<RunReason>,
}

impl PendingRun {
    pub fn new(behaviour: OverlapBehaviour) -> Self {
        Self {
            behaviour,
            slot: None,
        }
    }

    pub fn behaviour(&self) -> OverlapBehaviour {
        self.behaviour
    }

    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }

    /// Record a trigger that arrived mid-run.
    pub fn record_trigger(&mut self, reason: RunReason) {
        match self.behaviour {
            OverlapBehaviour::Skip => {
                warn!(?reason, "trigger arrived while a run is in flight; skipping");
            }
            OverlapBehaviour::Queue => {
                if self.slot.is_some() {
                    debug!(?reason, "coalescing trigger into already-pending run");
                }
                self.slot = Some(reason);
            }
        }
    }

    /// Take the pending run, if any, leaving the slot empty.
    pub fn take(&mut self) -> Option<RunReason> {
        self.slot.take()
    }
}
