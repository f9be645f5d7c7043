// src/engine/ticker.rs

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::debug;

use crate::engine::runtime::{RunReason, RuntimeEvent};

/// Spawn the interval trigger task.
///
/// The first tick fires immediately, so a freshly started daemon runs
/// once at startup rather than waiting a full interval. Ticks missed
/// while the receiver is busy are delayed, not bursted.
pub fn spawn_ticker(
    period: Duration,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            debug!("interval elapsed; requesting run");
            let sent = runtime_tx
                .send(RuntimeEvent::RunTriggered {
                    reason: RunReason::Timer,
                })
                .await;
            if sent.is_err() {
                // Runtime is gone; nothing left to trigger.
                break;
            }
        }
    })
}
