//! Periodic version polling.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use super::{CrmApi, PollOutcome, SyncController};

impl<A: CrmApi> SyncController<A> {
    /// Poll every `interval` until `shutdown` turns true or its sender is
    /// dropped. A tick that is already running completes before the loop exits.
    pub async fn run_poller(&self, interval: Duration, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick fires immediately; initial_load already covered it.
        ticker.tick().await;
        tracing::info!(interval_ms = interval.as_millis() as u64, "sync poller started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let PollOutcome::Refreshed { contacts } = self.poll_tick().await {
                        tracing::debug!(contacts, "poller installed new contacts");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        tracing::info!("sync poller stopped");
                        break;
                    }
                }
            }
        }
    }
}
