//! Bridge driver background task.
//!
//! The single owning loop of the system: it services the pending operation
//! queue, one backend call per tick, and reaps expired sessions once per
//! cycle alongside the tick.
//!
//! # Graceful Shutdown
//!
//! The task supports graceful shutdown via a cancellation token. When the
//! token is cancelled, the bridge is shut down (pending receipts resolve to
//! `BridgeClosed`) and the task exits cleanly.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use crate::bridge::{RequestBridge, RtcBackend};
use crate::rooms::directory::SessionDirectory;

/// Drive the bridge and the session reaper until cancelled.
///
/// This task owns the [`RequestBridge`] and is therefore the backend's single
/// legal calling thread; nothing else can reach the backend.
///
/// # Arguments
///
/// * `bridge` - Owning side of the request bridge
/// * `directory` - Session registry to reap each cycle
/// * `tick_interval` - Loop cadence; one operation serviced per tick
/// * `cancel_token` - Token for graceful shutdown
#[instrument(skip_all, name = "rc.task.driver")]
pub async fn run_bridge_driver<B: RtcBackend>(
    mut bridge: RequestBridge<B>,
    directory: Arc<SessionDirectory>,
    tick_interval: Duration,
    cancel_token: CancellationToken,
) {
    info!(
        target: "rc.task.driver",
        tick_interval_ms = tick_interval.as_millis() as u64,
        "bridge driver started"
    );

    let mut ticker = tokio::time::interval(tick_interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            () = cancel_token.cancelled() => {
                info!(
                    target: "rc.task.driver",
                    "bridge driver received shutdown signal, exiting"
                );
                break;
            }
            _ = ticker.tick() => {
                bridge.tick();
                let reaped = directory.remove_expired_sessions(Instant::now());
                if reaped > 0 {
                    info!(
                        target: "rc.task.driver",
                        reaped,
                        remaining = directory.len(),
                        "expired sessions removed"
                    );
                }
            }
        }
    }

    bridge.shutdown();

    let totals = bridge.metrics().snapshot();
    info!(
        target: "rc.task.driver",
        submitted = totals.submitted,
        serviced = totals.serviced,
        fulfilled = totals.fulfilled,
        abandoned = totals.abandoned,
        "bridge driver stopped"
    );
}
