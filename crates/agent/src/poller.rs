//! Poll loop driving the [`JobSelector`].
//!
//! Ticks the selector on a fixed interval and logs a heartbeat line on a
//! slower one. A failed cycle is logged and the next tick proceeds. Runs
//! until `cancel` is triggered.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use wurk_core::JobSelector;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    pub heartbeat: Duration,
}

pub async fn run(selector: Arc<JobSelector>, config: PollConfig, cancel: CancellationToken) {
    tracing::info!(
        poll_ms = config.interval.as_millis() as u64,
        heartbeat_secs = config.heartbeat.as_secs(),
        "Monitoring started",
    );

    let mut poll = tokio::time::interval(config.interval);
    poll.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut heartbeat = tokio::time::interval(config.heartbeat);
    heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // First tick completes immediately.
    heartbeat.tick().await;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Monitoring stopping");
                break;
            }
            _ = poll.tick() => {
                match selector.poll_cycle().await {
                    Ok(outcome) => {
                        if outcome.promoted.is_some() {
                            tracing::debug!(
                                candidates = outcome.candidate_count,
                                "Awaiting operator confirmation"
                            );
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Poll cycle failed");
                    }
                }
            }
            _ = heartbeat.tick() => {
                let snapshot = selector.snapshot().await;
                let active = snapshot
                    .active
                    .as_ref()
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "-".to_string());
                tracing::info!(
                    active = %active,
                    verifying = snapshot.verifying,
                    done = snapshot.done_count,
                    "Monitoring",
                );
            }
        }
    }
}
