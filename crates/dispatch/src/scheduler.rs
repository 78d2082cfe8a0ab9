//! The periodic sweep driver.

use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::orchestrator::DispatchOrchestrator;

/// Background service that runs the dispatch sweep on a fixed interval.
///
/// Sweeps never overlap: the loop awaits each sweep to completion before
/// taking the next tick. A sweep that runs long delays the next one rather
/// than stacking up behind it.
pub struct SweepScheduler {
    orchestrator: DispatchOrchestrator,
    interval: Duration,
}

impl SweepScheduler {
    /// Create a scheduler sweeping at the given interval.
    pub fn new(orchestrator: DispatchOrchestrator, interval: Duration) -> Self {
        Self {
            orchestrator,
            interval,
        }
    }

    /// Run the sweep loop until `cancel` is cancelled.
    ///
    /// The first sweep fires immediately on startup. A sweep error is
    /// logged and the loop keeps going; the scheduler itself never dies.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            interval_secs = self.interval.as_secs(),
            "Sweep scheduler started"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Sweep scheduler shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    match self.orchestrator.run_sweep().await {
                        Ok(stats) if stats.is_quiet() => {
                            tracing::debug!("Sweep found no elapsed conditions");
                        }
                        Ok(stats) => {
                            tracing::info!(
                                due = stats.due_units,
                                completed = stats.completed,
                                postponed = stats.postponed,
                                errored = stats.errored,
                                sent = stats.messages_sent,
                                failed = stats.messages_failed,
                                "Sweep complete"
                            );
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "Sweep failed");
                        }
                    }
                }
            }
        }
    }
}
