//! Dispatch orchestration: claim the will, deliver its messages, finalize
//! the trigger.
//!
//! Ordering is what makes dispatch safe to interrupt at any point:
//!
//! 1. Claim the will first (conditional one-way flip). Losing the claim
//!    means a check-in or deactivation won the race and the unit stays
//!    pending.
//! 2. Send each unsent message, recording the outcome per message. A crash
//!    here leaves the will claimed and the trigger pending, which the next
//!    sweep recognizes as a unit to resume.
//! 3. Complete the trigger only after every message has been attempted.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use vigil_core::trigger::TriggerKind;
use vigil_db::models::message::Message;
use vigil_db::repositories::{DispatchLogRepo, MessageRepo, TriggerRepo, WillRepo};
use vigil_db::DbPool;

use crate::delivery::{Delivery, DeliveryError};
use crate::evaluator::{self, DueUnit};

/// Default budget for a single delivery attempt.
pub const DEFAULT_DELIVERY_TIMEOUT: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// SweepStats
// ---------------------------------------------------------------------------

/// Counters for one sweep pass, reported by the scheduler's summary line.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepStats {
    /// Units whose condition had elapsed this pass.
    pub due_units: usize,
    /// Units finalized `completed`, resumed ones included.
    pub completed: usize,
    /// Units left pending: the claim was lost, or delivery is deferred.
    pub postponed: usize,
    /// Units abandoned mid-flight by a repository error.
    pub errored: usize,
    /// Messages accepted by the delivery transport.
    pub messages_sent: usize,
    /// Messages whose delivery attempt failed.
    pub messages_failed: usize,
}

impl SweepStats {
    /// Whether the pass found nothing to do.
    pub fn is_quiet(&self) -> bool {
        self.due_units == 0
    }
}

/// How a single unit ended this pass.
enum UnitOutcome {
    Completed { sent: usize, failed: usize },
    Postponed,
}

/// Per-message counters for one unit's dispatch.
#[derive(Default)]
struct DispatchTally {
    sent: usize,
    failed: usize,
    /// Set when the transport reported itself unconfigured; the unit is
    /// left pending so a later sweep can deliver for real.
    deferred: bool,
}

// ---------------------------------------------------------------------------
// DispatchOrchestrator
// ---------------------------------------------------------------------------

/// Executes the dispatch pipeline for every due unit of a sweep.
pub struct DispatchOrchestrator {
    pool: DbPool,
    delivery: Arc<dyn Delivery>,
    delivery_timeout: Duration,
}

impl DispatchOrchestrator {
    pub fn new(pool: DbPool, delivery: Arc<dyn Delivery>) -> Self {
        Self {
            pool,
            delivery,
            delivery_timeout: DEFAULT_DELIVERY_TIMEOUT,
        }
    }

    /// Override the per-delivery timeout.
    pub fn with_delivery_timeout(mut self, timeout: Duration) -> Self {
        self.delivery_timeout = timeout;
        self
    }

    /// Run one sweep: evaluate all pending conditions and dispatch the
    /// elapsed ones.
    ///
    /// Each unit runs inside its own error boundary. A repository error
    /// mid-unit is logged and the trigger stays pending, so the next sweep
    /// picks the unit back up; one poisoned unit never aborts the pass.
    pub async fn run_sweep(&self) -> Result<SweepStats, sqlx::Error> {
        let now = Utc::now();
        let units = evaluator::due_units(&self.pool, now).await?;

        let mut stats = SweepStats {
            due_units: units.len(),
            ..SweepStats::default()
        };

        for unit in &units {
            match self.process_unit(unit).await {
                Ok(UnitOutcome::Completed { sent, failed }) => {
                    stats.completed += 1;
                    stats.messages_sent += sent;
                    stats.messages_failed += failed;
                }
                Ok(UnitOutcome::Postponed) => stats.postponed += 1,
                Err(e) => {
                    stats.errored += 1;
                    tracing::error!(
                        trigger_id = unit.trigger_id,
                        kind = unit.kind.as_str(),
                        will_id = unit.will_id,
                        error = %e,
                        "Unit dispatch failed; it stays pending and will be retried"
                    );
                }
            }
        }

        Ok(stats)
    }

    /// Dispatch one due unit end to end.
    async fn process_unit(&self, unit: &DueUnit) -> Result<UnitOutcome, sqlx::Error> {
        if unit.will_already_triggered {
            tracing::info!(
                trigger_id = unit.trigger_id,
                will_id = unit.will_id,
                "Resuming dispatch of an already claimed will"
            );
        } else if !self.claim_will(unit).await? {
            return Ok(UnitOutcome::Postponed);
        }

        let tally = self.dispatch_messages(unit).await?;
        if tally.deferred {
            return Ok(UnitOutcome::Postponed);
        }

        let finalized = TriggerRepo::complete(&self.pool, unit.trigger_id, Utc::now()).await?;
        if !finalized {
            tracing::warn!(
                trigger_id = unit.trigger_id,
                "Trigger was already finalized elsewhere"
            );
        }

        tracing::info!(
            trigger_id = unit.trigger_id,
            will_id = unit.will_id,
            sent = tally.sent,
            failed = tally.failed,
            "Unit dispatch complete"
        );
        Ok(UnitOutcome::Completed {
            sent: tally.sent,
            failed: tally.failed,
        })
    }

    /// Claim the unit's will, or establish that the unit may be resumed.
    ///
    /// Returns `false` when the unit must be postponed: the claim was lost
    /// and a re-read shows the will was not claimed by anyone (a fresh
    /// check-in or a deactivation got there first).
    async fn claim_will(&self, unit: &DueUnit) -> Result<bool, sqlx::Error> {
        // Only inactivity units guard on last_check_in. For date and manual
        // units a concurrent check-in changes nothing about being due.
        let expected_check_in =
            (unit.kind == TriggerKind::Inactivity).then_some(unit.last_check_in);

        let claimed =
            WillRepo::claim(&self.pool, unit.will_id, expected_check_in, Utc::now()).await?;
        if claimed {
            tracing::info!(
                trigger_id = unit.trigger_id,
                kind = unit.kind.as_str(),
                will_id = unit.will_id,
                subject = %unit.will_subject,
                "Will claimed for dispatch"
            );
            return Ok(true);
        }

        let resumable = WillRepo::find_by_id(&self.pool, unit.will_id)
            .await?
            .is_some_and(|w| w.is_active && w.is_triggered);
        if resumable {
            tracing::info!(
                trigger_id = unit.trigger_id,
                will_id = unit.will_id,
                "Will claimed by an earlier unit; finishing this one"
            );
        } else {
            tracing::info!(
                trigger_id = unit.trigger_id,
                will_id = unit.will_id,
                "Claim lost to a concurrent check-in or deactivation; unit postponed"
            );
        }
        Ok(resumable)
    }

    /// Attempt delivery of every unsent message of the unit's will.
    ///
    /// A failed delivery is recorded and skipped; remaining recipients are
    /// still attempted. An unconfigured transport defers the whole unit
    /// instead, leaving the messages unsent.
    async fn dispatch_messages(&self, unit: &DueUnit) -> Result<DispatchTally, sqlx::Error> {
        let messages = MessageRepo::list_unsent_for_will(&self.pool, unit.will_id).await?;

        let mut tally = DispatchTally::default();
        for message in &messages {
            match self.deliver_one(message).await {
                Ok(()) => {
                    let recorded = DispatchLogRepo::record_sent(
                        &self.pool,
                        unit.will_id,
                        message.id,
                        &message.recipient_email,
                        Utc::now(),
                    )
                    .await?;
                    if recorded {
                        tally.sent += 1;
                    } else {
                        tracing::debug!(
                            message_id = message.id,
                            "Message was already marked sent by another pass"
                        );
                    }
                }
                Err(DeliveryError::NotConfigured) => {
                    tracing::warn!(
                        trigger_id = unit.trigger_id,
                        will_id = unit.will_id,
                        unsent = messages.len() - tally.sent - tally.failed,
                        "Delivery transport not configured; dispatch deferred"
                    );
                    tally.deferred = true;
                    break;
                }
                Err(e) => {
                    tracing::warn!(
                        message_id = message.id,
                        recipient = %message.recipient_email,
                        error = %e,
                        "Delivery failed; message stays unsent"
                    );
                    DispatchLogRepo::record_failed(
                        &self.pool,
                        unit.will_id,
                        message.id,
                        &message.recipient_email,
                        &e.to_string(),
                    )
                    .await?;
                    tally.failed += 1;
                }
            }
        }

        Ok(tally)
    }

    /// One delivery attempt under the configured timeout.
    async fn deliver_one(&self, message: &Message) -> Result<(), DeliveryError> {
        let send = self
            .delivery
            .send(&message.recipient_email, &message.subject, &message.body);
        match tokio::time::timeout(self.delivery_timeout, send).await {
            Ok(result) => result,
            Err(_) => Err(DeliveryError::TimedOut(self.delivery_timeout)),
        }
    }
}
