//! Condition evaluation for one sweep pass.
//!
//! Fetches the pending candidates (pending trigger joined to an active
//! will), decides which conditions have elapsed at `now`, and skips the
//! rows it cannot evaluate. All deadline math lives in
//! [`vigil_core::condition`]; this module only wires rows to it.

use vigil_core::condition::TriggerCondition;
use vigil_core::trigger::TriggerKind;
use vigil_core::types::{DbId, Timestamp};
use vigil_db::models::trigger::DueCandidate;
use vigil_db::repositories::TriggerRepo;
use vigil_db::DbPool;

/// A unit of dispatch work: a due trigger and the will it fires.
#[derive(Debug, Clone)]
pub struct DueUnit {
    pub trigger_id: DbId,
    pub kind: TriggerKind,
    pub will_id: DbId,
    pub will_subject: String,
    /// `last_check_in` as of evaluation. The claim re-checks it for
    /// inactivity units so a check-in racing the sweep wins.
    pub last_check_in: Timestamp,
    /// Set when the will was already claimed by an earlier, interrupted
    /// pass. The orchestrator skips the claim and finishes the unit.
    pub will_already_triggered: bool,
}

/// Scan all pending conditions and return those that have elapsed at `now`.
///
/// Rows that cannot be evaluated are skipped with a warning and stay
/// pending: an unrecognized kind string, an inactivity trigger on a will
/// with no check-in interval (or one whose deadline overflows), a date
/// trigger without a date. Orphaned
/// triggers never reach the scan (the join drops them); their count is
/// surfaced separately so the integrity anomaly is visible in the logs.
pub async fn due_units(pool: &DbPool, now: Timestamp) -> Result<Vec<DueUnit>, sqlx::Error> {
    let candidates = TriggerRepo::list_pending(pool).await?;
    TriggerRepo::touch_scanned(pool, now).await?;

    let orphaned = TriggerRepo::count_orphaned(pool).await?;
    if orphaned > 0 {
        tracing::warn!(
            count = orphaned,
            "Pending triggers reference missing wills and will never fire"
        );
    }

    let scanned = candidates.len();
    let mut due = Vec::new();
    for candidate in candidates {
        let Some((kind, condition)) = evaluate(&candidate) else {
            continue;
        };
        if !condition.is_elapsed(now) {
            continue;
        }
        if let Some(deadline) = condition.deadline() {
            tracing::debug!(
                trigger_id = candidate.trigger_id,
                will_id = candidate.will_id,
                %deadline,
                "Check-in deadline elapsed"
            );
        }
        due.push(DueUnit {
            trigger_id: candidate.trigger_id,
            kind,
            will_id: candidate.will_id,
            will_subject: candidate.will_subject,
            last_check_in: candidate.last_check_in,
            will_already_triggered: candidate.will_is_triggered,
        });
    }

    tracing::debug!(scanned, due = due.len(), "Condition scan complete");
    Ok(due)
}

/// Build the typed condition for a candidate row, or `None` (with a
/// warning) when the row cannot be evaluated.
fn evaluate(candidate: &DueCandidate) -> Option<(TriggerKind, TriggerCondition)> {
    let kind = match TriggerKind::from_str(&candidate.kind) {
        Ok(kind) => kind,
        Err(_) => {
            tracing::warn!(
                trigger_id = candidate.trigger_id,
                kind = %candidate.kind,
                "Skipping trigger with unrecognized kind"
            );
            return None;
        }
    };

    let condition = match kind {
        TriggerKind::Inactivity => {
            let Some(interval_days) = candidate.check_in_interval_days else {
                tracing::warn!(
                    trigger_id = candidate.trigger_id,
                    will_id = candidate.will_id,
                    "Skipping inactivity trigger on a will with no check-in interval"
                );
                return None;
            };
            let condition = TriggerCondition::Inactivity {
                last_check_in: candidate.last_check_in,
                interval_days,
            };
            if condition.deadline().is_none() {
                tracing::warn!(
                    trigger_id = candidate.trigger_id,
                    will_id = candidate.will_id,
                    interval_days,
                    "Skipping inactivity trigger whose deadline overflows the timestamp range"
                );
                return None;
            }
            condition
        }
        TriggerKind::Date => {
            let Some(trigger_date) = candidate.trigger_date else {
                tracing::warn!(
                    trigger_id = candidate.trigger_id,
                    "Skipping date trigger with no trigger date"
                );
                return None;
            };
            TriggerCondition::Date { trigger_date }
        }
        TriggerKind::Manual => TriggerCondition::Manual {
            is_raised: candidate.is_raised,
        },
    };

    Some((kind, condition))
}
