//! Pure elapsed-deadline math for each trigger kind.
//!
//! The sweep fetches candidate rows (pending trigger joined to an active
//! will) and asks this module whether each condition has elapsed at `now`.
//! Keeping the time math here rather than in SQL makes the deadline
//! boundaries unit-testable.

use chrono::{Duration, NaiveDate};

use crate::types::Timestamp;

/// A trigger's firing condition, decoupled from its database row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerCondition {
    /// The owner must check in at least every `interval_days`, measured
    /// from the will's `last_check_in`.
    Inactivity {
        last_check_in: Timestamp,
        interval_days: i32,
    },
    /// Fires on the given calendar date (UTC) and every day after.
    Date { trigger_date: NaiveDate },
    /// Fires once the flag has been raised by an external actor.
    Manual { is_raised: bool },
}

impl TriggerCondition {
    /// Whether the condition has elapsed at `now`.
    ///
    /// Inactivity uses a strict comparison: a sweep landing exactly on the
    /// deadline instant does not fire, and a deadline past the representable
    /// timestamp range never does. Date triggers compare at UTC day
    /// granularity and fire on the trigger date itself, not the day before.
    pub fn is_elapsed(&self, now: Timestamp) -> bool {
        match *self {
            Self::Inactivity { .. } => self.deadline().is_some_and(|deadline| now > deadline),
            Self::Date { trigger_date } => now.date_naive() >= trigger_date,
            Self::Manual { is_raised } => is_raised,
        }
    }

    /// The instant an inactivity condition elapses, if this is one.
    ///
    /// `None` for date and manual kinds, and for an interval that pushes
    /// the deadline past the representable timestamp range. Any i32 is a
    /// storable interval, so the addition here must not panic.
    pub fn deadline(&self) -> Option<Timestamp> {
        match *self {
            Self::Inactivity {
                last_check_in,
                interval_days,
            } => last_check_in.checked_add_signed(Duration::days(i64::from(interval_days))),
            Self::Date { .. } | Self::Manual { .. } => None,
        }
    }
}
