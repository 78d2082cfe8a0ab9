//! Trigger kinds and the trigger status state machine.
//!
//! A trigger row stores both fields as lowercase strings (CHECK-constrained
//! in the schema). This module is the single source of truth for parsing
//! them and for which status transitions the sweep may perform.

use serde::Serialize;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Trigger kinds
// ---------------------------------------------------------------------------

/// The firing conditions a trigger can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    /// Fires when the owner misses their check-in deadline.
    Inactivity,
    /// Fires on a fixed calendar date.
    Date,
    /// Fires once an external actor raises the trigger's flag.
    Manual,
}

/// All valid trigger kind strings.
const VALID_KIND_STRINGS: &[&str] = &["inactivity", "date", "manual"];

impl TriggerKind {
    /// Return the kind as the lowercase string stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inactivity => "inactivity",
            Self::Date => "date",
            Self::Manual => "manual",
        }
    }

    /// Parse a trigger kind from a string slice.
    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        match s {
            "inactivity" => Ok(Self::Inactivity),
            "date" => Ok(Self::Date),
            "manual" => Ok(Self::Manual),
            _ => Err(CoreError::Validation(format!(
                "Invalid trigger kind '{s}'. Must be one of: {}",
                VALID_KIND_STRINGS.join(", ")
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Trigger status state machine
// ---------------------------------------------------------------------------

/// Lifecycle of a trigger row.
///
/// `Pending` rows are the sweep's work queue. Both other statuses are
/// terminal: once a trigger leaves `Pending` it is never evaluated again,
/// which is what makes each trigger fire at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerStatus {
    Pending,
    Completed,
    Failed,
}

/// All valid trigger status strings.
const VALID_STATUS_STRINGS: &[&str] = &["pending", "completed", "failed"];

impl TriggerStatus {
    /// Return the status as the lowercase string stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Parse a trigger status from a string slice.
    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            _ => Err(CoreError::Validation(format!(
                "Invalid trigger status '{s}'. Must be one of: {}",
                VALID_STATUS_STRINGS.join(", ")
            ))),
        }
    }

    /// Terminal statuses never re-enter the sweep.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Returns the set of valid target statuses reachable from `self`.
    pub fn valid_transitions(&self) -> &'static [TriggerStatus] {
        match self {
            Self::Pending => &[Self::Completed, Self::Failed],
            Self::Completed | Self::Failed => &[],
        }
    }

    /// Check whether a transition from `self` to `to` is valid.
    pub fn can_transition(&self, to: TriggerStatus) -> bool {
        self.valid_transitions().contains(&to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // TriggerKind::as_str / from_str
    // -----------------------------------------------------------------------

    #[test]
    fn kind_inactivity_round_trip() {
        assert_eq!(TriggerKind::Inactivity.as_str(), "inactivity");
        assert_eq!(
            TriggerKind::from_str("inactivity").unwrap(),
            TriggerKind::Inactivity
        );
    }

    #[test]
    fn kind_date_round_trip() {
        assert_eq!(TriggerKind::Date.as_str(), "date");
        assert_eq!(TriggerKind::from_str("date").unwrap(), TriggerKind::Date);
    }

    #[test]
    fn kind_manual_round_trip() {
        assert_eq!(TriggerKind::Manual.as_str(), "manual");
        assert_eq!(TriggerKind::from_str("manual").unwrap(), TriggerKind::Manual);
    }

    #[test]
    fn kind_invalid_string_rejected() {
        let err = TriggerKind::from_str("countdown").unwrap_err();
        assert!(err.to_string().contains("inactivity, date, manual"));
    }

    #[test]
    fn kind_empty_string_rejected() {
        assert!(TriggerKind::from_str("").is_err());
    }

    // -----------------------------------------------------------------------
    // TriggerStatus::as_str / from_str
    // -----------------------------------------------------------------------

    #[test]
    fn status_pending_round_trip() {
        assert_eq!(TriggerStatus::Pending.as_str(), "pending");
        assert_eq!(
            TriggerStatus::from_str("pending").unwrap(),
            TriggerStatus::Pending
        );
    }

    #[test]
    fn status_completed_round_trip() {
        assert_eq!(TriggerStatus::Completed.as_str(), "completed");
        assert_eq!(
            TriggerStatus::from_str("completed").unwrap(),
            TriggerStatus::Completed
        );
    }

    #[test]
    fn status_failed_round_trip() {
        assert_eq!(TriggerStatus::Failed.as_str(), "failed");
        assert_eq!(
            TriggerStatus::from_str("failed").unwrap(),
            TriggerStatus::Failed
        );
    }

    #[test]
    fn status_invalid_string_rejected() {
        assert!(TriggerStatus::from_str("done").is_err());
    }

    // -----------------------------------------------------------------------
    // Valid transitions
    // -----------------------------------------------------------------------

    #[test]
    fn pending_to_completed() {
        assert!(TriggerStatus::Pending.can_transition(TriggerStatus::Completed));
    }

    #[test]
    fn pending_to_failed() {
        assert!(TriggerStatus::Pending.can_transition(TriggerStatus::Failed));
    }

    // -----------------------------------------------------------------------
    // Terminal states have no outgoing transitions
    // -----------------------------------------------------------------------

    #[test]
    fn completed_has_no_transitions() {
        assert!(TriggerStatus::Completed.valid_transitions().is_empty());
    }

    #[test]
    fn failed_has_no_transitions() {
        assert!(TriggerStatus::Failed.valid_transitions().is_empty());
    }

    #[test]
    fn completed_to_pending_invalid() {
        assert!(!TriggerStatus::Completed.can_transition(TriggerStatus::Pending));
    }

    #[test]
    fn failed_to_completed_invalid() {
        assert!(!TriggerStatus::Failed.can_transition(TriggerStatus::Completed));
    }

    #[test]
    fn pending_to_pending_invalid() {
        assert!(!TriggerStatus::Pending.can_transition(TriggerStatus::Pending));
    }

    // -----------------------------------------------------------------------
    // is_terminal
    // -----------------------------------------------------------------------

    #[test]
    fn pending_is_not_terminal() {
        assert!(!TriggerStatus::Pending.is_terminal());
    }

    #[test]
    fn completed_is_terminal() {
        assert!(TriggerStatus::Completed.is_terminal());
    }

    #[test]
    fn failed_is_terminal() {
        assert!(TriggerStatus::Failed.is_terminal());
    }
}
