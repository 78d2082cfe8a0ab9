//! Dispatch log status progression.
//!
//! Every dispatch log row tracks one delivery attempt, from handoff to the
//! mail transport through the recipient's read receipt. The progression is
//! forward-only: receipt confirmations arriving late or out of order must
//! never move a row backwards.

use serde::Serialize;

use crate::error::CoreError;

/// Delivery lifecycle of a dispatch log row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchStatus {
    /// Recorded but not yet handed to the transport.
    Pending,
    /// Accepted by the mail transport.
    Sent,
    /// Delivery receipt received.
    Delivered,
    /// Read receipt received. Terminal.
    Read,
    /// The send attempt failed. Terminal.
    Failed,
}

/// All valid dispatch status strings.
const VALID_STATUS_STRINGS: &[&str] = &["pending", "sent", "delivered", "read", "failed"];

impl DispatchStatus {
    /// Return the status as the lowercase string stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Sent => "sent",
            Self::Delivered => "delivered",
            Self::Read => "read",
            Self::Failed => "failed",
        }
    }

    /// Parse a dispatch status from a string slice.
    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        match s {
            "pending" => Ok(Self::Pending),
            "sent" => Ok(Self::Sent),
            "delivered" => Ok(Self::Delivered),
            "read" => Ok(Self::Read),
            "failed" => Ok(Self::Failed),
            _ => Err(CoreError::Validation(format!(
                "Invalid dispatch status '{s}'. Must be one of: {}",
                VALID_STATUS_STRINGS.join(", ")
            ))),
        }
    }

    /// Returns the set of valid target statuses reachable from `self`.
    ///
    /// A read receipt may arrive without a preceding delivery receipt
    /// (`Sent -> Read` is legal; the repository backfills `delivered_at`).
    pub fn valid_transitions(&self) -> &'static [DispatchStatus] {
        match self {
            Self::Pending => &[Self::Sent, Self::Failed],
            Self::Sent => &[Self::Delivered, Self::Read, Self::Failed],
            Self::Delivered => &[Self::Read],
            Self::Read | Self::Failed => &[],
        }
    }

    /// Check whether a transition from `self` to `to` is valid.
    pub fn can_transition(&self, to: DispatchStatus) -> bool {
        self.valid_transitions().contains(&to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // Valid transitions
    // -----------------------------------------------------------------------

    #[test]
    fn pending_to_sent() {
        assert!(DispatchStatus::Pending.can_transition(DispatchStatus::Sent));
    }

    #[test]
    fn pending_to_failed() {
        assert!(DispatchStatus::Pending.can_transition(DispatchStatus::Failed));
    }

    #[test]
    fn sent_to_delivered() {
        assert!(DispatchStatus::Sent.can_transition(DispatchStatus::Delivered));
    }

    #[test]
    fn sent_to_read_without_delivery_receipt() {
        assert!(DispatchStatus::Sent.can_transition(DispatchStatus::Read));
    }

    #[test]
    fn sent_to_failed() {
        assert!(DispatchStatus::Sent.can_transition(DispatchStatus::Failed));
    }

    #[test]
    fn delivered_to_read() {
        assert!(DispatchStatus::Delivered.can_transition(DispatchStatus::Read));
    }

    // -----------------------------------------------------------------------
    // Terminal states have no outgoing transitions
    // -----------------------------------------------------------------------

    #[test]
    fn read_has_no_transitions() {
        assert!(DispatchStatus::Read.valid_transitions().is_empty());
    }

    #[test]
    fn failed_has_no_transitions() {
        assert!(DispatchStatus::Failed.valid_transitions().is_empty());
    }

    // -----------------------------------------------------------------------
    // Backwards moves are invalid
    // -----------------------------------------------------------------------

    #[test]
    fn read_to_delivered_invalid() {
        assert!(!DispatchStatus::Read.can_transition(DispatchStatus::Delivered));
    }

    #[test]
    fn delivered_to_sent_invalid() {
        assert!(!DispatchStatus::Delivered.can_transition(DispatchStatus::Sent));
    }

    #[test]
    fn delivered_to_failed_invalid() {
        assert!(!DispatchStatus::Delivered.can_transition(DispatchStatus::Failed));
    }

    #[test]
    fn failed_to_sent_invalid() {
        assert!(!DispatchStatus::Failed.can_transition(DispatchStatus::Sent));
    }

    #[test]
    fn sent_to_pending_invalid() {
        assert!(!DispatchStatus::Sent.can_transition(DispatchStatus::Pending));
    }

    // -----------------------------------------------------------------------
    // as_str / from_str
    // -----------------------------------------------------------------------

    #[test]
    fn all_statuses_round_trip() {
        for status in [
            DispatchStatus::Pending,
            DispatchStatus::Sent,
            DispatchStatus::Delivered,
            DispatchStatus::Read,
            DispatchStatus::Failed,
        ] {
            assert_eq!(DispatchStatus::from_str(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn invalid_string_rejected() {
        let err = DispatchStatus::from_str("bounced").unwrap_err();
        assert!(err.to_string().contains("pending, sent, delivered"));
    }
}
