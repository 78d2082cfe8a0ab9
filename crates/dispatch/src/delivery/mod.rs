//! Outbound message delivery.
//!
//! The orchestrator talks to the outside world through the [`Delivery`]
//! trait so tests can substitute a recording fake and deployments without
//! SMTP credentials degrade to [`DisabledDelivery`] instead of dropping
//! messages on the floor.

pub mod email;

use std::time::Duration;

use async_trait::async_trait;

pub use email::{SmtpConfig, SmtpDelivery};

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),

    /// The send did not finish within the per-delivery budget.
    #[error("Delivery timed out after {0:?}")]
    TimedOut(Duration),

    /// No delivery transport is configured (`SMTP_HOST` unset).
    #[error("Delivery transport is not configured")]
    NotConfigured,
}

// ---------------------------------------------------------------------------
// Delivery trait
// ---------------------------------------------------------------------------

/// One-shot delivery of a message to a single recipient.
#[async_trait]
pub trait Delivery: Send + Sync {
    /// Deliver `body` to `to` under `subject`.
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), DeliveryError>;
}

// ---------------------------------------------------------------------------
// DisabledDelivery
// ---------------------------------------------------------------------------

/// Stand-in transport for deployments without SMTP configuration.
///
/// Every send fails with [`DeliveryError::NotConfigured`]. The orchestrator
/// treats that variant specially: the unit is deferred rather than
/// finalized, so messages go out once a real transport is configured.
pub struct DisabledDelivery;

#[async_trait]
impl Delivery for DisabledDelivery {
    async fn send(&self, _to: &str, _subject: &str, _body: &str) -> Result<(), DeliveryError> {
        Err(DeliveryError::NotConfigured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[tokio::test]
    async fn disabled_delivery_always_fails() {
        let err = DisabledDelivery
            .send("a@example.com", "subject", "body")
            .await
            .unwrap_err();
        assert_matches!(err, DeliveryError::NotConfigured);
    }

    #[test]
    fn timed_out_display_names_the_budget() {
        let err = DeliveryError::TimedOut(Duration::from_secs(30));
        assert_eq!(err.to_string(), "Delivery timed out after 30s");
    }
}
