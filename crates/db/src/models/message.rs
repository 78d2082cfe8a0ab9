//! Message entity model and DTOs.
//!
//! A message is one outbound item: recipient and payload together. It is
//! written once by the owner and sent at most once by the sweep.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use vigil_core::types::{DbId, Timestamp};

/// A row from the `messages` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Message {
    pub id: DbId,
    pub will_id: DbId,
    pub recipient_email: String,
    pub recipient_name: Option<String>,
    pub subject: String,
    pub body: String,
    /// Set exactly once, in the same transaction as the `sent` log row.
    pub is_sent: bool,
    pub sent_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// DTO for creating a message.
#[derive(Debug, Deserialize)]
pub struct CreateMessage {
    pub will_id: DbId,
    pub recipient_email: String,
    pub recipient_name: Option<String>,
    pub subject: String,
    pub body: String,
}
