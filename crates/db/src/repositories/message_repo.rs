//! Repository for the `messages` table.

use sqlx::PgPool;
use vigil_core::types::DbId;

use crate::models::message::{CreateMessage, Message};

/// Column list for `messages` queries.
const COLUMNS: &str = "id, will_id, recipient_email, recipient_name, subject, body, \
    is_sent, sent_at, created_at";

/// Provides operations for message records.
pub struct MessageRepo;

impl MessageRepo {
    /// Insert a new message.
    pub async fn create(pool: &PgPool, input: &CreateMessage) -> Result<Message, sqlx::Error> {
        let query = format!(
            "INSERT INTO messages (will_id, recipient_email, recipient_name, subject, body) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Message>(&query)
            .bind(input.will_id)
            .bind(&input.recipient_email)
            .bind(&input.recipient_name)
            .bind(&input.subject)
            .bind(&input.body)
            .fetch_one(pool)
            .await
    }

    /// Find a message by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Message>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM messages WHERE id = $1");
        sqlx::query_as::<_, Message>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all messages of a will, oldest first.
    pub async fn list_for_will(pool: &PgPool, will_id: DbId) -> Result<Vec<Message>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM messages WHERE will_id = $1 ORDER BY id");
        sqlx::query_as::<_, Message>(&query)
            .bind(will_id)
            .fetch_all(pool)
            .await
    }

    /// List the messages of a will that have not been sent yet, oldest first.
    ///
    /// This is the dispatch work list for a claimed will. On a retry pass it
    /// naturally excludes everything already delivered.
    pub async fn list_unsent_for_will(
        pool: &PgPool,
        will_id: DbId,
    ) -> Result<Vec<Message>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM messages \
             WHERE will_id = $1 AND is_sent = FALSE \
             ORDER BY id"
        );
        sqlx::query_as::<_, Message>(&query)
            .bind(will_id)
            .fetch_all(pool)
            .await
    }
}
