//! Integration tests for the dispatch audit trail.
//!
//! Verifies the writes the sweep and the receipt endpoints rely on:
//! - `record_sent` marks the message and appends its `sent` row atomically,
//!   and can never produce a second `sent` row for the same message
//! - `record_failed` logs the attempt while leaving the message unsent
//! - Receipt updates only ever move a row forward
//! - A read receipt backfills a missing delivery receipt

use chrono::Utc;
use sqlx::PgPool;

use vigil_db::models::message::{CreateMessage, Message};
use vigil_db::models::user::CreateUser;
use vigil_db::models::will::{CreateWill, Will};
use vigil_db::repositories::{DispatchLogRepo, MessageRepo, UserRepo, WillRepo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_will(pool: &PgPool) -> Will {
    let user = UserRepo::create(
        pool,
        &CreateUser {
            email: "owner@example.com".to_string(),
            display_name: None,
        },
    )
    .await
    .unwrap();
    WillRepo::create(
        pool,
        &CreateWill {
            user_id: user.id,
            subject: "Estate".to_string(),
            body: "Instructions are with the notary.".to_string(),
            check_in_interval_days: Some(7),
        },
    )
    .await
    .unwrap()
}

async fn seed_message(pool: &PgPool, will_id: i64, recipient: &str) -> Message {
    MessageRepo::create(
        pool,
        &CreateMessage {
            will_id,
            recipient_email: recipient.to_string(),
            recipient_name: None,
            subject: "A message left for you".to_string(),
            body: "Please contact the notary.".to_string(),
        },
    )
    .await
    .unwrap()
}

async fn reload_message(pool: &PgPool, id: i64) -> Message {
    MessageRepo::find_by_id(pool, id).await.unwrap().unwrap()
}

// ---------------------------------------------------------------------------
// Send recording
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn record_sent_marks_message_and_appends_row(pool: PgPool) {
    let will = seed_will(&pool).await;
    let message = seed_message(&pool, will.id, "heir@example.com").await;

    assert!(
        DispatchLogRepo::record_sent(&pool, will.id, message.id, "heir@example.com", Utc::now())
            .await
            .unwrap()
    );

    let message = reload_message(&pool, message.id).await;
    assert!(message.is_sent);
    assert!(message.sent_at.is_some());

    let log = DispatchLogRepo::list_for_will(&pool, will.id).await.unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].status, "sent");
    assert_eq!(log[0].message_id, message.id);
    assert_eq!(log[0].recipient_email, "heir@example.com");
    assert!(log[0].sent_at.is_some());
}

#[sqlx::test(migrations = "./migrations")]
async fn record_sent_is_one_way(pool: PgPool) {
    let will = seed_will(&pool).await;
    let message = seed_message(&pool, will.id, "heir@example.com").await;

    assert!(
        DispatchLogRepo::record_sent(&pool, will.id, message.id, "heir@example.com", Utc::now())
            .await
            .unwrap()
    );
    let sent_at = reload_message(&pool, message.id).await.sent_at;

    // The duplicate attempt is rejected whole: no flag change, no row.
    assert!(
        !DispatchLogRepo::record_sent(&pool, will.id, message.id, "heir@example.com", Utc::now())
            .await
            .unwrap()
    );
    assert_eq!(reload_message(&pool, message.id).await.sent_at, sent_at);
    assert_eq!(
        DispatchLogRepo::list_for_will(&pool, will.id)
            .await
            .unwrap()
            .len(),
        1
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn record_failed_leaves_the_message_unsent(pool: PgPool) {
    let will = seed_will(&pool).await;
    let message = seed_message(&pool, will.id, "heir@example.com").await;

    DispatchLogRepo::record_failed(
        &pool,
        will.id,
        message.id,
        "heir@example.com",
        "SMTP transport error: connection refused",
    )
    .await
    .unwrap();

    let log = DispatchLogRepo::list_for_will(&pool, will.id).await.unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].status, "failed");
    assert!(log[0].error.as_deref().unwrap().contains("connection refused"));
    assert!(log[0].sent_at.is_none());

    // Still queued for the next attempt.
    assert!(!reload_message(&pool, message.id).await.is_sent);
    let unsent = MessageRepo::list_unsent_for_will(&pool, will.id).await.unwrap();
    assert_eq!(unsent.len(), 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn unsent_listing_shrinks_as_messages_send(pool: PgPool) {
    let will = seed_will(&pool).await;
    let first = seed_message(&pool, will.id, "first@example.com").await;
    let second = seed_message(&pool, will.id, "second@example.com").await;

    DispatchLogRepo::record_sent(&pool, will.id, first.id, "first@example.com", Utc::now())
        .await
        .unwrap();

    let unsent = MessageRepo::list_unsent_for_will(&pool, will.id).await.unwrap();
    assert_eq!(unsent.len(), 1);
    assert_eq!(unsent[0].id, second.id);

    // Sending narrows the work list, not the will's message set.
    let all = MessageRepo::list_for_will(&pool, will.id).await.unwrap();
    assert_eq!(all.len(), 2);
}

// ---------------------------------------------------------------------------
// Receipts
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn receipts_progress_forward_only(pool: PgPool) {
    let will = seed_will(&pool).await;
    let message = seed_message(&pool, will.id, "heir@example.com").await;
    DispatchLogRepo::record_sent(&pool, will.id, message.id, "heir@example.com", Utc::now())
        .await
        .unwrap();
    let entry_id = DispatchLogRepo::list_for_will(&pool, will.id).await.unwrap()[0].id;

    assert!(DispatchLogRepo::mark_delivered(&pool, entry_id, Utc::now())
        .await
        .unwrap());
    assert!(DispatchLogRepo::mark_read(&pool, entry_id, Utc::now())
        .await
        .unwrap());

    // Once read, a late delivery receipt cannot move the row back.
    assert!(!DispatchLogRepo::mark_delivered(&pool, entry_id, Utc::now())
        .await
        .unwrap());

    let log = DispatchLogRepo::list_for_will(&pool, will.id).await.unwrap();
    assert_eq!(log[0].status, "read");
    assert!(log[0].delivered_at.is_some());
    assert!(log[0].read_at.is_some());
}

#[sqlx::test(migrations = "./migrations")]
async fn read_receipt_backfills_delivery(pool: PgPool) {
    let will = seed_will(&pool).await;
    let message = seed_message(&pool, will.id, "heir@example.com").await;
    DispatchLogRepo::record_sent(&pool, will.id, message.id, "heir@example.com", Utc::now())
        .await
        .unwrap();
    let entry_id = DispatchLogRepo::list_for_will(&pool, will.id).await.unwrap()[0].id;

    // The read receipt arrives without a prior delivery receipt.
    assert!(DispatchLogRepo::mark_read(&pool, entry_id, Utc::now())
        .await
        .unwrap());

    let log = DispatchLogRepo::list_for_will(&pool, will.id).await.unwrap();
    assert_eq!(log[0].status, "read");
    assert_eq!(log[0].delivered_at, log[0].read_at);
}

#[sqlx::test(migrations = "./migrations")]
async fn failed_rows_take_no_receipts(pool: PgPool) {
    let will = seed_will(&pool).await;
    let message = seed_message(&pool, will.id, "heir@example.com").await;
    DispatchLogRepo::record_failed(&pool, will.id, message.id, "heir@example.com", "bounced")
        .await
        .unwrap();
    let entry_id = DispatchLogRepo::list_for_will(&pool, will.id).await.unwrap()[0].id;

    assert!(!DispatchLogRepo::mark_delivered(&pool, entry_id, Utc::now())
        .await
        .unwrap());
    assert!(!DispatchLogRepo::mark_read(&pool, entry_id, Utc::now())
        .await
        .unwrap());
    assert_eq!(
        DispatchLogRepo::list_for_will(&pool, will.id).await.unwrap()[0].status,
        "failed"
    );
}
