//! Vigil domain core: shared types and pure scheduling logic.
//!
//! This crate has zero internal deps so the persistence layer, the sweep
//! scheduler, and any future API or CLI surface can all build on it:
//!
//! - [`types`] — ID and timestamp aliases shared across crates.
//! - [`trigger`] — trigger kinds, statuses, and the status state machine.
//! - [`condition`] — pure elapsed-deadline math for each trigger kind.
//! - [`dispatch_status`] — forward-only delivery receipt progression.
//! - [`error`] — the domain error type.

pub mod condition;
pub mod dispatch_status;
pub mod error;
pub mod trigger;
pub mod types;

pub use condition::TriggerCondition;
pub use dispatch_status::DispatchStatus;
pub use error::CoreError;
pub use trigger::{TriggerKind, TriggerStatus};
pub use types::{DbId, Timestamp};
