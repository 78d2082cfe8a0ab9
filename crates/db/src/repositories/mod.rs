//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async operations that
//! accept `&PgPool` as the first argument. Flag and status columns are only
//! ever flipped through the conditional UPDATEs here; callers check the
//! returned `bool` instead of assuming the write happened.

pub mod dispatch_log_repo;
pub mod message_repo;
pub mod trigger_repo;
pub mod user_repo;
pub mod will_repo;

pub use dispatch_log_repo::DispatchLogRepo;
pub use message_repo::MessageRepo;
pub use trigger_repo::TriggerRepo;
pub use user_repo::UserRepo;
pub use will_repo::WillRepo;
