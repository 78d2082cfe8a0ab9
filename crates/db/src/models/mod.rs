//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts

pub mod dispatch_log;
pub mod message;
pub mod trigger;
pub mod user;
pub mod will;
