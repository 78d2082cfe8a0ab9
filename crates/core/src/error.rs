//! Domain error type.

/// Errors produced by the pure domain layer.
///
/// Database and transport failures carry their own error types; this one
/// covers the domain itself, chiefly enum strings read back from the
/// database that no longer parse.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),
}
