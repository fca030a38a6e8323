//! Error types for the core crate.

use thiserror::Error;

/// Core error type.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Trust tier code outside the known table.
    #[error("Unknown trust tier code: {0} (must be between 0 and 3)")]
    UnknownTrustTier(u8),

    /// User class code outside the known table.
    #[error("Unknown user class code: {0} (must be between 0 and 5)")]
    UnknownUserClass(u8),

    /// Trust tier label not present in the known set.
    #[error("Unknown trust tier label: \"{0}\"")]
    UnknownTrustTierLabel(String),

    /// User class label not present in the known set.
    #[error("Unknown user class label: \"{0}\"")]
    UnknownUserClassLabel(String),
}

/// Result type alias for CoreError.
pub type Result<T> = std::result::Result<T, CoreError>;
