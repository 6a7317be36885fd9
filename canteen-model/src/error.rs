//! Error types for model parsing

use thiserror::Error;

/// Model errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// Unknown order status string
    #[error("Unknown order status: {0}")]
    UnknownStatus(String),

    /// UTC offset outside the valid range
    #[error("Invalid UTC offset: {0} minutes")]
    InvalidOffset(i32),
}
