//! Unified error type definition

use serde::Serialize;
use thiserror::Error;

use crate::types::FieldErrors;

/// Core layer error type
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum CoreError {
    /// Field-level validation failed; never reaches the transport
    #[error("Validation error: {0}")]
    Validation(FieldErrors),

    /// A required prior selection is missing (e.g. no disk chosen)
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// The paired list/count fetch failed
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// The transport rejected a save call
    #[error("Submission error: {0}")]
    Submission(String),

    /// Transport level failure (HTTP status or non-zero API code)
    #[error("Transport error ({status}): {message}")]
    Transport { status: u16, message: String },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Vendor identifier not recognised
    #[error("Unknown vendor: {0}")]
    UnknownVendor(String),

    /// Invalid configuration
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

impl CoreError {
    /// Whether it is expected behavior (user input, missing selection, etc.), used for log classification.
    ///
    /// Level `warn` should be used when returning `true` and level `error` when returning `false`.
    /// **Please update this method simultaneously when new variants are added.**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::Precondition(_) | Self::UnknownVendor(_)
        )
    }

    /// Message suitable for a user-facing notification.
    ///
    /// Transport failures carry the backend's own message, which is shown as is.
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport { message, .. }
            | Self::Fetch(message)
            | Self::Submission(message)
            | Self::Precondition(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Core layer Result type alias
pub type CoreResult<T> = std::result::Result<T, CoreError>;
