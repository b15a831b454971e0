//! Shared error types for surveydash.
//!
//! Only the fetch, configuration and export layers produce errors. The
//! aggregation layer absorbs malformed values locally and never fails.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for surveydash operations
#[derive(Debug, Error)]
pub enum Error {
    /// The data store rejected our credentials
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// A data store query failed for any other reason
    #[error("Query failed: {message}")]
    Query { message: String, retryable: bool },

    /// Configuration or dashboard definition problems
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        path: Option<PathBuf>,
    },

    /// Invalid user input (filter syntax, unknown chart ids, ...)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Export document could not be produced at all
    #[error("Export error: {0}")]
    Export(String),

    /// Generic errors with context
    #[error("{context}: {message}")]
    WithContext { context: String, message: String },

    /// IO errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// TOML errors
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Create a retryable query error
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
            retryable: true,
        }
    }

    /// Create a configuration error with path context
    pub fn configuration(message: impl Into<String>, path: Option<PathBuf>) -> Self {
        Self::Configuration {
            message: message.into(),
            path,
        }
    }

    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        match self {
            // Classified variants keep their variant.
            Self::Authentication(message) => {
                Self::Authentication(format!("{}: {}", context.into(), message))
            }
            Self::Query { message, retryable } => Self::Query {
                message: format!("{}: {}", context.into(), message),
                retryable,
            },
            other => Self::WithContext {
                context: context.into(),
                message: other.to_string(),
            },
        }
    }

    /// Credentials problem: retrying will not help, the user should check them.
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication(_))
    }

    /// Whether surfacing a retry affordance makes sense.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Query { retryable, .. } => *retryable,
            Self::Io(_) => true,
            _ => false,
        }
    }

    /// Message suitable for showing to a dashboard user.
    pub fn user_message(&self) -> String {
        if self.is_authentication() {
            format!("{self}. Check the data source credentials.")
        } else if self.is_retryable() {
            format!("{self}. Please try again.")
        } else {
            self.to_string()
        }
    }
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}
