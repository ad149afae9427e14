//! Application error types with rich context

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Result type alias for Entity Client calls
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Application error types organized by layer/domain
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Common/Infrastructure Errors
    // ─────────────────────────────────────────────────────────────
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Configuration file not found: {}", path.display())]
    ConfigNotFound { path: PathBuf },

    // ─────────────────────────────────────────────────────────────
    // Console Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid route: {route}")]
    InvalidRoute { route: String },

    #[error("Console input error: {message}")]
    Input { message: String },

    #[error("Failed to install signal handler: {message}")]
    Signal { message: String },
}

// ─────────────────────────────────────────────────────────────────
// Convenience Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn invalid_route(route: impl Into<String>) -> Self {
        Self::InvalidRoute {
            route: route.into(),
        }
    }

    pub fn input(message: impl Into<String>) -> Self {
        Self::Input {
            message: message.into(),
        }
    }

    pub fn signal(message: impl Into<String>) -> Self {
        Self::Signal {
            message: message.into(),
        }
    }

    /// Whether the console has to stop.
    ///
    /// A rejected command line or route only costs that one command.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::ConfigNotFound { .. } | Error::Signal { .. })
    }
}

// ─────────────────────────────────────────────────────────────────
// Entity Client Errors
// ─────────────────────────────────────────────────────────────────

/// Failure of a single Entity Client call.
///
/// These never reach the render layer as-is: the resource cell and the
/// mutation dispatcher turn them into display strings via
/// [`ApiError::user_message`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Transport failure, no response from the backend
    #[error("Network error: {message}")]
    Network { message: String },

    /// Rejected by the backend despite local validation passing
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Entity does not exist (possibly deleted by another actor)
    #[error("Not found: {message}")]
    NotFound { message: String },
}

impl ApiError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Short machine-readable kind for log fields
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Network { .. } => "network",
            ApiError::Validation { .. } => "validation",
            ApiError::NotFound { .. } => "not_found",
        }
    }

    /// Normalize to a display message.
    ///
    /// Backend-supplied messages (validation, not found) are shown as-is;
    /// transport failures carry nothing useful for the user and fall back to
    /// the caller's wording.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Validation { message } | ApiError::NotFound { message }
                if !message.trim().is_empty() =>
            {
                message.clone()
            }
            _ => fallback.to_string(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Context Logging
// ─────────────────────────────────────────────────────────────────

/// Converts a failure into [`Error`] and logs it under a label naming the
/// step that failed. The error itself is passed through unchanged.
pub trait ResultExt<T> {
    fn context(self, step: impl Into<String>) -> Result<T>;

    /// Like [`ResultExt::context`], building the label only on failure
    fn with_context<F>(self, step: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, step: impl Into<String>) -> Result<T> {
        self.with_context(|| step.into())
    }

    fn with_context<F>(self, step: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err: Error = e.into();
            tracing::error!(fatal = err.is_fatal(), "{} failed: {}", step(), err);
            err
        })
    }
}
