//! Centralized error types for the Sunshine workspace.
//!
//! Sync failures are terminal where they happen: components log them and
//! carry on. The types exist so the log lines and the occasional caller
//! that does want to inspect a failure share one vocabulary.

use thiserror::Error;

/// Errors raised by the shared data layer and the client handles on top of it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// Establishing the transport connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Transport is temporarily unavailable; in-flight publishes fail.
    #[error("Connection suspended")]
    ConnectionSuspended,

    /// The result callback of a publish reported non-success.
    #[error("Publish to {path} failed: {reason}")]
    PublishFailed { path: String, reason: String },

    #[error("Failed to encode data map: {0}")]
    Encode(String),
}

impl SyncError {
    pub fn user_message(&self) -> &'static str {
        match self {
            SyncError::ConnectionFailed(_) => "Unable to reach the paired device.",
            SyncError::ConnectionSuspended => "Connection to the paired device was interrupted.",
            SyncError::PublishFailed { .. } => "Weather data could not be sent.",
            SyncError::Encode(_) => "Weather data could not be prepared for sending.",
        }
    }

    /// Whether a later attempt might succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SyncError::ConnectionFailed(_)
                | SyncError::ConnectionSuspended
                | SyncError::PublishFailed { .. }
        )
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::ParseError(_) => "Configuration file is malformed. Check your settings.",
        }
    }
}
