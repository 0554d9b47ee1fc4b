//! Application error types.
//!
//! All errors use `thiserror` for automatic Error trait derivation and provide
//! clear error messages with context.

use thiserror::Error;

/// Application result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error enum for the toolgate adapter.
///
/// Blocked-invocation conditions (missing identity, pending
/// authorization, invalid arguments, remote-reported failure) are not
/// errors here: they travel through the configured short-circuit
/// channel and only surface as [`Error::Interrupted`] in interrupt mode.
#[derive(Error, Debug)]
pub enum Error {
    /// Tool name lookup failed. Propagated, never recovered.
    #[error("tool not found: {0}")]
    ToolNotFound(String),

    /// Schema derivation or wrapping failed for one definition.
    /// Recovered (logged and skipped) during bulk wrapping only.
    #[error("tool wrap failed: {0}")]
    ToolWrap(String),

    /// Flow interruption raised in place of a blocked-call payload.
    /// Graph engines catch this to pause the surrounding workflow.
    #[error("flow interrupted: {0}")]
    Interrupted(String),

    /// Gateway refused or failed a request (non-success HTTP status,
    /// failed authorization).
    #[error("gateway error: {0}")]
    Gateway(String),

    /// Configuration errors.
    #[error("configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization errors.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP transport errors.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl Error {
    /// True when this error is the pause signal a graph engine should
    /// intercept rather than treat as a failure.
    pub fn is_interrupt(&self) -> bool {
        matches!(self, Error::Interrupted(_))
    }
}

// Convenience constructors
impl Error {
    pub fn tool_not_found(msg: impl Into<String>) -> Self {
        Self::ToolNotFound(msg.into())
    }

    pub fn tool_wrap(msg: impl Into<String>) -> Self {
        Self::ToolWrap(msg.into())
    }

    pub fn interrupted(msg: impl Into<String>) -> Self {
        Self::Interrupted(msg.into())
    }

    pub fn gateway(msg: impl Into<String>) -> Self {
        Self::Gateway(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
