//! Error types for Live sessions.

use thiserror::Error;

/// Result type for Live session operations.
pub type Result<T> = std::result::Result<T, LiveError>;

/// Errors that can occur while establishing or driving a Live session.
#[derive(Error, Debug)]
pub enum LiveError {
    /// Invalid client configuration. Raised at construction, never retried.
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// WebSocket connection error (open failure or mid-session transport fault).
    #[error("WebSocket connection error: {0}")]
    ConnectionError(String),

    /// Authentication error (header injection or credential resolution).
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// A client intent could not be encoded to its wire envelope.
    #[error("Encoding error: {0}")]
    EncodeError(String),

    /// A wire frame violated the protocol (bad UTF-8, unexpected shape).
    #[error("Protocol error: {0}")]
    ProtocolError(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl LiveError {
    /// Create a new configuration error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Create a new connection error.
    pub fn connection<S: Into<String>>(msg: S) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a new authentication error.
    pub fn auth<S: Into<String>>(msg: S) -> Self {
        Self::AuthError(msg.into())
    }

    /// Create a new encoding error.
    pub fn encode<S: Into<String>>(msg: S) -> Self {
        Self::EncodeError(msg.into())
    }

    /// Create a new protocol error.
    pub fn protocol<S: Into<String>>(msg: S) -> Self {
        Self::ProtocolError(msg.into())
    }
}
