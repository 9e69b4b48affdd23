//! Client error types.

use thiserror::Error;

/// Client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to connect to {addr}: {source}")]
    Dial {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("connect timeout")]
    Timeout,

    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("protocol error: {0}")]
    Protocol(#[from] rcon_protocol::ProtocolError),

    #[error("connection closed")]
    ConnectionClosed,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid address: {0}")]
    InvalidAddress(String),
}

impl ClientError {
    /// Returns whether retrying on a fresh connection might succeed.
    ///
    /// Nothing in this crate retries; this is for callers building their own policy.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ClientError::Dial { .. }
                | ClientError::Timeout
                | ClientError::ConnectionClosed
                | ClientError::Io(_)
        )
    }
}
