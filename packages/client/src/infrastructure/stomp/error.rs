//! STOMP error types

use thiserror::Error;

/// STOMP codec and connection errors
#[derive(Error, Debug)]
pub enum StompError {
    /// WebSocket error
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Malformed frame
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Unknown frame command
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// Header contains an undefined escape sequence
    #[error("Invalid header escape: {0}")]
    InvalidEscape(String),

    /// The broker answered with an ERROR frame
    #[error("Broker error: {message}")]
    Broker { message: String, body: String },

    /// Socket closed before the expected frame arrived
    #[error("Connection closed")]
    ConnectionClosed,

    /// Operation on a connection that is not open
    #[error("Not connected")]
    NotConnected,

    /// The broker did not answer in time
    #[error("Timed out waiting for {0}")]
    Timeout(String),
}

/// STOMP result type
pub type Result<T> = std::result::Result<T, StompError>;
