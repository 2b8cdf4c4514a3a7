//! Domain layer error definitions.

use thiserror::Error;

/// Errors related to Value Objects validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueObjectError {
    /// RoomId validation error
    #[error("RoomId cannot be empty")]
    RoomIdEmpty,

    /// UserName validation error
    #[error("UserName cannot be empty")]
    UserNameEmpty,

    /// MessageContent validation error (empty or whitespace only)
    #[error("MessageContent cannot be blank")]
    MessageContentBlank,
}

/// Errors returned by the room service port
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The service rejected the request (HTTP 400); carries the response body
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Any other non-success status
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    /// The request never got a response
    #[error("transport error: {0}")]
    Transport(String),

    /// The response could not be decoded into a domain model
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The request URL could not be built
    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

/// Errors returned by the message broker port
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BrokerError {
    /// Connecting or subscribing failed
    #[error("connection failed: {0}")]
    Connect(String),

    /// Publishing a message failed
    #[error("publish failed: {0}")]
    Publish(String),

    /// Closing the connection failed
    #[error("disconnect failed: {0}")]
    Disconnect(String),

    /// The connection is no longer open
    #[error("connection closed")]
    Closed,
}
