//! Terminal chat client library.
//!
//! Joins or creates rooms through the room service's HTTP API, loads message
//! history, and exchanges live messages over STOMP on a WebSocket.

pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

// Re-export entry points
pub use config::ClientConfig;
pub use error::ClientError;
pub use ui::run as run_client;
