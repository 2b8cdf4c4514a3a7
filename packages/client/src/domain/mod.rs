//! Domain layer for the chat client.
//!
//! This module contains the client's models and the ports (traits) the
//! infrastructure layer implements. It does not depend on HTTP or STOMP
//! details.

pub mod broker;
pub mod entity;
pub mod error;
pub mod repository;
pub mod value_object;

pub use broker::{MessageBroker, RoomConnection, RoomHandle};
pub use entity::{ChatMessage, MessageLog, OutgoingMessage, Room, Session};
pub use error::{ApiError, BrokerError, ValueObjectError};
pub use repository::RoomApi;
pub use value_object::{MessageContent, RoomId, UserName};
