//! Message broker port.
//!
//! A connection is scoped to one room: connecting subscribes to the room's
//! topic and hands back the inbound message channel plus a handle for
//! publishing and disconnecting.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{
    entity::{ChatMessage, OutgoingMessage},
    error::BrokerError,
    value_object::RoomId,
};

/// An open, subscribed room connection
pub struct RoomConnection {
    /// Inbound messages in arrival order. Closed when the connection ends.
    pub inbound: mpsc::UnboundedReceiver<ChatMessage>,
    /// Publish/disconnect handle
    pub handle: Box<dyn RoomHandle>,
}

/// Outbound side of a room connection
#[async_trait]
pub trait RoomHandle: Send + Sync {
    /// Publish a message to the room
    async fn publish(&self, message: &OutgoingMessage) -> Result<(), BrokerError>;

    /// Close the connection. Safe to call on an already closed connection.
    async fn disconnect(&self) -> Result<(), BrokerError>;

    /// Whether the underlying connection is still open
    fn is_open(&self) -> bool;
}

/// Opens room connections
#[async_trait]
pub trait MessageBroker: Send + Sync {
    /// Connect to the broker and subscribe to the room's topic
    async fn connect(&self, room_id: &RoomId) -> Result<RoomConnection, BrokerError>;
}
