//! Core domain models for the chat client.

use chrono::{DateTime, Utc};

use super::value_object::{MessageContent, RoomId, UserName};

/// A chat room as returned by the room service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    /// Storage identifier assigned by the service, if it exposes one
    pub id: Option<String>,
    /// Room identifier users type to join
    pub room_id: RoomId,
    /// Messages embedded in the room object (may be empty)
    pub messages: Vec<ChatMessage>,
}

/// A message received from the service, either from history or live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Name of the user who sent the message
    pub sender: String,
    /// Message text
    pub content: String,
    /// Room the message belongs to, when the service includes it
    pub room_id: Option<String>,
    /// Server-assigned send time
    pub timestamp: Option<DateTime<Utc>>,
}

impl ChatMessage {
    /// Whether this message was sent under the given user name
    pub fn is_from(&self, user: &UserName) -> bool {
        self.sender == user.as_str()
    }
}

/// A message the current user publishes to a room
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub sender: UserName,
    pub content: MessageContent,
    pub room_id: RoomId,
}

/// Session state shared between the join and chat views.
///
/// Starts empty and disconnected, is filled on a successful join or create,
/// and is cleared on logout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub room_id: Option<RoomId>,
    pub current_user: Option<UserName>,
    pub connected: bool,
}

impl Session {
    /// Session after a successful join/create
    pub fn joined(current_user: UserName, room_id: RoomId) -> Self {
        Self {
            room_id: Some(room_id),
            current_user: Some(current_user),
            connected: true,
        }
    }

    /// Room and user, only when connected
    pub fn active(&self) -> Option<(&RoomId, &UserName)> {
        if !self.connected {
            return None;
        }
        match (&self.room_id, &self.current_user) {
            (Some(room_id), Some(user)) => Some((room_id, user)),
            _ => None,
        }
    }
}

/// Ordered message list of an open chat view.
///
/// Messages are only ever appended. Nothing is reordered or deduplicated;
/// the list lives as long as the chat view.
#[derive(Debug, Clone, Default)]
pub struct MessageLog {
    messages: Vec<ChatMessage>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one message at the end
    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Append a batch (history) at the end, keeping its order
    pub fn extend(&mut self, messages: impl IntoIterator<Item = ChatMessage>) {
        self.messages.extend(messages);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
