//! Room service port.
//!
//! The infrastructure layer provides the HTTP implementation; use cases only
//! see this trait.

use async_trait::async_trait;

use super::{
    entity::{ChatMessage, Room},
    error::ApiError,
    value_object::RoomId,
};

/// Default number of history messages fetched when a chat view opens
pub const DEFAULT_HISTORY_PAGE_SIZE: u32 = 50;

/// Access to the remote room service
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoomApi: Send + Sync {
    /// Create a new room. Fails with `ApiError::BadRequest` if it already exists.
    async fn create_room(&self, room_id: &RoomId) -> Result<Room, ApiError>;

    /// Look up an existing room to join it
    async fn join_room(&self, room_id: &RoomId) -> Result<Room, ApiError>;

    /// Fetch one page of message history, oldest first
    async fn get_messages(
        &self,
        room_id: &RoomId,
        size: u32,
        page: u32,
    ) -> Result<Vec<ChatMessage>, ApiError>;
}
