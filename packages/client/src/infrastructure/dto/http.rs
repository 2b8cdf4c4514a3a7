//! HTTP API response DTOs for the room service.

use serde::{Deserialize, Serialize};

use super::message::MessageDto;
use crate::domain::{ApiError, Room, RoomId};

/// Room object returned by create and join
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDto {
    #[serde(default)]
    pub id: Option<String>,
    pub room_id: String,
    #[serde(default)]
    pub messages: Vec<MessageDto>,
}

impl TryFrom<RoomDto> for Room {
    type Error = ApiError;

    fn try_from(dto: RoomDto) -> Result<Self, Self::Error> {
        let room_id = RoomId::new(dto.room_id)
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;
        Ok(Room {
            id: dto.id,
            room_id,
            messages: dto.messages.into_iter().map(Into::into).collect(),
        })
    }
}

/// Message history response.
///
/// The service returns a plain list; a paged object with a `content` list is
/// accepted as well.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MessagePageDto {
    List(Vec<MessageDto>),
    Page { content: Vec<MessageDto> },
}

impl MessagePageDto {
    pub fn into_messages(self) -> Vec<MessageDto> {
        match self {
            MessagePageDto::List(messages) => messages,
            MessagePageDto::Page { content } => content,
        }
    }
}
