//! Wire formats of the room service and the chat broker.

pub mod http;
pub mod message;

pub use http::{MessagePageDto, RoomDto};
pub use message::{MessageDto, SendMessageDto};
