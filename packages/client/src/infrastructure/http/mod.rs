//! HTTP adapters.

pub mod room_api;

pub use room_api::HttpRoomApi;
