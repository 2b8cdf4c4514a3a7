//! Infrastructure layer
//!
//! ドメイン層が定義する port（`RoomApi`, `MessageBroker`）の具体的な実装を提供します。
//! HTTP は reqwest、リアルタイム配信は WebSocket 上の STOMP を使用します。

pub mod broker;
pub mod dto;
pub mod http;
pub mod stomp;

pub use broker::StompMessageBroker;
pub use http::HttpRoomApi;
