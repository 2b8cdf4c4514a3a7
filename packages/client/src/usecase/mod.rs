//! UseCase 層
//!
//! クライアントの操作（ルーム参加・作成、チャット画面の開始、送信、ログアウト）を実装するレイヤー。
//! UI 層から呼び出され、Domain 層の port を操作します。

pub mod chat_session;
pub mod create_room;
pub mod error;
pub mod join_room;

pub use chat_session::{ActiveChat, ChatSessionUseCase};
pub use create_room::CreateRoomUseCase;
pub use error::{ChatError, JoinError};
pub use join_room::JoinRoomUseCase;
