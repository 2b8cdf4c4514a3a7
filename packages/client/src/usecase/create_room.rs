//! UseCase: ルーム作成処理
//!
//! 入力検証とセッション更新は参加処理と同じで、呼び出す endpoint だけが異なります。

use std::sync::Arc;

use crate::{
    domain::{Room, RoomApi},
    ui::state::ChatContext,
};

use super::{error::JoinError, join_room::validate_form};

/// ルーム作成のユースケース
pub struct CreateRoomUseCase {
    api: Arc<dyn RoomApi>,
    context: ChatContext,
}

impl CreateRoomUseCase {
    /// 新しい CreateRoomUseCase を作成
    pub fn new(api: Arc<dyn RoomApi>, context: ChatContext) -> Self {
        Self { api, context }
    }

    /// ルーム作成を実行
    ///
    /// 既に存在するルーム ID はサービスが 400 で拒否し、`JoinError::BadRequest` になります。
    pub async fn execute(&self, user_name: &str, room_id: &str) -> Result<Room, JoinError> {
        let (user, room_id) = validate_form(user_name, room_id)?;

        let room = self.api.create_room(&room_id).await.inspect_err(|e| {
            tracing::warn!("Failed to create room '{}': {}", room_id, e);
        })?;

        tracing::info!("'{}' created room '{}'", user, room.room_id);
        self.context.set_joined(user, room.room_id.clone()).await;
        Ok(room)
    }
}
