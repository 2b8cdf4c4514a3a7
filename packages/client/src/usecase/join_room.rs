//! UseCase: ルーム参加処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinRoomUseCase::execute() メソッド
//! - 入力検証、ルームサービス呼び出し、セッション状態の更新
//!
//! ### なぜこのテストが必要か
//! - 空の入力ではネットワーク呼び出しが行われないことを保証
//! - 参加成功時にセッションが接続済みになり、サービスが返したルーム ID が保存されることを確認
//! - 失敗時にセッションが変更されないことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：既存ルームへの参加
//! - 異常系：空の名前・空のルーム ID、サービスの 400 応答、その他の失敗

use std::sync::Arc;

use crate::{
    domain::{Room, RoomApi, RoomId, UserName},
    ui::state::ChatContext,
};

use super::error::JoinError;

/// 参加・作成フォームの入力検証
///
/// 名前とルーム ID がどちらも空でないこと。
pub fn validate_form(user_name: &str, room_id: &str) -> Result<(UserName, RoomId), JoinError> {
    let user = UserName::new(user_name.to_string())?;
    let room_id = RoomId::new(room_id.to_string())?;
    Ok((user, room_id))
}

/// ルーム参加のユースケース
pub struct JoinRoomUseCase {
    /// ルームサービス（port の抽象化）
    api: Arc<dyn RoomApi>,
    /// 共有セッション
    context: ChatContext,
}

impl JoinRoomUseCase {
    /// 新しい JoinRoomUseCase を作成
    pub fn new(api: Arc<dyn RoomApi>, context: ChatContext) -> Self {
        Self { api, context }
    }

    /// ルーム参加を実行
    ///
    /// # Arguments
    ///
    /// * `user_name` - 入力されたユーザー名
    /// * `room_id` - 入力されたルーム ID
    ///
    /// # Returns
    ///
    /// * `Ok(Room)` - 参加成功（セッションは接続済み）
    /// * `Err(JoinError)` - 参加失敗（セッションは変更されない）
    pub async fn execute(&self, user_name: &str, room_id: &str) -> Result<Room, JoinError> {
        // 1. 入力検証（失敗時はネットワーク呼び出しを行わない）
        let (user, room_id) = validate_form(user_name, room_id)?;

        // 2. ルームの存在確認
        let room = self.api.join_room(&room_id).await.inspect_err(|e| {
            tracing::warn!("Failed to join room '{}': {}", room_id, e);
        })?;

        // 3. サービスが返したルーム ID でセッションを更新
        tracing::info!("'{}' joined room '{}'", user, room.room_id);
        self.context.set_joined(user, room.room_id.clone()).await;
        Ok(room)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ApiError, ValueObjectError, repository::MockRoomApi};

    fn room(room_id: &str) -> Room {
        Room {
            id: Some("1".to_string()),
            room_id: RoomId::new(room_id.to_string()).unwrap(),
            messages: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_join_room_success_sets_session() {
        // テスト項目: 参加成功時にセッションが接続済みになり、返されたルーム ID が保存される
        // given (前提条件):
        let mut api = MockRoomApi::new();
        api.expect_join_room()
            .withf(|room_id| room_id.as_str() == "general")
            .times(1)
            .returning(|_| Ok(room("general")));
        let context = ChatContext::new();
        let usecase = JoinRoomUseCase::new(Arc::new(api), context.clone());

        // when (操作):
        let result = usecase.execute("alice", "general").await;

        // then (期待する結果):
        assert!(result.is_ok());
        let session = context.snapshot().await;
        assert!(session.connected);
        assert_eq!(session.room_id.unwrap().as_str(), "general");
        assert_eq!(session.current_user.unwrap().as_str(), "alice");
    }

    #[tokio::test]
    async fn test_join_room_stores_room_id_returned_by_service() {
        // テスト項目: セッションには入力値ではなくサービスが返したルーム ID が保存される
        let mut api = MockRoomApi::new();
        api.expect_join_room().returning(|_| Ok(room("General")));
        let context = ChatContext::new();
        let usecase = JoinRoomUseCase::new(Arc::new(api), context.clone());

        usecase.execute("alice", "general").await.unwrap();

        let session = context.snapshot().await;
        assert_eq!(session.room_id.unwrap().as_str(), "General");
    }

    #[tokio::test]
    async fn test_join_room_empty_input_makes_no_request() {
        // テスト項目: 空の名前またはルーム ID ではネットワーク呼び出しが行われない
        // given (前提条件):
        let mut api = MockRoomApi::new();
        api.expect_join_room().times(0);
        let context = ChatContext::new();
        let usecase = JoinRoomUseCase::new(Arc::new(api), context.clone());

        // when (操作):
        let empty_name = usecase.execute("", "general").await;
        let empty_room = usecase.execute("alice", "").await;

        // then (期待する結果):
        assert_eq!(
            empty_name.unwrap_err(),
            JoinError::InvalidInput(ValueObjectError::UserNameEmpty)
        );
        assert_eq!(
            empty_room.unwrap_err(),
            JoinError::InvalidInput(ValueObjectError::RoomIdEmpty)
        );
        assert!(!context.is_connected().await);
    }

    #[tokio::test]
    async fn test_join_room_bad_request_keeps_body() {
        // テスト項目: 400 応答は本文付きの BadRequest になり、セッションは変更されない
        let mut api = MockRoomApi::new();
        api.expect_join_room()
            .returning(|_| Err(ApiError::BadRequest("Room not found!!".to_string())));
        let context = ChatContext::new();
        let usecase = JoinRoomUseCase::new(Arc::new(api), context.clone());

        let result = usecase.execute("alice", "missing").await;

        assert_eq!(result.unwrap_err(), JoinError::BadRequest("Room not found!!".to_string()));
        assert!(!context.is_connected().await);
    }

    #[tokio::test]
    async fn test_join_room_other_failure() {
        // テスト項目: 400 以外の失敗は Failed になる
        let mut api = MockRoomApi::new();
        api.expect_join_room()
            .returning(|_| Err(ApiError::Transport("connection refused".to_string())));
        let usecase = JoinRoomUseCase::new(Arc::new(api), ChatContext::new());

        let result = usecase.execute("alice", "general").await;

        assert!(matches!(result, Err(JoinError::Failed(ApiError::Transport(_)))));
    }
}
