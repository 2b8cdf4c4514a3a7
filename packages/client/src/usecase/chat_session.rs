//! UseCase: チャット画面のセッション処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ChatSessionUseCase::open()：未接続時のリダイレクト、履歴取得と接続の並行実行
//! - ActiveChat::receive() / send() / logout()
//!
//! ### なぜこのテストが必要か
//! - 受信メッセージが到着順に追加され、並べ替えも重複除去もされないことを保証
//! - ログアウトで必ずセッションがクリアされ、接続が閉じられることを確認
//! - 空白のみの入力や切断後の送信が broker に届かないことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：履歴 + ライブメッセージ、送信、ログアウト
//! - 異常系：未接続、履歴取得失敗、接続失敗

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::{
    domain::{
        ChatMessage, MessageBroker, MessageContent, MessageLog, OutgoingMessage, RoomApi,
        RoomHandle, RoomId, UserName,
    },
    ui::state::ChatContext,
};

use super::error::ChatError;

/// チャット画面を開くユースケース
pub struct ChatSessionUseCase {
    api: Arc<dyn RoomApi>,
    broker: Arc<dyn MessageBroker>,
    context: ChatContext,
    /// 履歴の取得件数
    page_size: u32,
}

impl ChatSessionUseCase {
    /// 新しい ChatSessionUseCase を作成
    pub fn new(
        api: Arc<dyn RoomApi>,
        broker: Arc<dyn MessageBroker>,
        context: ChatContext,
        page_size: u32,
    ) -> Self {
        Self {
            api,
            broker,
            context,
            page_size,
        }
    }

    /// チャット画面を開く
    ///
    /// 未接続なら `ChatError::NotConnected`（ネットワーク呼び出しなし）。
    /// 接続済みなら履歴の取得（1 ページ目）と broker への接続を並行して行う。
    /// どちらの失敗もログに残すだけで、画面は開かれる。
    pub async fn open(&self) -> Result<ActiveChat, ChatError> {
        let session = self.context.snapshot().await;
        let Some((room_id, user)) = session.active() else {
            return Err(ChatError::NotConnected);
        };
        let room_id = room_id.clone();
        let current_user = user.clone();

        let (history, connection) = tokio::join!(
            self.api.get_messages(&room_id, self.page_size, 0),
            self.broker.connect(&room_id),
        );

        let mut log = MessageLog::new();
        match history {
            Ok(messages) => {
                tracing::debug!("Loaded {} messages for '{}'", messages.len(), room_id);
                log.extend(messages);
            }
            Err(e) => tracing::warn!("Error loading messages: {}", e),
        }

        let (inbound, handle) = match connection {
            Ok(connection) => {
                tracing::info!("Connected to room '{}'", room_id);
                (Some(connection.inbound), Some(connection.handle))
            }
            Err(e) => {
                tracing::warn!("Failed to connect to room '{}': {}", room_id, e);
                (None, None)
            }
        };

        Ok(ActiveChat {
            room_id,
            current_user,
            log,
            inbound,
            handle,
            context: self.context.clone(),
        })
    }
}

/// 開いているチャット画面の状態
pub struct ActiveChat {
    room_id: RoomId,
    current_user: UserName,
    log: MessageLog,
    inbound: Option<mpsc::UnboundedReceiver<ChatMessage>>,
    handle: Option<Box<dyn RoomHandle>>,
    context: ChatContext,
}

impl ActiveChat {
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    pub fn current_user(&self) -> &UserName {
        &self.current_user
    }

    /// 履歴 + 受信済みメッセージ（到着順）
    pub fn messages(&self) -> &[ChatMessage] {
        self.log.messages()
    }

    /// ライブ配信の接続が開いているか
    pub fn is_live(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| handle.is_open())
    }

    /// 次の受信メッセージを待ち、一覧の末尾に追加して返す
    ///
    /// キャンセルしても取りこぼしはない。接続がない、または終了した後は
    /// 永遠に待機する（`select!` の一方の分岐として使う想定）。
    pub async fn receive(&mut self) -> ChatMessage {
        loop {
            let Some(inbound) = self.inbound.as_mut() else {
                return std::future::pending().await;
            };
            match inbound.recv().await {
                Some(message) => {
                    self.log.push(message.clone());
                    return message;
                }
                None => {
                    tracing::warn!("Live message delivery for '{}' stopped", self.room_id);
                    self.inbound = None;
                }
            }
        }
    }

    /// メッセージを送信する
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - broker に送信した
    /// * `Ok(false)` - 送信しなかった（未接続、または空白のみの入力）
    /// * `Err(ChatError::Send)` - 送信失敗
    pub async fn send(&self, input: &str) -> Result<bool, ChatError> {
        let Some(handle) = self.handle.as_ref() else {
            return Ok(false);
        };
        if !handle.is_open() || !self.context.is_connected().await {
            return Ok(false);
        }
        let Ok(content) = MessageContent::new(input.to_string()) else {
            return Ok(false);
        };

        let message = OutgoingMessage {
            sender: self.current_user.clone(),
            content,
            room_id: self.room_id.clone(),
        };
        tracing::debug!("Sending message to '{}'", self.room_id);
        handle.publish(&message).await.inspect_err(|e| {
            tracing::warn!("Failed to send message: {}", e);
        })?;
        Ok(true)
    }

    /// 接続を閉じてセッションをクリアする
    pub async fn logout(self) {
        if let Some(handle) = self.handle
            && let Err(e) = handle.disconnect().await
        {
            tracing::warn!("Failed to disconnect cleanly: {}", e);
        }
        self.context.clear().await;
        tracing::info!("'{}' left room '{}'", self.current_user, self.room_id);
    }
}
