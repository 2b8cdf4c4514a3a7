//! UseCase 層のエラー定義

use thiserror::Error;

use crate::domain::{ApiError, BrokerError, ValueObjectError};

/// ルーム参加・作成のエラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JoinError {
    /// 入力値が不正（ネットワーク呼び出しは行われない）
    #[error("invalid input: {0}")]
    InvalidInput(#[from] ValueObjectError),

    /// サービスがリクエストを拒否した (HTTP 400)
    #[error("rejected by room service: {0}")]
    BadRequest(String),

    /// その他の失敗
    #[error("room service request failed: {0}")]
    Failed(ApiError),
}

impl From<ApiError> for JoinError {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::BadRequest(body) => JoinError::BadRequest(body),
            other => JoinError::Failed(other),
        }
    }
}

/// チャット画面のエラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChatError {
    /// セッションが未接続（参加画面へリダイレクトする）
    #[error("not connected to a room")]
    NotConnected,

    /// 送信失敗（ログのみ）
    #[error("send failed: {0}")]
    Send(#[from] BrokerError),
}
