//! Chat context shared by the join and chat views.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::domain::{RoomId, Session, UserName};

/// Cloneable handle to the process-wide session state.
///
/// Every clone observes the same session.
#[derive(Debug, Clone, Default)]
pub struct ChatContext {
    session: Arc<RwLock<Session>>,
}

impl ChatContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current session
    pub async fn snapshot(&self) -> Session {
        self.session.read().await.clone()
    }

    pub async fn is_connected(&self) -> bool {
        self.session.read().await.connected
    }

    /// Record a successful join/create
    pub async fn set_joined(&self, current_user: UserName, room_id: RoomId) {
        *self.session.write().await = Session::joined(current_user, room_id);
    }

    /// Back to the initial empty, disconnected state
    pub async fn clear(&self) {
        *self.session.write().await = Session::default();
    }
}
