//! View router.

use std::sync::Arc;

use crate::{
    config::ClientConfig,
    domain::{MessageBroker, RoomApi},
    error::ClientError,
    infrastructure::{HttpRoomApi, StompMessageBroker},
    usecase::ChatSessionUseCase,
};

use super::{
    chat_view::ChatView,
    join_view::{JoinForm, JoinView},
    state::ChatContext,
    terminal::Terminal,
};

/// Which view is shown next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Join,
    Chat,
    Exit,
}

/// Run the client until the user quits
pub async fn run(config: ClientConfig) -> Result<(), ClientError> {
    tracing::info!(
        "Using room service at {} and broker at {}",
        config.base_url,
        config.ws_url
    );

    let api: Arc<dyn RoomApi> = Arc::new(HttpRoomApi::new(config.base_url.clone()));
    let broker: Arc<dyn MessageBroker> = Arc::new(StompMessageBroker::new(
        config.ws_url.clone(),
        config.stomp_config(),
    ));
    let context = ChatContext::new();
    let mut terminal = Terminal::spawn()?;

    let form = JoinForm {
        user_name: config.user_name.clone().unwrap_or_default(),
        room_id: config.room_id.clone().unwrap_or_default(),
    };
    let mut join_view = JoinView::new(api.clone(), context.clone(), form);
    let chat_view = ChatView::new(
        ChatSessionUseCase::new(api, broker, context, config.page_size),
        config.width,
    );

    let mut route = Route::Join;
    loop {
        route = match route {
            Route::Join => join_view.run(&mut terminal).await,
            Route::Chat => chat_view.run(&mut terminal).await,
            Route::Exit => break,
        };
    }

    tracing::info!("Bye");
    Ok(())
}
