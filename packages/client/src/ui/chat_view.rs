//! Active chat screen.

use roomchat_shared::time::now_utc;

use super::{
    Route,
    notification::Notification,
    render::{render_header, render_message},
    terminal::{InputEvent, Terminal},
};
use crate::usecase::{ChatError, ChatSessionUseCase};

/// What a line typed in the chat view means
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    Send(String),
    /// Log out and go back to the join form
    Leave,
    /// Log out and exit the program
    Quit,
}

pub fn parse_command(line: &str) -> ChatCommand {
    match line.trim() {
        "/leave" | "/logout" => ChatCommand::Leave,
        "/quit" | "/exit" => ChatCommand::Quit,
        _ => ChatCommand::Send(line.to_string()),
    }
}

pub struct ChatView {
    usecase: ChatSessionUseCase,
    width: usize,
}

impl ChatView {
    pub fn new(usecase: ChatSessionUseCase, width: usize) -> Self {
        Self { usecase, width }
    }

    pub async fn run(&self, terminal: &mut Terminal) -> Route {
        let mut chat = match self.usecase.open().await {
            Ok(chat) => chat,
            Err(ChatError::NotConnected) => return Route::Join,
            Err(e) => {
                tracing::warn!("Failed to open chat: {}", e);
                return Route::Join;
            }
        };

        if chat.is_live() {
            terminal.print(Notification::success("Connected to chat!").render());
        }
        terminal.print(render_header(chat.room_id(), chat.current_user(), self.width));
        let now = now_utc();
        for message in chat.messages() {
            terminal.print(render_message(message, chat.current_user(), now, self.width));
        }

        loop {
            terminal.request_line("> ");
            tokio::select! {
                event = terminal.next_event() => match event {
                    InputEvent::Line(line) => match parse_command(&line) {
                        ChatCommand::Send(text) => {
                            if let Err(e) = chat.send(&text).await {
                                tracing::debug!("Message not sent: {}", e);
                            }
                        }
                        ChatCommand::Leave => {
                            chat.logout().await;
                            return Route::Join;
                        }
                        ChatCommand::Quit => {
                            chat.logout().await;
                            return Route::Exit;
                        }
                    },
                    InputEvent::Interrupted | InputEvent::Eof => {
                        chat.logout().await;
                        return Route::Exit;
                    }
                },
                message = chat.receive() => {
                    terminal.print(render_message(&message, chat.current_user(), now_utc(), self.width));
                }
            }
        }
    }
}
