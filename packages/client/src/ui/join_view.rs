//! Join Room / Create Room form.

use std::sync::Arc;

use colored::Colorize;

use super::{
    Route,
    notification::Notification,
    state::ChatContext,
    terminal::{InputEvent, Terminal},
};
use crate::{
    domain::{Room, RoomApi},
    usecase::{CreateRoomUseCase, JoinError, JoinRoomUseCase},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinAction {
    Join,
    Create,
}

/// Answer to the action prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    Submit(JoinAction),
    Quit,
}

pub fn parse_action(input: &str) -> Option<FormAction> {
    match input.trim().to_ascii_lowercase().as_str() {
        "j" | "join" => Some(FormAction::Submit(JoinAction::Join)),
        "c" | "create" => Some(FormAction::Submit(JoinAction::Create)),
        "q" | "quit" | "exit" => Some(FormAction::Quit),
        _ => None,
    }
}

pub fn success_notification(action: JoinAction) -> Notification {
    match action {
        JoinAction::Join => Notification::success("joined.."),
        JoinAction::Create => Notification::success("Room Created Successfully !!"),
    }
}

/// Map a failed join/create to what the user sees
pub fn failure_notification(action: JoinAction, error: &JoinError) -> Notification {
    match (action, error) {
        (_, JoinError::InvalidInput(_)) => Notification::error("Invalid Input !!"),
        (JoinAction::Join, JoinError::BadRequest(body)) => Notification::error(body.clone()),
        (JoinAction::Create, JoinError::BadRequest(_)) => Notification::error("Room already exists !!"),
        (JoinAction::Join, JoinError::Failed(_)) => Notification::error("Error in joining room"),
        (JoinAction::Create, JoinError::Failed(_)) => Notification::info("Error in creating room"),
    }
}

/// Current form values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoinForm {
    pub user_name: String,
    pub room_id: String,
}

pub struct JoinView {
    join: JoinRoomUseCase,
    create: CreateRoomUseCase,
    form: JoinForm,
}

impl JoinView {
    pub fn new(api: Arc<dyn RoomApi>, context: ChatContext, form: JoinForm) -> Self {
        Self {
            join: JoinRoomUseCase::new(api.clone(), context.clone()),
            create: CreateRoomUseCase::new(api, context),
            form,
        }
    }

    /// Submit the form with the chosen action
    pub async fn submit(&self, action: JoinAction) -> Result<Room, Notification> {
        let result = match action {
            JoinAction::Join => {
                self.join
                    .execute(&self.form.user_name, &self.form.room_id)
                    .await
            }
            JoinAction::Create => {
                self.create
                    .execute(&self.form.user_name, &self.form.room_id)
                    .await
            }
        };
        result.map_err(|e| failure_notification(action, &e))
    }

    pub async fn run(&mut self, terminal: &mut Terminal) -> Route {
        terminal.print(format!("\n{}\n", "Join Room / Create Room ..".bold()));

        loop {
            let Some(user_name) = prompt_field(terminal, "Your name", &self.form.user_name).await
            else {
                return Route::Exit;
            };
            self.form.user_name = user_name;

            let Some(room_id) =
                prompt_field(terminal, "Room ID / New Room ID", &self.form.room_id).await
            else {
                return Route::Exit;
            };
            self.form.room_id = room_id;

            let action = loop {
                match terminal.read_line("[j]oin room / [c]reate room / [q]uit: ").await {
                    InputEvent::Line(line) => match parse_action(&line) {
                        Some(FormAction::Submit(action)) => break action,
                        Some(FormAction::Quit) => return Route::Exit,
                        None => terminal.print(Notification::info("Type j, c or q").render()),
                    },
                    InputEvent::Interrupted | InputEvent::Eof => return Route::Exit,
                }
            };

            match self.submit(action).await {
                Ok(_) => {
                    terminal.print(success_notification(action).render());
                    return Route::Chat;
                }
                Err(notification) => terminal.print(notification.render()),
            }
        }
    }
}

/// Prompt for one field; an empty answer keeps the current value
async fn prompt_field(terminal: &mut Terminal, label: &str, current: &str) -> Option<String> {
    let prompt = if current.is_empty() {
        format!("{label}: ")
    } else {
        format!("{label} [{current}]: ")
    };
    match terminal.read_line(&prompt).await {
        InputEvent::Line(line) if line.is_empty() => Some(current.to_string()),
        InputEvent::Line(line) => Some(line),
        InputEvent::Interrupted | InputEvent::Eof => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ApiError, RoomId, ValueObjectError, repository::MockRoomApi};
    use crate::ui::notification::NotificationLevel;

    fn view(api: MockRoomApi, context: ChatContext, user_name: &str, room_id: &str) -> JoinView {
        JoinView::new(
            Arc::new(api),
            context,
            JoinForm {
                user_name: user_name.to_string(),
                room_id: room_id.to_string(),
            },
        )
    }

    #[test]
    fn test_parse_action() {
        // テスト項目: アクション入力を解釈できる
        assert_eq!(parse_action("j"), Some(FormAction::Submit(JoinAction::Join)));
        assert_eq!(parse_action(" Create "), Some(FormAction::Submit(JoinAction::Create)));
        assert_eq!(parse_action("q"), Some(FormAction::Quit));
        assert_eq!(parse_action("x"), None);
    }

    #[test]
    fn test_failure_notification_texts() {
        // テスト項目: 失敗の種類ごとに通知文言が決まる
        let invalid = JoinError::InvalidInput(ValueObjectError::RoomIdEmpty);
        let bad = JoinError::BadRequest("Room not found !!".to_string());
        let failed = JoinError::Failed(ApiError::Transport("refused".to_string()));

        assert_eq!(failure_notification(JoinAction::Join, &invalid).text, "Invalid Input !!");
        assert_eq!(failure_notification(JoinAction::Create, &invalid).text, "Invalid Input !!");
        assert_eq!(failure_notification(JoinAction::Join, &bad).text, "Room not found !!");
        assert_eq!(failure_notification(JoinAction::Create, &bad).text, "Room already exists !!");
        assert_eq!(failure_notification(JoinAction::Join, &failed).text, "Error in joining room");
        assert_eq!(failure_notification(JoinAction::Create, &failed).text, "Error in creating room");
    }

    #[tokio::test]
    async fn test_submit_empty_name_shows_error_without_request() {
        // テスト項目: 名前が空の場合、通信せずにエラー通知が返される
        // given (前提条件):
        let mut api = MockRoomApi::new();
        api.expect_join_room().times(0);
        api.expect_create_room().times(0);
        let context = ChatContext::new();
        let view = view(api, context.clone(), "", "general");

        // when (操作):
        let join = view.submit(JoinAction::Join).await;
        let create = view.submit(JoinAction::Create).await;

        // then (期待する結果):
        for result in [join, create] {
            let notification = result.unwrap_err();
            assert_eq!(notification.level, NotificationLevel::Error);
            assert_eq!(notification.text, "Invalid Input !!");
        }
        assert!(!context.is_connected().await);
    }

    #[tokio::test]
    async fn test_submit_create_success_connects_session() {
        // テスト項目: ルーム作成に成功するとセッションが接続済みになる
        let mut api = MockRoomApi::new();
        api.expect_create_room().times(1).returning(|room_id| {
            Ok(Room {
                id: None,
                room_id: room_id.clone(),
                messages: Vec::new(),
            })
        });
        let context = ChatContext::new();
        let view = view(api, context.clone(), "alice", "general");

        let room = view.submit(JoinAction::Create).await.unwrap();

        assert_eq!(room.room_id, RoomId::new("general".to_string()).unwrap());
        assert!(context.is_connected().await);
    }
}
