//! Message and header rendering.
//!
//! Layout (alignment, labels) is computed on plain text first, colour is
//! applied afterwards so padding is not thrown off by escape codes.

use chrono::{DateTime, Utc};
use colored::Colorize;
use roomchat_shared::time::time_ago;

use crate::domain::{ChatMessage, RoomId, UserName};

/// Render width used when none is configured
pub const DEFAULT_WIDTH: usize = 80;

/// Narrowest width the layout supports
pub const MIN_WIDTH: usize = 20;

const OTHER_INDENT: &str = "  ";

/// Visual treatment of a message relative to the current user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageStyle {
    /// Sent by the current user: right-aligned, green
    Own,
    /// Sent by someone else: left-aligned, default colour
    Other,
}

/// A laid out, uncoloured message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageLayout {
    pub style: MessageStyle,
    pub sender: String,
    pub content: String,
    /// Relative time, empty when the message has no timestamp
    pub time: String,
}

pub fn message_style(message: &ChatMessage, current_user: &UserName) -> MessageStyle {
    if message.is_from(current_user) {
        MessageStyle::Own
    } else {
        MessageStyle::Other
    }
}

pub fn layout_message(
    message: &ChatMessage,
    current_user: &UserName,
    now: DateTime<Utc>,
    width: usize,
) -> MessageLayout {
    let style = message_style(message, current_user);
    let time = message
        .timestamp
        .map(|ts| time_ago(ts, now))
        .unwrap_or_default();

    let width = width.max(MIN_WIDTH);
    let align = |text: &str| match style {
        MessageStyle::Own => format!("{text:>width$}"),
        MessageStyle::Other => format!("{OTHER_INDENT}{text}"),
    };

    MessageLayout {
        style,
        sender: align(&message.sender),
        content: align(&message.content),
        time: if time.is_empty() { time } else { align(&time) },
    }
}

/// Content colour of other users' messages
const OTHER_GREY: (u8, u8, u8) = (156, 163, 175);

/// Apply colour to a layout
pub fn paint(layout: &MessageLayout) -> String {
    let mut lines = Vec::with_capacity(3);
    match layout.style {
        MessageStyle::Own => {
            lines.push(layout.sender.bright_green().bold().to_string());
            lines.push(layout.content.green().to_string());
            if !layout.time.is_empty() {
                lines.push(layout.time.green().dimmed().to_string());
            }
        }
        MessageStyle::Other => {
            let (r, g, b) = OTHER_GREY;
            lines.push(layout.sender.bright_black().bold().to_string());
            lines.push(layout.content.truecolor(r, g, b).to_string());
            if !layout.time.is_empty() {
                lines.push(layout.time.bright_black().to_string());
            }
        }
    }
    lines.join("\n")
}

pub fn render_message(
    message: &ChatMessage,
    current_user: &UserName,
    now: DateTime<Utc>,
    width: usize,
) -> String {
    paint(&layout_message(message, current_user, now, width))
}

pub fn render_header(room_id: &RoomId, current_user: &UserName, width: usize) -> String {
    let rule = "─".repeat(width.max(MIN_WIDTH));
    format!(
        "{rule}\nRoom : {}    User : {}\n{}\n{rule}",
        room_id.as_str().bright_blue(),
        current_user.as_str().bright_green(),
        "Type a message and press Enter. /leave leaves the room, /quit exits.".dimmed()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn alice() -> UserName {
        UserName::new("alice".to_string()).unwrap()
    }

    fn message(sender: &str, content: &str, timestamp: Option<DateTime<Utc>>) -> ChatMessage {
        ChatMessage {
            sender: sender.to_string(),
            content: content.to_string(),
            room_id: None,
            timestamp,
        }
    }

    #[test]
    fn test_own_and_other_messages_have_distinct_style() {
        // テスト項目: 自分のメッセージと他人のメッセージは異なる表示になる
        // given (前提条件):
        let now = Utc::now();
        let own = message("alice", "hi", None);
        let other = message("bob", "hi", None);

        // when (操作):
        let own_layout = layout_message(&own, &alice(), now, 40);
        let other_layout = layout_message(&other, &alice(), now, 40);

        // then (期待する結果):
        assert_eq!(own_layout.style, MessageStyle::Own);
        assert_eq!(other_layout.style, MessageStyle::Other);
        assert_ne!(own_layout.content, other_layout.content);
    }

    #[test]
    fn test_own_message_is_right_aligned() {
        // テスト項目: 自分のメッセージは右寄せで表示される
        let layout = layout_message(&message("alice", "hello", None), &alice(), Utc::now(), 30);

        assert_eq!(layout.content.chars().count(), 30);
        assert!(layout.content.ends_with("hello"));
        assert!(layout.sender.ends_with("alice"));
    }

    #[test]
    fn test_other_message_is_left_aligned() {
        // テスト項目: 他人のメッセージは左寄せ（インデント付き）で表示される
        let layout = layout_message(&message("bob", "hello", None), &alice(), Utc::now(), 30);

        assert_eq!(layout.sender, "  bob");
        assert_eq!(layout.content, "  hello");
    }

    #[test]
    fn test_layout_shows_relative_time() {
        // テスト項目: タイムスタンプがあれば相対時刻が表示され、なければ空
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let with_time = message("bob", "x", Some(now - Duration::minutes(5)));
        let without_time = message("bob", "x", None);

        assert_eq!(
            layout_message(&with_time, &alice(), now, 30).time,
            "  5 minutes ago"
        );
        assert_eq!(layout_message(&without_time, &alice(), now, 30).time, "");
    }

    #[test]
    fn test_width_is_clamped_to_minimum() {
        // テスト項目: 幅が狭すぎる場合は最小幅が使われる
        let layout = layout_message(&message("alice", "hi", None), &alice(), Utc::now(), 3);

        assert_eq!(layout.content.chars().count(), MIN_WIDTH);
    }

    #[test]
    fn test_paint_uses_green_for_own_and_grey_for_others() {
        // テスト項目: 自分のメッセージは緑、他人のメッセージは灰色で描画される
        // given (前提条件):
        colored::control::set_override(true);
        let now = Utc::now();
        let own = layout_message(&message("alice", "hi", None), &alice(), now, 30);
        let other = layout_message(&message("bob", "hi", None), &alice(), now, 30);

        // when (操作):
        let own = paint(&own);
        let other = paint(&other);

        // then (期待する結果):
        let grey = "\x1b[38;2;156;163;175m";
        assert!(own.contains("\x1b[32m"));
        assert!(!own.contains(grey));
        assert!(other.contains(grey));
        assert!(!other.contains("\x1b[32m"));
    }
}
