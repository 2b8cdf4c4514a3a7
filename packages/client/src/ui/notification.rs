//! One-line notices shown above the prompt.

use colored::Colorize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
    Info,
}

/// A transient user-facing notice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub text: String,
}

impl Notification {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            text: text.into(),
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            text: text.into(),
        }
    }

    /// Coloured terminal line
    pub fn render(&self) -> String {
        match self.level {
            NotificationLevel::Success => format!("{} {}", "✔".green().bold(), self.text.green()),
            NotificationLevel::Error => format!("{} {}", "✖".red().bold(), self.text.red()),
            NotificationLevel::Info => format!("{} {}", "•".cyan(), self.text),
        }
    }
}
