//! Client configuration.

use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::{
    domain::repository::DEFAULT_HISTORY_PAGE_SIZE,
    infrastructure::stomp::StompConfig,
    ui::render::{DEFAULT_WIDTH, MIN_WIDTH},
};

/// Room service address used when none is given
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// WebSocket endpoint path of the broker, relative to the base URL
pub const DEFAULT_WS_PATH: &str = "/chat";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("base URL must use http or https, got '{0}'")]
    UnsupportedScheme(String),

    #[error("page size must be greater than zero")]
    InvalidPageSize,

    #[error("width must be at least {min} columns (got {0})", min = MIN_WIDTH)]
    InvalidWidth(usize),
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Room service HTTP base
    pub base_url: Url,
    /// Broker WebSocket endpoint
    pub ws_url: Url,
    /// History messages fetched when a chat view opens
    pub page_size: u32,
    /// Render width in columns
    pub width: usize,
    /// Grace period for DISCONNECT receipts
    pub disconnect_grace: Duration,
    /// Pre-filled join form values
    pub user_name: Option<String>,
    pub room_id: Option<String>,
}

impl ClientConfig {
    pub fn new(base_url: &str, ws_path: &str) -> Result<Self, ConfigError> {
        let base_url = Url::parse(base_url).map_err(|e| ConfigError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if base_url.scheme() != "http" && base_url.scheme() != "https" {
            return Err(ConfigError::UnsupportedScheme(base_url.scheme().to_string()));
        }
        let ws_url = websocket_url(&base_url, ws_path)?;

        Ok(Self {
            base_url,
            ws_url,
            page_size: DEFAULT_HISTORY_PAGE_SIZE,
            width: DEFAULT_WIDTH,
            disconnect_grace: Duration::from_secs(2),
            user_name: None,
            room_id: None,
        })
    }

    pub fn with_page_size(mut self, page_size: u32) -> Result<Self, ConfigError> {
        if page_size == 0 {
            return Err(ConfigError::InvalidPageSize);
        }
        self.page_size = page_size;
        Ok(self)
    }

    pub fn with_width(mut self, width: usize) -> Result<Self, ConfigError> {
        if width < MIN_WIDTH {
            return Err(ConfigError::InvalidWidth(width));
        }
        self.width = width;
        Ok(self)
    }

    pub fn with_form(mut self, user_name: Option<String>, room_id: Option<String>) -> Self {
        self.user_name = user_name;
        self.room_id = room_id;
        self
    }

    /// STOMP settings derived from this configuration
    pub fn stomp_config(&self) -> StompConfig {
        StompConfig {
            host: self.base_url.host_str().unwrap_or("localhost").to_string(),
            disconnect_grace: self.disconnect_grace,
            ..StompConfig::default()
        }
    }
}

/// Derive the broker endpoint: http → ws, https → wss, `ws_path` appended to
/// the base path.
pub fn websocket_url(base_url: &Url, ws_path: &str) -> Result<Url, ConfigError> {
    let mut url = base_url.clone();
    let scheme = match base_url.scheme() {
        "http" => "ws",
        "https" => "wss",
        other => return Err(ConfigError::UnsupportedScheme(other.to_string())),
    };
    url.set_scheme(scheme)
        .map_err(|_| ConfigError::UnsupportedScheme(base_url.scheme().to_string()))?;

    let base_path = base_url.path().trim_end_matches('/');
    let ws_path = ws_path.trim_start_matches('/');
    url.set_path(&format!("{base_path}/{ws_path}"));
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}
