//! HTTP implementation of the `RoomApi` port.
//!
//! ```text
//! POST /api/v1/rooms                              (text/plain room id) -> room
//! GET  /api/v1/rooms/{roomId}                     -> room
//! GET  /api/v1/rooms/{roomId}/messages?size&page  -> [message]
//! ```

use async_trait::async_trait;
use reqwest::{StatusCode, header::CONTENT_TYPE};
use serde::de::DeserializeOwned;
use url::Url;

use crate::{
    domain::{ApiError, ChatMessage, Room, RoomApi, RoomId},
    infrastructure::dto::{MessagePageDto, RoomDto},
};

/// Room service client
#[derive(Debug, Clone)]
pub struct HttpRoomApi {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpRoomApi {
    pub fn new(base_url: Url) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    /// `{base}/api/v1/rooms/{segments...}`, each segment percent-encoded
    fn rooms_url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ApiError::InvalidUrl(self.base_url.to_string()))?;
            path.pop_if_empty().extend(["api", "v1", "rooms"]);
            path.extend(segments);
        }
        Ok(url)
    }
}

#[async_trait]
impl RoomApi for HttpRoomApi {
    async fn create_room(&self, room_id: &RoomId) -> Result<Room, ApiError> {
        let url = self.rooms_url(&[])?;
        tracing::debug!("POST {}", url);

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "text/plain")
            .body(room_id.as_str().to_string())
            .send()
            .await
            .map_err(transport_error)?;

        let dto: RoomDto = read_json(response).await?;
        Room::try_from(dto)
    }

    async fn join_room(&self, room_id: &RoomId) -> Result<Room, ApiError> {
        let url = self.rooms_url(&[room_id.as_str()])?;
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(transport_error)?;

        let dto: RoomDto = read_json(response).await?;
        Room::try_from(dto)
    }

    async fn get_messages(
        &self,
        room_id: &RoomId,
        size: u32,
        page: u32,
    ) -> Result<Vec<ChatMessage>, ApiError> {
        let mut url = self.rooms_url(&[room_id.as_str(), "messages"])?;
        url.query_pairs_mut()
            .append_pair("size", &size.to_string())
            .append_pair("page", &page.to_string());
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(transport_error)?;

        let page: MessagePageDto = read_json(response).await?;
        Ok(page.into_messages().into_iter().map(Into::into).collect())
    }
}

fn transport_error(e: reqwest::Error) -> ApiError {
    ApiError::Transport(e.to_string())
}

/// Decode a success body, or classify the failure status
async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();
    if status.is_success() {
        return response
            .json::<T>()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()));
    }

    let body = response.text().await.unwrap_or_default();
    tracing::debug!("Room service answered {}: {}", status, body);
    if status == StatusCode::BAD_REQUEST {
        Err(ApiError::BadRequest(body))
    } else {
        Err(ApiError::Status {
            status: status.as_u16(),
            body,
        })
    }
}
