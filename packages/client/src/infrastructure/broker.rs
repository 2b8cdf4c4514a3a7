//! STOMP implementation of the `MessageBroker` port.
//!
//! 各ルームは専用の STOMP 接続を持ちます（接続はプールも再利用もしません）。
//!
//! - subscribe: `/topic/room/{roomId}`
//! - publish:   `/app/sendMessage/{roomId}`

use async_trait::async_trait;
use tokio::sync::mpsc;
use url::Url;

use crate::{
    domain::{
        BrokerError, ChatMessage, MessageBroker, OutgoingMessage, RoomConnection, RoomHandle,
        RoomId,
    },
    infrastructure::{
        dto::{MessageDto, SendMessageDto},
        stomp::{Frame, StompClient, StompConfig},
    },
};

/// Destination carrying a room's broadcast messages
pub fn room_topic(room_id: &RoomId) -> String {
    format!("/topic/room/{}", room_id.as_str())
}

/// Destination accepting messages for a room
pub fn send_destination(room_id: &RoomId) -> String {
    format!("/app/sendMessage/{}", room_id.as_str())
}

/// Decode a MESSAGE frame body into a chat message
pub fn decode_chat_message(frame: &Frame) -> Result<ChatMessage, String> {
    let body = frame.body_str().map_err(|e| e.to_string())?;
    let dto: MessageDto = serde_json::from_str(body).map_err(|e| e.to_string())?;
    Ok(dto.into())
}

/// Opens one STOMP connection per room
#[derive(Debug, Clone)]
pub struct StompMessageBroker {
    ws_url: Url,
    config: StompConfig,
}

impl StompMessageBroker {
    pub fn new(ws_url: Url, config: StompConfig) -> Self {
        Self { ws_url, config }
    }
}

#[async_trait]
impl MessageBroker for StompMessageBroker {
    async fn connect(&self, room_id: &RoomId) -> Result<RoomConnection, BrokerError> {
        let client = StompClient::connect(&self.ws_url, self.config.clone())
            .await
            .map_err(|e| BrokerError::Connect(e.to_string()))?;

        let mut subscription = client
            .subscribe(&room_topic(room_id))
            .await
            .map_err(|e| BrokerError::Connect(e.to_string()))?;

        let (tx, rx) = mpsc::unbounded_channel();
        let room = room_id.clone();
        tokio::spawn(async move {
            while let Some(frame) = subscription.next().await {
                match decode_chat_message(&frame) {
                    Ok(message) => {
                        tracing::debug!("Received message from '{}' in '{}'", message.sender, room);
                        if tx.send(message).is_err() {
                            break;
                        }
                    }
                    Err(e) => tracing::warn!("Skipping undecodable message in '{}': {}", room, e),
                }
            }
            tracing::info!("Live delivery for room '{}' ended", room);
        });

        Ok(RoomConnection {
            inbound: rx,
            handle: Box::new(StompRoomHandle {
                client,
                room_id: room_id.clone(),
            }),
        })
    }
}

/// Publish/disconnect side of a room connection
pub struct StompRoomHandle {
    client: StompClient,
    room_id: RoomId,
}

#[async_trait]
impl RoomHandle for StompRoomHandle {
    async fn publish(&self, message: &OutgoingMessage) -> Result<(), BrokerError> {
        if !self.client.is_open() {
            return Err(BrokerError::Closed);
        }
        let body = serde_json::to_string(&SendMessageDto::from(message))
            .map_err(|e| BrokerError::Publish(e.to_string()))?;
        self.client
            .send(&send_destination(&self.room_id), "application/json", body)
            .map_err(|e| BrokerError::Publish(e.to_string()))
    }

    async fn disconnect(&self) -> Result<(), BrokerError> {
        self.client
            .disconnect()
            .await
            .map_err(|e| BrokerError::Disconnect(e.to_string()))
    }

    fn is_open(&self) -> bool {
        self.client.is_open()
    }
}
