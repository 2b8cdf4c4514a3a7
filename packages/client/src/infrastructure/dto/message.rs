//! Chat message DTOs shared by the history endpoint and the broker topic.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use roomchat_shared::time::{millis_to_utc, naive_local_to_utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::domain::{ChatMessage, OutgoingMessage};

/// Message as delivered by the service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDto {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub sender: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: String,
    #[serde(default)]
    pub room_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub time_stamp: Option<DateTime<Utc>>,
}

impl From<MessageDto> for ChatMessage {
    fn from(dto: MessageDto) -> Self {
        ChatMessage {
            sender: dto.sender,
            content: dto.content,
            room_id: dto.room_id,
            timestamp: dto.time_stamp,
        }
    }
}

/// Body published to `/app/sendMessage/{roomId}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageDto {
    pub sender: String,
    pub content: String,
    pub room_id: String,
}

impl From<&OutgoingMessage> for SendMessageDto {
    fn from(message: &OutgoingMessage) -> Self {
        SendMessageDto {
            sender: message.sender.as_str().to_string(),
            content: message.content.as_str().to_string(),
            room_id: message.room_id.as_str().to_string(),
        }
    }
}

// missing or null text fields decode as empty so the rest of a page survives
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts ISO local date-times, RFC 3339, date-time arrays and epoch millis.
/// Unrecognised shapes become `None` instead of failing the message.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(parse_timestamp))
}

pub(crate) fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_timestamp_str(s),
        Value::Number(n) => n.as_i64().and_then(millis_to_utc),
        Value::Array(parts) => parse_timestamp_array(parts),
        _ => None,
    }
}

fn parse_timestamp_str(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = s.parse::<NaiveDateTime>() {
        return Some(naive_local_to_utc(naive));
    }
    // LocalDateTime#toString drops zero seconds
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M")
        .ok()
        .map(naive_local_to_utc)
}

// [year, month, day, hour, minute, second?, nanos?]
fn parse_timestamp_array(parts: &[Value]) -> Option<DateTime<Utc>> {
    if parts.len() < 5 {
        return None;
    }
    let num = |i: usize| -> Option<u32> {
        match parts.get(i) {
            Some(v) => v.as_u64().and_then(|n| u32::try_from(n).ok()),
            None => Some(0),
        }
    };
    let year = i32::try_from(parts[0].as_i64()?).ok()?;
    let date = NaiveDate::from_ymd_opt(year, num(1)?, num(2)?)?;
    let naive = date.and_hms_nano_opt(num(3)?, num(4)?, num(5)?, num(6)?)?;
    Some(naive_local_to_utc(naive))
}
