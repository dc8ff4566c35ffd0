use crate::entities::messages::Message as MessageEntity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct SendMessageArgs {
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub message_id: u64,
    pub conversation_id: u64,
    pub sender_id: i64,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub read: bool,
}

impl From<MessageEntity> for Message {
    fn from(value: MessageEntity) -> Self {
        Self {
            message_id: value.id,
            conversation_id: value.conversation_id,
            sender_id: value.sender_id,
            body: value.body,
            created_at: value.created_at,
            read: value.read_at.is_some(),
        }
    }
}
