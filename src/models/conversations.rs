use crate::entities::conversations::{
    Conversation as ConversationEntity, ConversationListEntry,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateConversationArgs {
    pub listing_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub conversation_id: u64,
    pub listing_id: i64,
    pub buyer_id: i64,
    pub seller_id: i64,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
}

impl From<ConversationEntity> for Conversation {
    fn from(value: ConversationEntity) -> Self {
        Self {
            conversation_id: value.id,
            listing_id: value.listing_id,
            buyer_id: value.buyer_id,
            seller_id: value.seller_id,
            created_at: value.created_at,
            last_activity_at: value.last_activity_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagePreview {
    pub sender_id: i64,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// One conversation in a user's overview, ordered by recency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationOverview {
    pub conversation_id: u64,
    pub listing_id: i64,
    pub buyer_id: i64,
    pub seller_id: i64,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
    pub last_message: Option<MessagePreview>,
    pub unread_count: i64,
}

impl From<ConversationListEntry> for ConversationOverview {
    fn from(value: ConversationListEntry) -> Self {
        let last_message = match (
            value.last_message_sender_id,
            value.last_message_body,
            value.last_message_created_at,
        ) {
            (Some(sender_id), Some(body), Some(created_at)) => Some(MessagePreview {
                sender_id,
                body,
                created_at,
            }),
            _ => None,
        };
        Self {
            conversation_id: value.id,
            listing_id: value.listing_id,
            buyer_id: value.buyer_id,
            seller_id: value.seller_id,
            created_at: value.created_at,
            last_activity_at: value.last_activity_at,
            last_message,
            unread_count: value.unread_count,
        }
    }
}
