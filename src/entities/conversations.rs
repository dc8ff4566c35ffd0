use chrono::{DateTime, Utc};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Conversation {
    pub id: u64,
    pub listing_id: i64,
    pub buyer_id: i64,
    pub seller_id: i64,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
}

impl Conversation {
    pub fn is_participant(&self, user_id: i64) -> bool {
        self.buyer_id == user_id || self.seller_id == user_id
    }

    /// The participant on the other side of `user_id`.
    pub fn other_participant(&self, user_id: i64) -> i64 {
        if self.buyer_id == user_id {
            self.seller_id
        } else {
            self.buyer_id
        }
    }
}

/// One row of a user's conversation overview, annotated with the latest
/// message and how many incoming messages are still unread.
#[derive(Debug, sqlx::FromRow)]
pub struct ConversationListEntry {
    pub id: u64,
    pub listing_id: i64,
    pub buyer_id: i64,
    pub seller_id: i64,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
    pub last_message_body: Option<String>,
    pub last_message_sender_id: Option<i64>,
    pub last_message_created_at: Option<DateTime<Utc>>,
    pub unread_count: i64,
}
