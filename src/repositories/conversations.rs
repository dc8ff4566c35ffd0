use crate::common::context::Context;
use crate::entities::conversations::{Conversation, ConversationListEntry};

const TABLE_NAME: &str = "conversations";
const READ_FIELDS: &str = "id, listing_id, buyer_id, seller_id, created_at, last_activity_at";

pub async fn fetch_one<C: Context>(ctx: &C, conversation_id: u64) -> sqlx::Result<Conversation> {
    const QUERY: &str = const_str::concat!(
        "SELECT ",
        READ_FIELDS,
        " FROM ",
        TABLE_NAME,
        " WHERE id = ?"
    );
    sqlx::query_as(QUERY)
        .bind(conversation_id)
        .fetch_one(ctx.db())
        .await
}

/// Atomic get-or-create on the (listing, buyer) unique key. Concurrent calls
/// for the same pair all resolve to the same row.
pub async fn get_or_create<C: Context>(
    ctx: &C,
    listing_id: i64,
    buyer_id: i64,
    seller_id: i64,
) -> sqlx::Result<Conversation> {
    const QUERY: &str = const_str::concat!(
        "INSERT INTO ",
        TABLE_NAME,
        " (listing_id, buyer_id, seller_id) VALUES (?, ?, ?) ",
        "ON DUPLICATE KEY UPDATE id = LAST_INSERT_ID(id)"
    );
    let result = sqlx::query(QUERY)
        .bind(listing_id)
        .bind(buyer_id)
        .bind(seller_id)
        .execute(ctx.db())
        .await?;
    fetch_one(ctx, result.last_insert_id()).await
}

pub async fn fetch_for_user<C: Context>(
    ctx: &C,
    user_id: i64,
) -> sqlx::Result<Vec<ConversationListEntry>> {
    const QUERY: &str = const_str::concat!(
        "SELECT c.id, c.listing_id, c.buyer_id, c.seller_id, c.created_at, c.last_activity_at, ",
        "lm.body AS last_message_body, ",
        "lm.sender_id AS last_message_sender_id, ",
        "lm.created_at AS last_message_created_at, ",
        "(SELECT COUNT(*) FROM messages m ",
        "WHERE m.conversation_id = c.id AND m.sender_id != ? AND m.read_at IS NULL",
        ") AS unread_count ",
        "FROM ",
        TABLE_NAME,
        " c LEFT JOIN messages lm ON lm.id = (",
        "SELECT m2.id FROM messages m2 WHERE m2.conversation_id = c.id ",
        "ORDER BY m2.created_at DESC, m2.id DESC LIMIT 1",
        ") WHERE c.buyer_id = ? OR c.seller_id = ? ",
        "ORDER BY c.last_activity_at DESC"
    );
    sqlx::query_as(QUERY)
        .bind(user_id)
        .bind(user_id)
        .bind(user_id)
        .fetch_all(ctx.db())
        .await
}

pub async fn bump_last_activity<C: Context>(ctx: &C, conversation_id: u64) -> sqlx::Result<()> {
    const QUERY: &str = const_str::concat!(
        "UPDATE ",
        TABLE_NAME,
        " SET last_activity_at = CURRENT_TIMESTAMP WHERE id = ?"
    );
    sqlx::query(QUERY)
        .bind(conversation_id)
        .execute(ctx.db())
        .await?;
    Ok(())
}
