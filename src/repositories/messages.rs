use crate::common::context::Context;
use crate::entities::messages::Message;

const TABLE_NAME: &str = "messages";
const READ_FIELDS: &str = "id, conversation_id, sender_id, body, created_at, read_at";

pub async fn fetch_one<C: Context>(ctx: &C, message_id: u64) -> sqlx::Result<Message> {
    const QUERY: &str = const_str::concat!(
        "SELECT ",
        READ_FIELDS,
        " FROM ",
        TABLE_NAME,
        " WHERE id = ?"
    );
    sqlx::query_as(QUERY)
        .bind(message_id)
        .fetch_one(ctx.db())
        .await
}

/// Inserts the message and returns the stored row with its server-assigned
/// id and timestamp.
pub async fn create<C: Context>(
    ctx: &C,
    conversation_id: u64,
    sender_id: i64,
    body: &str,
) -> sqlx::Result<Message> {
    const QUERY: &str = const_str::concat!(
        "INSERT INTO ",
        TABLE_NAME,
        " (conversation_id, sender_id, body) VALUES (?, ?, ?)"
    );
    let result = sqlx::query(QUERY)
        .bind(conversation_id)
        .bind(sender_id)
        .bind(body)
        .execute(ctx.db())
        .await?;
    fetch_one(ctx, result.last_insert_id()).await
}

/// Full ordered history. Creation order is authoritative, insertion order
/// breaks ties.
pub async fn fetch_history<C: Context>(
    ctx: &C,
    conversation_id: u64,
) -> sqlx::Result<Vec<Message>> {
    const QUERY: &str = const_str::concat!(
        "SELECT ",
        READ_FIELDS,
        " FROM ",
        TABLE_NAME,
        " WHERE conversation_id = ? ORDER BY created_at ASC, id ASC"
    );
    sqlx::query_as(QUERY)
        .bind(conversation_id)
        .fetch_all(ctx.db())
        .await
}

/// Flips every incoming unread message in the conversation. Already-read
/// rows keep their original read_at, so the flag never regresses.
pub async fn mark_read<C: Context>(
    ctx: &C,
    conversation_id: u64,
    reader_id: i64,
) -> sqlx::Result<()> {
    const QUERY: &str = const_str::concat!(
        "UPDATE ",
        TABLE_NAME,
        " SET read_at = CURRENT_TIMESTAMP ",
        "WHERE conversation_id = ? AND sender_id != ? AND read_at IS NULL"
    );
    sqlx::query(QUERY)
        .bind(conversation_id)
        .bind(reader_id)
        .execute(ctx.db())
        .await?;
    Ok(())
}

pub async fn unread_count_for_user<C: Context>(ctx: &C, user_id: i64) -> sqlx::Result<i64> {
    const QUERY: &str = const_str::concat!(
        "SELECT COUNT(*) FROM ",
        TABLE_NAME,
        " m INNER JOIN conversations c ON m.conversation_id = c.id ",
        "WHERE (c.buyer_id = ? OR c.seller_id = ?) ",
        "AND m.sender_id != ? AND m.read_at IS NULL"
    );
    sqlx::query_scalar(QUERY)
        .bind(user_id)
        .bind(user_id)
        .bind(user_id)
        .fetch_one(ctx.db())
        .await
}
