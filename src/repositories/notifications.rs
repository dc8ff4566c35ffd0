use crate::common::context::Context;
use crate::entities::notifications::Notification;
use redis::AsyncCommands;
use redis::{ExistenceCheck, SetExpiry, SetOptions};
use std::time::Duration;

const TABLE_NAME: &str = "notifications";
const READ_FIELDS: &str = "id, recipient_id, kind, title, body, link, created_at, read_at";

pub async fn fetch_one<C: Context>(ctx: &C, notification_id: u64) -> sqlx::Result<Notification> {
    const QUERY: &str = const_str::concat!(
        "SELECT ",
        READ_FIELDS,
        " FROM ",
        TABLE_NAME,
        " WHERE id = ?"
    );
    sqlx::query_as(QUERY)
        .bind(notification_id)
        .fetch_one(ctx.db())
        .await
}

pub async fn create<C: Context>(
    ctx: &C,
    recipient_id: i64,
    kind: &str,
    title: &str,
    body: &str,
    link: Option<&str>,
) -> sqlx::Result<Notification> {
    const QUERY: &str = const_str::concat!(
        "INSERT INTO ",
        TABLE_NAME,
        " (recipient_id, kind, title, body, link) VALUES (?, ?, ?, ?, ?)"
    );
    let result = sqlx::query(QUERY)
        .bind(recipient_id)
        .bind(kind)
        .bind(title)
        .bind(body)
        .bind(link)
        .execute(ctx.db())
        .await?;
    fetch_one(ctx, result.last_insert_id()).await
}

pub async fn fetch_page<C: Context>(
    ctx: &C,
    recipient_id: i64,
    page: usize,
    page_size: usize,
) -> sqlx::Result<Vec<Notification>> {
    const QUERY: &str = const_str::concat!(
        "SELECT ",
        READ_FIELDS,
        " FROM ",
        TABLE_NAME,
        " WHERE recipient_id = ? ORDER BY created_at DESC, id DESC LIMIT ?,?"
    );
    let limit_offset = page * page_size;
    sqlx::query_as(QUERY)
        .bind(recipient_id)
        .bind(limit_offset as u64)
        .bind(page_size as u64)
        .fetch_all(ctx.db())
        .await
}

pub async fn mark_read<C: Context>(ctx: &C, notification_id: u64) -> sqlx::Result<()> {
    const QUERY: &str = const_str::concat!(
        "UPDATE ",
        TABLE_NAME,
        " SET read_at = CURRENT_TIMESTAMP WHERE id = ? AND read_at IS NULL"
    );
    sqlx::query(QUERY)
        .bind(notification_id)
        .execute(ctx.db())
        .await?;
    Ok(())
}

/// Single bulk flip for the whole inbox.
pub async fn mark_all_read<C: Context>(ctx: &C, recipient_id: i64) -> sqlx::Result<()> {
    const QUERY: &str = const_str::concat!(
        "UPDATE ",
        TABLE_NAME,
        " SET read_at = CURRENT_TIMESTAMP WHERE recipient_id = ? AND read_at IS NULL"
    );
    sqlx::query(QUERY)
        .bind(recipient_id)
        .execute(ctx.db())
        .await?;
    Ok(())
}

pub async fn unread_count<C: Context>(ctx: &C, recipient_id: i64) -> sqlx::Result<i64> {
    const QUERY: &str = const_str::concat!(
        "SELECT COUNT(*) FROM ",
        TABLE_NAME,
        " WHERE recipient_id = ? AND read_at IS NULL"
    );
    sqlx::query_scalar(QUERY)
        .bind(recipient_id)
        .fetch_one(ctx.db())
        .await
}

fn make_dedup_key(recipient_id: i64, conversation_id: u64) -> String {
    format!("bazaar:notif_dedup:{recipient_id}:{conversation_id}")
}

/// Claims the per-(recipient, conversation) de-dup slot. Returns false while
/// a previous claim is still inside the window.
pub async fn try_claim_dedup_slot<C: Context>(
    ctx: &C,
    recipient_id: i64,
    conversation_id: u64,
    window: Duration,
) -> anyhow::Result<bool> {
    let mut redis = ctx.redis().await?;
    let dedup_key = make_dedup_key(recipient_id, conversation_id);
    let options = SetOptions::default()
        .conditional_set(ExistenceCheck::NX)
        .with_expiration(SetExpiry::EX(window.as_secs()));
    let claimed: bool = redis.set_options(dedup_key, 1, options).await?;
    Ok(claimed)
}
