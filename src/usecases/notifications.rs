use crate::common::context::Context;
use crate::common::error::{AppError, ServiceResult, unexpected};
use crate::entities::notifications::NotificationKind;
use crate::models::notifications::Notification;
use crate::models::sessions::Session;
use crate::repositories::notifications;
use crate::settings::AppSettings;

/// Appends one notification record to the recipient's inbox.
pub async fn publish<C: Context>(
    ctx: &C,
    recipient_id: i64,
    kind: NotificationKind,
    title: &str,
    body: &str,
    link: Option<&str>,
) -> ServiceResult<Notification> {
    match notifications::create(ctx, recipient_id, kind.as_str(), title, body, link).await {
        Ok(notification) => Notification::try_from(notification),
        Err(e) => unexpected(e),
    }
}

/// New-message fan-out. At most one unread inbox entry per conversation and
/// recipient within the de-dup window, so a burst of messages stays bounded.
pub async fn notify_new_message<C: Context>(
    ctx: &C,
    recipient_id: i64,
    conversation_id: u64,
) -> ServiceResult<()> {
    let window = AppSettings::get().notification_dedup_window;
    let claimed =
        notifications::try_claim_dedup_slot(ctx, recipient_id, conversation_id, window).await?;
    if !claimed {
        return Ok(());
    }

    let link = format!("/conversations/{conversation_id}");
    publish(
        ctx,
        recipient_id,
        NotificationKind::NewMessage,
        "New message",
        "You have received a new message.",
        Some(&link),
    )
    .await?;
    Ok(())
}

pub async fn fetch_page<C: Context>(
    ctx: &C,
    session: &Session,
    page: usize,
    page_size: usize,
) -> ServiceResult<Vec<Notification>> {
    match notifications::fetch_page(ctx, session.user_id, page, page_size).await {
        Ok(notifications) => notifications
            .into_iter()
            .map(Notification::try_from)
            .collect(),
        Err(e) => unexpected(e),
    }
}

pub async fn mark_read<C: Context>(
    ctx: &C,
    session: &Session,
    notification_id: u64,
) -> ServiceResult<()> {
    let notification = match notifications::fetch_one(ctx, notification_id).await {
        Ok(notification) => notification,
        Err(sqlx::Error::RowNotFound) => return Err(AppError::NotificationsNotFound),
        Err(e) => return unexpected(e),
    };
    if notification.recipient_id != session.user_id {
        return Err(AppError::NotificationsForbidden);
    }
    match notifications::mark_read(ctx, notification.id).await {
        Ok(()) => Ok(()),
        Err(e) => unexpected(e),
    }
}

pub async fn mark_all_read<C: Context>(ctx: &C, session: &Session) -> ServiceResult<()> {
    match notifications::mark_all_read(ctx, session.user_id).await {
        Ok(()) => Ok(()),
        Err(e) => unexpected(e),
    }
}
