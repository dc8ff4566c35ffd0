use crate::api::{InternalKey, RequestContext};
use crate::common::error::{ServiceResponse, ServiceResult};
use crate::models::notifications::{Notification, NotificationPageArgs, PublishArgs};
use crate::models::sessions::Session;
use crate::usecases::notifications;
use axum::Json;
use axum::extract::{Path, Query};
use axum::http::StatusCode;

pub async fn list(
    ctx: RequestContext,
    session: Session,
    Query(args): Query<NotificationPageArgs>,
) -> ServiceResponse<Vec<Notification>> {
    let page = notifications::fetch_page(&ctx, &session, args.page, args.page_size).await?;
    Ok(Json(page))
}

/// Collaborator-facing publish. Price proposals, report outcomes, favorite
/// and status-change events all land here.
pub async fn publish(
    _key: InternalKey,
    ctx: RequestContext,
    Json(args): Json<PublishArgs>,
) -> ServiceResponse<Notification> {
    let notification = notifications::publish(
        &ctx,
        args.recipient_id,
        args.kind,
        &args.title,
        &args.body,
        args.link.as_deref(),
    )
    .await?;
    Ok(Json(notification))
}

pub async fn mark_read(
    ctx: RequestContext,
    session: Session,
    Path(notification_id): Path<u64>,
) -> ServiceResult<StatusCode> {
    notifications::mark_read(&ctx, &session, notification_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn mark_all_read(ctx: RequestContext, session: Session) -> ServiceResult<StatusCode> {
    notifications::mark_all_read(&ctx, &session).await?;
    Ok(StatusCode::NO_CONTENT)
}
