use crate::api::RequestContext;
use crate::common::error::ServiceResponse;
use crate::models::sessions::Session;
use crate::models::unread::UnreadCounts;
use crate::usecases::unread;
use axum::Json;

pub async fn unread_counts(ctx: RequestContext, session: Session) -> ServiceResponse<UnreadCounts> {
    let counts = unread::unread_counts(&ctx, &session).await?;
    Ok(Json(counts))
}
