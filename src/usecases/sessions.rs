use crate::common::context::Context;
use crate::common::error::{AppError, ServiceResult, unexpected};
use crate::models::sessions::Session;
use crate::repositories::sessions;

pub async fn authenticate<C: Context>(ctx: &C, token: &str) -> ServiceResult<Session> {
    match sessions::fetch_user_id(ctx, token).await {
        Ok(Some(user_id)) => Ok(Session { user_id }),
        Ok(None) => Err(AppError::Unauthorized),
        Err(e) => unexpected(e),
    }
}
