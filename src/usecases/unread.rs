use crate::common::context::Context;
use crate::common::error::{ServiceResult, unexpected};
use crate::models::sessions::Session;
use crate::models::unread::UnreadCounts;
use crate::repositories::{messages, notifications};

/// Both badge counts, recomputed from the logs. No cache on purpose: every
/// polling surface must agree within one interval.
pub async fn unread_counts<C: Context>(ctx: &C, session: &Session) -> ServiceResult<UnreadCounts> {
    let messages = match messages::unread_count_for_user(ctx, session.user_id).await {
        Ok(count) => count,
        Err(e) => return unexpected(e),
    };
    let notifications = match notifications::unread_count(ctx, session.user_id).await {
        Ok(count) => count,
        Err(e) => return unexpected(e),
    };
    Ok(UnreadCounts {
        messages,
        notifications,
    })
}
