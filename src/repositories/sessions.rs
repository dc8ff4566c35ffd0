use crate::common::context::Context;
use redis::AsyncCommands;

fn make_session_key(token: &str) -> String {
    format!("bazaar:sessions:{token}")
}

/// Resolves a bearer token to the user id behind it. Sessions are issued and
/// expired by the auth service; this side only reads them.
pub async fn fetch_user_id<C: Context>(ctx: &C, token: &str) -> anyhow::Result<Option<i64>> {
    let mut redis = ctx.redis().await?;
    let session_key = make_session_key(token);
    let user_id: Option<i64> = redis.get(session_key).await?;
    Ok(user_id)
}
