use crate::common::context::Context;
use crate::common::error::{AppError, ServiceResult, unexpected};
use crate::models::messages::Message;
use crate::models::sessions::Session;
use crate::repositories::{conversations, messages};
use crate::usecases::{self, notifications};
use tracing::warn;

pub const MAX_MESSAGE_LENGTH: usize = 2000;

fn validate_body(body: &str) -> ServiceResult<&str> {
    let body = body.trim();
    if body.is_empty() || body.len() > MAX_MESSAGE_LENGTH {
        return Err(AppError::MessagesInvalidLength);
    }
    Ok(body)
}

/// Appends a message to the conversation and returns the canonical stored
/// row. The recipient gets a new-message notification unless one was already
/// raised for this conversation within the de-dup window.
pub async fn send<C: Context>(
    ctx: &C,
    session: &Session,
    conversation_id: u64,
    body: &str,
) -> ServiceResult<Message> {
    let body = validate_body(body)?;
    let conversation =
        usecases::conversations::fetch_for_participant(ctx, session, conversation_id).await?;

    let message = match messages::create(ctx, conversation.id, session.user_id, body).await {
        Ok(message) => message,
        Err(e) => return unexpected(e),
    };
    if let Err(e) = conversations::bump_last_activity(ctx, conversation.id).await {
        return unexpected(e);
    }

    let recipient_id = conversation.other_participant(session.user_id);
    if let Err(e) = notifications::notify_new_message(ctx, recipient_id, conversation.id).await {
        // the message write is the primary action and stays committed
        warn!("Failed to enqueue new-message notification: {:?}", e);
    }

    Ok(Message::from(message))
}

pub async fn fetch_history<C: Context>(
    ctx: &C,
    session: &Session,
    conversation_id: u64,
) -> ServiceResult<Vec<Message>> {
    let conversation =
        usecases::conversations::fetch_for_participant(ctx, session, conversation_id).await?;
    match messages::fetch_history(ctx, conversation.id).await {
        Ok(messages) => Ok(messages.into_iter().map(Message::from).collect()),
        Err(e) => unexpected(e),
    }
}

/// Marks every incoming message in the conversation as read. Idempotent.
pub async fn mark_read<C: Context>(
    ctx: &C,
    session: &Session,
    conversation_id: u64,
) -> ServiceResult<()> {
    let conversation =
        usecases::conversations::fetch_for_participant(ctx, session, conversation_id).await?;
    match messages::mark_read(ctx, conversation.id, session.user_id).await {
        Ok(()) => Ok(()),
        Err(e) => unexpected(e),
    }
}
