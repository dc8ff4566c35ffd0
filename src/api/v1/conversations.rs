use crate::api::RequestContext;
use crate::common::error::{ServiceResponse, ServiceResult};
use crate::models::conversations::{Conversation, ConversationOverview, CreateConversationArgs};
use crate::models::messages::{Message, SendMessageArgs};
use crate::models::sessions::Session;
use crate::usecases::{conversations, messages};
use axum::Json;
use axum::extract::Path;
use axum::http::StatusCode;

pub async fn create(
    ctx: RequestContext,
    session: Session,
    Json(args): Json<CreateConversationArgs>,
) -> ServiceResponse<Conversation> {
    let conversation = conversations::get_or_create(&ctx, &session, args.listing_id).await?;
    Ok(Json(conversation))
}

pub async fn list(
    ctx: RequestContext,
    session: Session,
) -> ServiceResponse<Vec<ConversationOverview>> {
    let overview = conversations::list_for_user(&ctx, &session).await?;
    Ok(Json(overview))
}

pub async fn fetch_messages(
    ctx: RequestContext,
    session: Session,
    Path(conversation_id): Path<u64>,
) -> ServiceResponse<Vec<Message>> {
    let history = messages::fetch_history(&ctx, &session, conversation_id).await?;
    Ok(Json(history))
}

pub async fn send_message(
    ctx: RequestContext,
    session: Session,
    Path(conversation_id): Path<u64>,
    Json(args): Json<SendMessageArgs>,
) -> ServiceResponse<Message> {
    let message = messages::send(&ctx, &session, conversation_id, &args.body).await?;
    Ok(Json(message))
}

pub async fn mark_read(
    ctx: RequestContext,
    session: Session,
    Path(conversation_id): Path<u64>,
) -> ServiceResult<StatusCode> {
    messages::mark_read(&ctx, &session, conversation_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
