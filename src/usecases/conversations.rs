use crate::adapters::listings_service;
use crate::common::context::Context;
use crate::common::error::{AppError, ServiceResult, unexpected};
use crate::entities::conversations::Conversation as ConversationEntity;
use crate::models::conversations::{Conversation, ConversationOverview};
use crate::models::sessions::Session;
use crate::repositories::conversations;

/// Resolves the listing owner and returns the one conversation for the
/// (listing, caller) pair, creating it when this is the first contact.
pub async fn get_or_create<C: Context>(
    ctx: &C,
    session: &Session,
    listing_id: i64,
) -> ServiceResult<Conversation> {
    let listing = listings_service::fetch_by_id(listing_id).await?;
    // ownerless listings cannot be messaged
    let owner_id = listing.owner_id.ok_or(AppError::ListingsNotFound)?;
    if owner_id == session.user_id {
        return Err(AppError::ConversationsWithSelf);
    }

    match conversations::get_or_create(ctx, listing.listing_id, session.user_id, owner_id).await {
        Ok(conversation) => Ok(Conversation::from(conversation)),
        Err(e) => unexpected(e),
    }
}

pub async fn list_for_user<C: Context>(
    ctx: &C,
    session: &Session,
) -> ServiceResult<Vec<ConversationOverview>> {
    match conversations::fetch_for_user(ctx, session.user_id).await {
        Ok(entries) => Ok(entries.into_iter().map(ConversationOverview::from).collect()),
        Err(e) => unexpected(e),
    }
}

/// Fetches the conversation and enforces that the caller is one of its two
/// participants.
pub async fn fetch_for_participant<C: Context>(
    ctx: &C,
    session: &Session,
    conversation_id: u64,
) -> ServiceResult<ConversationEntity> {
    let conversation = match conversations::fetch_one(ctx, conversation_id).await {
        Ok(conversation) => conversation,
        Err(sqlx::Error::RowNotFound) => return Err(AppError::ConversationsNotFound),
        Err(e) => return unexpected(e),
    };
    if !conversation.is_participant(session.user_id) {
        return Err(AppError::ConversationsForbidden);
    }
    Ok(conversation)
}
