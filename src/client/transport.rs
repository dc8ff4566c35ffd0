use crate::client::error::{ClientError, ClientResult};
use crate::models::conversations::{Conversation, ConversationOverview, CreateConversationArgs};
use crate::models::messages::{Message, SendMessageArgs};
use crate::models::notifications::Notification;
use crate::models::unread::UnreadCounts;
use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::AUTHORIZATION;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// The server operations the sync client runs against. Implemented over
/// HTTP in production; tests drive the client through an in-memory fake.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn get_or_create_conversation(&self, listing_id: i64) -> ClientResult<Conversation>;
    async fn list_conversations(&self) -> ClientResult<Vec<ConversationOverview>>;
    async fn fetch_messages(&self, conversation_id: u64) -> ClientResult<Vec<Message>>;
    async fn send_message(&self, conversation_id: u64, body: &str) -> ClientResult<Message>;
    async fn mark_conversation_read(&self, conversation_id: u64) -> ClientResult<()>;
    async fn list_notifications(
        &self,
        page: usize,
        page_size: usize,
    ) -> ClientResult<Vec<Notification>>;
    async fn mark_notification_read(&self, notification_id: u64) -> ClientResult<()>;
    async fn mark_all_notifications_read(&self) -> ClientResult<()>;
    async fn fetch_unread_counts(&self) -> ClientResult<UnreadCounts>;
}

fn map_status(status: StatusCode) -> ClientError {
    match status {
        StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
        StatusCode::FORBIDDEN => ClientError::Forbidden,
        StatusCode::NOT_FOUND => ClientError::NotFound,
        StatusCode::BAD_REQUEST => ClientError::InvalidInput,
        _ => ClientError::Transient,
    }
}

pub struct HttpTransport {
    base_url: String,
    bearer_token: String,
    http: reqwest::Client,
}

impl HttpTransport {
    /// `request_timeout` bounds every call; an expired call surfaces as
    /// `Transient` and the caller waits for its next tick.
    pub fn new(
        base_url: impl Into<String>,
        bearer_token: impl Into<String>,
        request_timeout: Duration,
    ) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(request_timeout).build()?;
        Ok(Self {
            base_url: base_url.into(),
            bearer_token: bearer_token.into(),
            http,
        })
    }

    fn make_url(&self, endpoint: &str) -> String {
        format!("{}{endpoint}", self.base_url)
    }

    fn auth_header(&self) -> String {
        format!("Bearer {}", self.bearer_token)
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> ClientResult<T> {
        let response = self
            .http
            .get(self.make_url(endpoint))
            .header(AUTHORIZATION, self.auth_header())
            .send()
            .await
            .map_err(|_| ClientError::Transient)?;
        decode(response).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> ClientResult<T> {
        let response = self
            .http
            .post(self.make_url(endpoint))
            .header(AUTHORIZATION, self.auth_header())
            .json(body)
            .send()
            .await
            .map_err(|_| ClientError::Transient)?;
        decode(response).await
    }

    async fn post_empty(&self, endpoint: &str) -> ClientResult<()> {
        let response = self
            .http
            .post(self.make_url(endpoint))
            .header(AUTHORIZATION, self.auth_header())
            .send()
            .await
            .map_err(|_| ClientError::Transient)?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(map_status(status))
        }
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
    let status = response.status();
    if !status.is_success() {
        return Err(map_status(status));
    }
    response.json().await.map_err(|_| ClientError::Transient)
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn get_or_create_conversation(&self, listing_id: i64) -> ClientResult<Conversation> {
        self.post_json("/api/v1/conversations", &CreateConversationArgs { listing_id })
            .await
    }

    async fn list_conversations(&self) -> ClientResult<Vec<ConversationOverview>> {
        self.get_json("/api/v1/conversations").await
    }

    async fn fetch_messages(&self, conversation_id: u64) -> ClientResult<Vec<Message>> {
        self.get_json(&format!("/api/v1/conversations/{conversation_id}/messages"))
            .await
    }

    async fn send_message(&self, conversation_id: u64, body: &str) -> ClientResult<Message> {
        self.post_json(
            &format!("/api/v1/conversations/{conversation_id}/messages"),
            &SendMessageArgs {
                body: body.to_owned(),
            },
        )
        .await
    }

    async fn mark_conversation_read(&self, conversation_id: u64) -> ClientResult<()> {
        self.post_empty(&format!("/api/v1/conversations/{conversation_id}/read"))
            .await
    }

    async fn list_notifications(
        &self,
        page: usize,
        page_size: usize,
    ) -> ClientResult<Vec<Notification>> {
        self.get_json(&format!(
            "/api/v1/notifications?page={page}&page_size={page_size}"
        ))
        .await
    }

    async fn mark_notification_read(&self, notification_id: u64) -> ClientResult<()> {
        self.post_empty(&format!("/api/v1/notifications/{notification_id}/read"))
            .await
    }

    async fn mark_all_notifications_read(&self) -> ClientResult<()> {
        self.post_empty("/api/v1/notifications/read-all").await
    }

    async fn fetch_unread_counts(&self) -> ClientResult<UnreadCounts> {
        self.get_json("/api/v1/unread").await
    }
}
