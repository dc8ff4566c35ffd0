use crate::client::error::{ClientError, ClientResult};
use crate::client::poller::PollHandle;
use crate::client::transport::ChatTransport;
use crate::client::view::ConversationView;
use crate::models::conversations::{Conversation, ConversationOverview};
use crate::models::notifications::Notification;
use crate::models::unread::UnreadCounts;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Conversation overview and unread badges.
    pub overview_poll_interval: Duration,
    /// The currently open thread.
    pub thread_poll_interval: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            overview_poll_interval: Duration::from_secs(5),
            thread_poll_interval: Duration::from_secs(2),
        }
    }
}

/// The client's local picture of the server, replaced piecewise by each
/// poll.
#[derive(Debug, Clone, Default)]
pub struct ClientState {
    pub conversations: Vec<ConversationOverview>,
    pub unread: UnreadCounts,
    pub open_thread: Option<ConversationView>,
}

/// Owns the poll loops for one signed-in user. Dropping the client aborts
/// every loop.
pub struct SyncClient<T: ChatTransport + 'static> {
    transport: Arc<T>,
    config: SyncConfig,
    state: Arc<Mutex<ClientState>>,
    overview_poller: Option<PollHandle>,
    thread_poller: Option<PollHandle>,
}

fn lock_state(state: &Mutex<ClientState>) -> MutexGuard<'_, ClientState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<T: ChatTransport + 'static> SyncClient<T> {
    pub fn new(transport: T, config: SyncConfig) -> Self {
        Self {
            transport: Arc::new(transport),
            config,
            state: Arc::default(),
            overview_poller: None,
            thread_poller: None,
        }
    }

    /// Starts the overview/badge loop for an active user session.
    pub fn start(&mut self) {
        if self.overview_poller.is_some() {
            return;
        }
        let transport = Arc::clone(&self.transport);
        let state = Arc::clone(&self.state);
        self.overview_poller = Some(PollHandle::spawn(
            "overview",
            self.config.overview_poll_interval,
            move || {
                let transport = Arc::clone(&transport);
                let state = Arc::clone(&state);
                async move { poll_overview(transport.as_ref(), &state).await }
            },
        ));
    }

    /// Opens a thread view. The previous thread loop is torn down before the
    /// new one starts; at most one thread poller ever runs.
    pub fn open_conversation(&mut self, conversation_id: u64) {
        self.thread_poller = None;
        lock_state(&self.state).open_thread = Some(ConversationView::new(conversation_id));

        let transport = Arc::clone(&self.transport);
        let state = Arc::clone(&self.state);
        self.thread_poller = Some(PollHandle::spawn(
            "thread",
            self.config.thread_poll_interval,
            move || {
                let transport = Arc::clone(&transport);
                let state = Arc::clone(&state);
                async move { poll_thread(transport.as_ref(), &state, conversation_id).await }
            },
        ));
    }

    pub fn close_conversation(&mut self) {
        self.thread_poller = None;
        lock_state(&self.state).open_thread = None;
    }

    /// Stops every poll loop. Used on navigation away and logout.
    pub fn shutdown(&mut self) {
        self.thread_poller = None;
        self.overview_poller = None;
    }

    pub fn snapshot(&self) -> ClientState {
        lock_state(&self.state).clone()
    }

    pub fn set_compose_text(&self, text: impl Into<String>) {
        if let Some(view) = lock_state(&self.state).open_thread.as_mut() {
            view.set_compose_text(text);
        }
    }

    pub async fn start_conversation(&self, listing_id: i64) -> ClientResult<Conversation> {
        self.transport.get_or_create_conversation(listing_id).await
    }

    /// Optimistic send: the entry renders and the input clears before the
    /// request leaves; on failure both are rolled back.
    pub async fn send_message(&self) -> ClientResult<()> {
        let (conversation_id, local) = {
            let mut state = lock_state(&self.state);
            let view = state.open_thread.as_mut().ok_or(ClientError::NotFound)?;
            let Some(local) = view.begin_send() else {
                return Ok(());
            };
            (view.conversation_id(), local)
        };

        let result = self.transport.send_message(conversation_id, &local.body).await;
        let mut state = lock_state(&self.state);
        let view = state
            .open_thread
            .as_mut()
            .filter(|view| view.conversation_id() == conversation_id);
        match result {
            Ok(canonical) => {
                if let Some(view) = view {
                    view.confirm_send(local.temp_id, &canonical);
                }
                Ok(())
            }
            Err(e) => {
                if let Some(view) = view {
                    view.fail_send(local.temp_id);
                }
                Err(e)
            }
        }
    }

    /// Marks the open conversation's incoming messages read, then refreshes
    /// the badges so every surface agrees without waiting a full interval.
    pub async fn mark_open_conversation_read(&self) -> ClientResult<()> {
        let conversation_id = lock_state(&self.state)
            .open_thread
            .as_ref()
            .map(ConversationView::conversation_id)
            .ok_or(ClientError::NotFound)?;
        self.transport.mark_conversation_read(conversation_id).await?;
        if let Ok(unread) = self.transport.fetch_unread_counts().await {
            lock_state(&self.state).unread = unread;
        }
        Ok(())
    }

    pub async fn fetch_notifications(
        &self,
        page: usize,
        page_size: usize,
    ) -> ClientResult<Vec<Notification>> {
        self.transport.list_notifications(page, page_size).await
    }

    pub async fn mark_notification_read(&self, notification_id: u64) -> ClientResult<()> {
        self.transport.mark_notification_read(notification_id).await
    }

    pub async fn mark_all_notifications_read(&self) -> ClientResult<()> {
        self.transport.mark_all_notifications_read().await
    }
}

async fn poll_overview<T: ChatTransport>(transport: &T, state: &Mutex<ClientState>) {
    // a failed poll keeps the previous view untouched; the next tick retries
    match transport.list_conversations().await {
        Ok(conversations) => lock_state(state).conversations = conversations,
        Err(e) => debug!("conversation list poll failed: {e}"),
    }
    match transport.fetch_unread_counts().await {
        Ok(unread) => lock_state(state).unread = unread,
        Err(e) => debug!("unread badge poll failed: {e}"),
    }
}

async fn poll_thread<T: ChatTransport>(
    transport: &T,
    state: &Mutex<ClientState>,
    conversation_id: u64,
) {
    match transport.fetch_messages(conversation_id).await {
        Ok(messages) => {
            let mut state = lock_state(state);
            if let Some(view) = state.open_thread.as_mut() {
                if view.conversation_id() == conversation_id {
                    view.reconcile(messages);
                }
            }
        }
        Err(e) => debug!("message poll failed: {e}"),
    }
}
