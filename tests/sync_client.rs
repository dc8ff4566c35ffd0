//! Drives the sync client against an in-memory server double implementing
//! the same contract as the HTTP API: unique conversations per
//! (listing, buyer), ordered append-only message logs, monotonic read
//! flags, de-duplicated new-message fan-out and recomputed unread counts.

use async_trait::async_trait;
use bazaar_chat_service::client::{
    ChatTransport, ClientError, ClientResult, SyncClient, SyncConfig, ThreadEntry,
};
use bazaar_chat_service::entities::notifications::NotificationKind;
use bazaar_chat_service::models::conversations::{
    Conversation, ConversationOverview, MessagePreview,
};
use bazaar_chat_service::models::messages::Message;
use bazaar_chat_service::models::notifications::Notification;
use bazaar_chat_service::models::unread::UnreadCounts;
use chrono::Utc;
use hashbrown::HashMap;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

const BUYER: i64 = 10;
const SELLER: i64 = 20;
const OUTSIDER: i64 = 99;
const LISTING: i64 = 500;

#[derive(Default)]
struct FakeServer {
    next_conversation_id: u64,
    next_message_id: u64,
    next_notification_id: u64,
    listings: HashMap<i64, i64>,
    conversations: Vec<Conversation>,
    messages: HashMap<u64, Vec<Message>>,
    notifications: Vec<Notification>,
    fail_next_send: bool,
    requests: u64,
}

impl FakeServer {
    fn conversation(&self, conversation_id: u64) -> Option<&Conversation> {
        self.conversations
            .iter()
            .find(|c| c.conversation_id == conversation_id)
    }

    fn is_participant(&self, conversation_id: u64, user_id: i64) -> bool {
        self.conversation(conversation_id)
            .is_some_and(|c| c.buyer_id == user_id || c.seller_id == user_id)
    }

    fn unread_message_count(&self, user_id: i64) -> i64 {
        self.conversations
            .iter()
            .filter(|c| c.buyer_id == user_id || c.seller_id == user_id)
            .flat_map(|c| self.messages.get(&c.conversation_id).into_iter().flatten())
            .filter(|m| m.sender_id != user_id && !m.read)
            .count() as i64
    }

    fn unread_notification_count(&self, user_id: i64) -> i64 {
        self.notifications
            .iter()
            .filter(|n| n.recipient_id == user_id && !n.read)
            .count() as i64
    }

    /// Collaborator-side publish, the way price proposals and report
    /// outcomes reach the outbox.
    fn publish(
        &mut self,
        recipient_id: i64,
        kind: NotificationKind,
        title: &str,
        body: &str,
        link: Option<&str>,
    ) {
        self.next_notification_id += 1;
        self.notifications.push(Notification {
            notification_id: self.next_notification_id,
            recipient_id,
            kind,
            title: title.to_owned(),
            body: body.to_owned(),
            link: link.map(str::to_owned),
            created_at: Utc::now(),
            read: false,
        });
    }

    fn notify_new_message(&mut self, recipient_id: i64, conversation_id: u64) {
        let link = format!("/conversations/{conversation_id}");
        let already_pending = self.notifications.iter().any(|n| {
            n.recipient_id == recipient_id
                && n.kind == NotificationKind::NewMessage
                && !n.read
                && n.link.as_deref() == Some(link.as_str())
        });
        if !already_pending {
            self.publish(
                recipient_id,
                NotificationKind::NewMessage,
                "New message",
                "You have received a new message.",
                Some(&link),
            );
        }
    }
}

#[derive(Clone)]
struct FakeTransport {
    server: Arc<Mutex<FakeServer>>,
    user_id: i64,
}

impl FakeTransport {
    fn new(server: Arc<Mutex<FakeServer>>, user_id: i64) -> Self {
        Self { server, user_id }
    }
}

#[async_trait]
impl ChatTransport for FakeTransport {
    async fn get_or_create_conversation(&self, listing_id: i64) -> ClientResult<Conversation> {
        let mut server = self.server.lock().unwrap();
        server.requests += 1;
        let owner_id = *server
            .listings
            .get(&listing_id)
            .ok_or(ClientError::NotFound)?;
        if owner_id == self.user_id {
            return Err(ClientError::InvalidInput);
        }
        if let Some(existing) = server
            .conversations
            .iter()
            .find(|c| c.listing_id == listing_id && c.buyer_id == self.user_id)
        {
            return Ok(existing.clone());
        }
        server.next_conversation_id += 1;
        let now = Utc::now();
        let conversation = Conversation {
            conversation_id: server.next_conversation_id,
            listing_id,
            buyer_id: self.user_id,
            seller_id: owner_id,
            created_at: now,
            last_activity_at: now,
        };
        server.conversations.push(conversation.clone());
        Ok(conversation)
    }

    async fn list_conversations(&self) -> ClientResult<Vec<ConversationOverview>> {
        let mut server = self.server.lock().unwrap();
        server.requests += 1;
        let mut overview: Vec<ConversationOverview> = server
            .conversations
            .iter()
            .filter(|c| c.buyer_id == self.user_id || c.seller_id == self.user_id)
            .map(|c| {
                let log = server.messages.get(&c.conversation_id);
                let last_message = log
                    .and_then(|log| log.last())
                    .map(|m| MessagePreview {
                        sender_id: m.sender_id,
                        body: m.body.clone(),
                        created_at: m.created_at,
                    });
                let unread_count = log
                    .into_iter()
                    .flatten()
                    .filter(|m| m.sender_id != self.user_id && !m.read)
                    .count() as i64;
                ConversationOverview {
                    conversation_id: c.conversation_id,
                    listing_id: c.listing_id,
                    buyer_id: c.buyer_id,
                    seller_id: c.seller_id,
                    created_at: c.created_at,
                    last_activity_at: c.last_activity_at,
                    last_message,
                    unread_count,
                }
            })
            .collect();
        overview.sort_by(|a, b| b.last_activity_at.cmp(&a.last_activity_at));
        Ok(overview)
    }

    async fn fetch_messages(&self, conversation_id: u64) -> ClientResult<Vec<Message>> {
        let mut server = self.server.lock().unwrap();
        server.requests += 1;
        if server.conversation(conversation_id).is_none() {
            return Err(ClientError::NotFound);
        }
        if !server.is_participant(conversation_id, self.user_id) {
            return Err(ClientError::Forbidden);
        }
        Ok(server
            .messages
            .get(&conversation_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn send_message(&self, conversation_id: u64, body: &str) -> ClientResult<Message> {
        let mut server = self.server.lock().unwrap();
        server.requests += 1;
        if server.fail_next_send {
            server.fail_next_send = false;
            return Err(ClientError::Transient);
        }
        let conversation = server
            .conversation(conversation_id)
            .cloned()
            .ok_or(ClientError::NotFound)?;
        if !server.is_participant(conversation_id, self.user_id) {
            return Err(ClientError::Forbidden);
        }
        if body.trim().is_empty() {
            return Err(ClientError::InvalidInput);
        }
        server.next_message_id += 1;
        let message = Message {
            message_id: server.next_message_id,
            conversation_id,
            sender_id: self.user_id,
            body: body.to_owned(),
            created_at: Utc::now(),
            read: false,
        };
        server
            .messages
            .entry(conversation_id)
            .or_default()
            .push(message.clone());
        let recipient_id = if conversation.buyer_id == self.user_id {
            conversation.seller_id
        } else {
            conversation.buyer_id
        };
        server.notify_new_message(recipient_id, conversation_id);
        Ok(message)
    }

    async fn mark_conversation_read(&self, conversation_id: u64) -> ClientResult<()> {
        let mut server = self.server.lock().unwrap();
        server.requests += 1;
        if !server.is_participant(conversation_id, self.user_id) {
            return Err(ClientError::Forbidden);
        }
        let user_id = self.user_id;
        for message in server.messages.entry(conversation_id).or_default() {
            if message.sender_id != user_id {
                message.read = true;
            }
        }
        Ok(())
    }

    async fn list_notifications(
        &self,
        page: usize,
        page_size: usize,
    ) -> ClientResult<Vec<Notification>> {
        let mut server = self.server.lock().unwrap();
        server.requests += 1;
        Ok(server
            .notifications
            .iter()
            .rev()
            .filter(|n| n.recipient_id == self.user_id)
            .skip(page * page_size)
            .take(page_size)
            .cloned()
            .collect())
    }

    async fn mark_notification_read(&self, notification_id: u64) -> ClientResult<()> {
        let mut server = self.server.lock().unwrap();
        server.requests += 1;
        let user_id = self.user_id;
        let notification = server
            .notifications
            .iter_mut()
            .find(|n| n.notification_id == notification_id)
            .ok_or(ClientError::NotFound)?;
        if notification.recipient_id != user_id {
            return Err(ClientError::Forbidden);
        }
        notification.read = true;
        Ok(())
    }

    async fn mark_all_notifications_read(&self) -> ClientResult<()> {
        let mut server = self.server.lock().unwrap();
        server.requests += 1;
        let user_id = self.user_id;
        for notification in &mut server.notifications {
            if notification.recipient_id == user_id {
                notification.read = true;
            }
        }
        Ok(())
    }

    async fn fetch_unread_counts(&self) -> ClientResult<UnreadCounts> {
        let mut server = self.server.lock().unwrap();
        server.requests += 1;
        Ok(UnreadCounts {
            messages: server.unread_message_count(self.user_id),
            notifications: server.unread_notification_count(self.user_id),
        })
    }
}

fn make_server() -> Arc<Mutex<FakeServer>> {
    let server = FakeServer {
        listings: HashMap::from([(LISTING, SELLER)]),
        ..Default::default()
    };
    Arc::new(Mutex::new(server))
}

fn fast_config() -> SyncConfig {
    SyncConfig {
        overview_poll_interval: Duration::from_secs(5),
        thread_poll_interval: Duration::from_secs(2),
    }
}

#[tokio::test(start_paused = true)]
async fn basic_exchange_flips_unread_counts() {
    let server = make_server();
    let buyer_transport = FakeTransport::new(Arc::clone(&server), BUYER);
    let seller_transport = FakeTransport::new(Arc::clone(&server), SELLER);

    let mut buyer = SyncClient::new(buyer_transport, fast_config());
    let conversation = buyer.start_conversation(LISTING).await.unwrap();
    buyer.open_conversation(conversation.conversation_id);

    buyer.set_compose_text("Is this available?");
    buyer.send_message().await.unwrap();

    assert_eq!(
        seller_transport.fetch_unread_counts().await.unwrap().messages,
        1
    );
    assert_eq!(buyer.snapshot().unread.messages, 0);

    seller_transport
        .mark_conversation_read(conversation.conversation_id)
        .await
        .unwrap();
    assert_eq!(
        seller_transport.fetch_unread_counts().await.unwrap().messages,
        0
    );
    assert_eq!(
        FakeTransport::new(Arc::clone(&server), BUYER)
            .fetch_unread_counts()
            .await
            .unwrap()
            .messages,
        0
    );

    // the optimistic entry is superseded by the canonical row on poll
    sleep(Duration::from_secs(3)).await;
    let entries = buyer.snapshot().open_thread.unwrap().entries();
    assert_eq!(entries.len(), 1);
    match &entries[0] {
        ThreadEntry::Canonical(m) => {
            assert_eq!(m.body, "Is this available?");
            assert_eq!(m.sender_id, BUYER);
        }
        ThreadEntry::Local(_) => panic!("optimistic entry was not reconciled away"),
    }
}

#[tokio::test]
async fn repeated_and_concurrent_creates_return_one_conversation() {
    let server = make_server();
    let transport = FakeTransport::new(server, BUYER);
    let client = SyncClient::new(transport, fast_config());

    let first = client.start_conversation(LISTING).await.unwrap();
    let second = client.start_conversation(LISTING).await.unwrap();
    assert_eq!(first.conversation_id, second.conversation_id);

    let (a, b) = tokio::join!(
        client.start_conversation(LISTING),
        client.start_conversation(LISTING)
    );
    assert_eq!(a.unwrap().conversation_id, first.conversation_id);
    assert_eq!(b.unwrap().conversation_id, first.conversation_id);
}

#[tokio::test]
async fn outsider_is_forbidden_from_reading_history() {
    let server = make_server();
    let buyer_transport = FakeTransport::new(Arc::clone(&server), BUYER);
    let conversation = buyer_transport.get_or_create_conversation(LISTING).await.unwrap();

    let outsider = FakeTransport::new(server, OUTSIDER);
    assert_eq!(
        outsider.fetch_messages(conversation.conversation_id).await,
        Err(ClientError::Forbidden)
    );
}

#[tokio::test]
async fn own_listing_conversation_is_rejected() {
    let server = make_server();
    let seller_transport = FakeTransport::new(server, SELLER);
    assert_eq!(
        seller_transport.get_or_create_conversation(LISTING).await.err(),
        Some(ClientError::InvalidInput)
    );
}

#[tokio::test]
async fn failed_send_rolls_back_and_restores_input() {
    let server = make_server();
    let buyer_transport = FakeTransport::new(Arc::clone(&server), BUYER);
    let mut buyer = SyncClient::new(buyer_transport, fast_config());

    let conversation = buyer.start_conversation(LISTING).await.unwrap();
    buyer.open_conversation(conversation.conversation_id);

    server.lock().unwrap().fail_next_send = true;
    buyer.set_compose_text("hello?");
    assert_eq!(buyer.send_message().await, Err(ClientError::Transient));

    let view = buyer.snapshot().open_thread.unwrap();
    assert!(view.entries().is_empty(), "failed send must not stay rendered");
    assert_eq!(view.compose_text(), "hello?");
    assert!(server.lock().unwrap().messages.is_empty());
}

#[tokio::test(start_paused = true)]
async fn message_burst_produces_one_notification() {
    let server = make_server();
    let buyer_transport = FakeTransport::new(Arc::clone(&server), BUYER);
    let mut buyer = SyncClient::new(buyer_transport, fast_config());

    let conversation = buyer.start_conversation(LISTING).await.unwrap();
    buyer.open_conversation(conversation.conversation_id);
    for body in ["hi", "is this available?", "could you ship it?"] {
        buyer.set_compose_text(body);
        buyer.send_message().await.unwrap();
    }

    let seller_transport = FakeTransport::new(server, SELLER);
    let inbox = seller_transport.list_notifications(0, 25).await.unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].kind, NotificationKind::NewMessage);
    assert_eq!(
        inbox[0].link.as_deref(),
        Some(format!("/conversations/{}", conversation.conversation_id).as_str())
    );
}

#[tokio::test]
async fn price_proposal_fans_out_to_the_seller_only() {
    let server = make_server();
    server.lock().unwrap().publish(
        SELLER,
        NotificationKind::PriceProposal,
        "New offer: 1000",
        "You received an offer of 1000 for your listing priced 1500.",
        Some("/listings/500"),
    );

    let seller_transport = FakeTransport::new(Arc::clone(&server), SELLER);
    let inbox = seller_transport.list_notifications(0, 25).await.unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].kind, NotificationKind::PriceProposal);
    assert_eq!(inbox[0].link.as_deref(), Some("/listings/500"));

    let buyer_transport = FakeTransport::new(server, BUYER);
    assert!(buyer_transport.list_notifications(0, 25).await.unwrap().is_empty());
    assert_eq!(
        buyer_transport.fetch_unread_counts().await.unwrap().notifications,
        0
    );
}

#[tokio::test(start_paused = true)]
async fn shutdown_stops_every_poll_loop() {
    let server = make_server();
    let buyer_transport = FakeTransport::new(Arc::clone(&server), BUYER);
    let mut buyer = SyncClient::new(buyer_transport, fast_config());

    let conversation = buyer.start_conversation(LISTING).await.unwrap();
    buyer.start();
    buyer.open_conversation(conversation.conversation_id);

    sleep(Duration::from_secs(20)).await;
    assert!(server.lock().unwrap().requests > 1, "pollers never ran");

    buyer.shutdown();
    sleep(Duration::from_millis(50)).await;
    let after_shutdown = server.lock().unwrap().requests;
    sleep(Duration::from_secs(60)).await;
    assert_eq!(
        server.lock().unwrap().requests,
        after_shutdown,
        "a poll loop survived shutdown"
    );
}

#[tokio::test(start_paused = true)]
async fn switching_conversations_tears_down_the_previous_thread_poller() {
    let server = make_server();
    server.lock().unwrap().listings.insert(501, SELLER);

    let buyer_transport = FakeTransport::new(Arc::clone(&server), BUYER);
    let mut buyer = SyncClient::new(buyer_transport.clone(), fast_config());
    let first = buyer.start_conversation(LISTING).await.unwrap();
    let second = buyer.start_conversation(501).await.unwrap();

    buyer.open_conversation(first.conversation_id);
    sleep(Duration::from_secs(4)).await;
    buyer.open_conversation(second.conversation_id);

    // a message lands in the first conversation; only the second thread is
    // being polled now
    buyer_transport
        .send_message(first.conversation_id, "ping")
        .await
        .unwrap();
    sleep(Duration::from_secs(4)).await;

    let view = buyer.snapshot().open_thread.unwrap();
    assert_eq!(view.conversation_id(), second.conversation_id);
    assert!(view.entries().is_empty());
}

#[tokio::test(start_paused = true)]
async fn unread_badge_converges_to_ground_truth_after_random_activity() {
    let server = make_server();
    let buyer_transport = FakeTransport::new(Arc::clone(&server), BUYER);
    let seller_transport = FakeTransport::new(Arc::clone(&server), SELLER);

    let mut buyer = SyncClient::new(buyer_transport.clone(), fast_config());
    let conversation = buyer.start_conversation(LISTING).await.unwrap();
    buyer.start();

    let mut rng = StdRng::seed_from_u64(7);
    for round in 0..200 {
        match rng.random_range(0..4u32) {
            0 => {
                buyer_transport
                    .send_message(conversation.conversation_id, &format!("b{round}"))
                    .await
                    .unwrap();
            }
            1 => {
                seller_transport
                    .send_message(conversation.conversation_id, &format!("s{round}"))
                    .await
                    .unwrap();
            }
            2 => {
                buyer_transport
                    .mark_conversation_read(conversation.conversation_id)
                    .await
                    .unwrap();
            }
            _ => {
                seller_transport
                    .mark_conversation_read(conversation.conversation_id)
                    .await
                    .unwrap();
            }
        }
    }

    // one overview interval later the badge must equal a fresh recount
    sleep(Duration::from_secs(6)).await;
    let expected = {
        let server = server.lock().unwrap();
        UnreadCounts {
            messages: server.unread_message_count(BUYER),
            notifications: server.unread_notification_count(BUYER),
        }
    };
    assert_eq!(buyer.snapshot().unread, expected);
}
