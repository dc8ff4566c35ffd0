use crate::models::messages::Message;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A locally-fabricated message rendered before the server confirmed it.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalMessage {
    pub temp_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
    confirmed_id: Option<u64>,
}

/// A rendered thread entry. Local entries carry no ordering guarantee
/// relative to concurrently-arriving canonical messages; reconciliation
/// replaces them once the server list covers them.
#[derive(Debug, Clone, PartialEq)]
pub enum ThreadEntry {
    Local(LocalMessage),
    Canonical(Message),
}

/// Per-open-conversation view state: the canonical message list as of the
/// last poll, optimistic entries still awaiting confirmation, and the
/// compose box.
#[derive(Debug, Clone, Default)]
pub struct ConversationView {
    conversation_id: u64,
    canonical: Vec<Message>,
    pending: Vec<LocalMessage>,
    compose: String,
}

impl ConversationView {
    pub fn new(conversation_id: u64) -> Self {
        Self {
            conversation_id,
            ..Default::default()
        }
    }

    pub fn conversation_id(&self) -> u64 {
        self.conversation_id
    }

    pub fn compose_text(&self) -> &str {
        &self.compose
    }

    pub fn set_compose_text(&mut self, text: impl Into<String>) {
        self.compose = text.into();
    }

    /// Takes the compose text and turns it into an optimistic entry: the
    /// message appears in the thread and the input clears before any network
    /// round trip.
    pub fn begin_send(&mut self) -> Option<LocalMessage> {
        if self.compose.trim().is_empty() {
            return None;
        }
        let local = LocalMessage {
            temp_id: Uuid::new_v4(),
            body: std::mem::take(&mut self.compose),
            created_at: Utc::now(),
            confirmed_id: None,
        };
        self.pending.push(local.clone());
        Some(local)
    }

    /// The send was durably stored; the entry stays rendered until a poll
    /// returns a canonical list containing it.
    pub fn confirm_send(&mut self, temp_id: Uuid, canonical: &Message) {
        if let Some(local) = self.pending.iter_mut().find(|l| l.temp_id == temp_id) {
            local.confirmed_id = Some(canonical.message_id);
        }
    }

    /// The send failed: the entry disappears from the thread and its text
    /// returns to the compose box for retry.
    pub fn fail_send(&mut self, temp_id: Uuid) {
        if let Some(pos) = self.pending.iter().position(|l| l.temp_id == temp_id) {
            let local = self.pending.remove(pos);
            if self.compose.is_empty() {
                self.compose = local.body;
            }
        }
    }

    /// Replaces the canonical list wholesale with the server's ordered list.
    /// Confirmed locals covered by the new list are dropped; in-flight ones
    /// stay rendered until their send resolves.
    pub fn reconcile(&mut self, canonical: Vec<Message>) {
        self.pending.retain(|local| match local.confirmed_id {
            Some(id) => !canonical.iter().any(|m| m.message_id == id),
            None => true,
        });
        self.canonical = canonical;
    }

    pub fn entries(&self) -> Vec<ThreadEntry> {
        self.canonical
            .iter()
            .cloned()
            .map(ThreadEntry::Canonical)
            .chain(self.pending.iter().cloned().map(ThreadEntry::Local))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canonical_message(message_id: u64, sender_id: i64, body: &str) -> Message {
        Message {
            message_id,
            conversation_id: 1,
            sender_id,
            body: body.to_owned(),
            created_at: Utc::now(),
            read: false,
        }
    }

    #[test]
    fn begin_send_renders_entry_and_clears_compose() {
        let mut view = ConversationView::new(1);
        view.set_compose_text("Is this available?");
        let local = view.begin_send().unwrap();

        assert_eq!(view.compose_text(), "");
        assert_eq!(
            view.entries(),
            vec![ThreadEntry::Local(local)],
        );
    }

    #[test]
    fn begin_send_ignores_empty_compose() {
        let mut view = ConversationView::new(1);
        view.set_compose_text("   ");
        assert!(view.begin_send().is_none());
        assert!(view.entries().is_empty());
    }

    #[test]
    fn failed_send_rolls_back_and_restores_compose() {
        let mut view = ConversationView::new(1);
        view.set_compose_text("hello there");
        let local = view.begin_send().unwrap();

        view.fail_send(local.temp_id);

        assert!(view.entries().is_empty());
        assert_eq!(view.compose_text(), "hello there");
    }

    #[test]
    fn failed_send_does_not_clobber_newer_compose_text() {
        let mut view = ConversationView::new(1);
        view.set_compose_text("first");
        let local = view.begin_send().unwrap();
        view.set_compose_text("second draft");

        view.fail_send(local.temp_id);

        assert_eq!(view.compose_text(), "second draft");
    }

    #[test]
    fn reconcile_supersedes_confirmed_local_entries() {
        let mut view = ConversationView::new(1);
        view.set_compose_text("on my way");
        let local = view.begin_send().unwrap();

        let stored = canonical_message(7, 10, "on my way");
        view.confirm_send(local.temp_id, &stored);
        // poll raced the send and does not carry the row yet
        view.reconcile(vec![]);
        assert_eq!(view.entries().len(), 1, "confirmed local still rendered");

        view.reconcile(vec![stored.clone()]);
        assert_eq!(view.entries(), vec![ThreadEntry::Canonical(stored)]);
    }

    #[test]
    fn reconcile_replaces_canonical_list_wholesale() {
        let mut view = ConversationView::new(1);
        view.reconcile(vec![canonical_message(1, 10, "a")]);
        view.reconcile(vec![
            canonical_message(1, 10, "a"),
            canonical_message(2, 20, "b"),
            canonical_message(3, 10, "c"),
        ]);

        let ids: Vec<u64> = view
            .entries()
            .iter()
            .map(|entry| match entry {
                ThreadEntry::Canonical(m) => m.message_id,
                ThreadEntry::Local(_) => panic!("no locals expected"),
            })
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn unconfirmed_local_survives_reconcile() {
        let mut view = ConversationView::new(1);
        view.set_compose_text("still in flight");
        let local = view.begin_send().unwrap();

        view.reconcile(vec![canonical_message(1, 20, "hi")]);

        assert_eq!(view.entries().len(), 2);
        assert_eq!(
            view.entries()[1],
            ThreadEntry::Local(local),
        );
    }
}
