//! Client-side chat state: chatrooms, messages, typing flags, and the
//! pagination cursor over the synthetic backlog. The whole state is mirrored
//! to a JSON slot after every mutation and rehydrated once at startup.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use uuid::Uuid;

pub mod history;
pub mod persist;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub sender: Sender,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatData {
    pub id: String,
    pub name: String,
    pub messages: Vec<Message>,
    pub is_typing: bool,
    pub current_page: usize,
    pub has_more_messages: bool,
}

impl ChatData {
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }
}

pub type ChatState = HashMap<String, ChatData>;

/// Message fields supplied by the caller; the store stamps id and timestamp.
#[derive(Debug, Clone)]
pub struct MessageDraft {
    pub text: String,
    pub sender: Sender,
    pub image_url: Option<String>,
}

/// Owns the full chat state. Operations on an unknown chatroom id are silent
/// no-ops: callers only reference ids the store issued, so a miss is a
/// caller-contract violation rather than a reportable error. No operation
/// here ever raises.
pub struct ChatStore {
    chats: ChatState,
    initialized: bool,
    slot: PathBuf,
    revision: u64,
}

impl ChatStore {
    pub fn new(slot: PathBuf) -> Self {
        Self {
            chats: ChatState::new(),
            initialized: false,
            slot,
            revision: 0,
        }
    }

    /// Rehydrates from the durable slot. A missing slot means a first run; a
    /// corrupt slot is discarded with a warning. Either way the store comes
    /// up initialized and mutations start persisting. Idempotent.
    pub fn initialize(&mut self) {
        if self.initialized {
            return;
        }

        if self.slot.exists() {
            match persist::read_slot::<ChatState>(&self.slot) {
                Ok(state) => self.chats = state,
                Err(err) => {
                    tracing::warn!("discarding persisted chat state: {err}");
                    self.chats = ChatState::new();
                }
            }
        }

        self.initialized = true;
        self.revision += 1;
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Bumped on every observable state transition; lets the UI (and tests)
    /// tell a real mutation from a no-op.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn chats(&self) -> &ChatState {
        &self.chats
    }

    pub fn chat(&self, chat_id: &str) -> Option<&ChatData> {
        self.chats.get(chat_id)
    }

    /// Creates a chatroom seeded with the most recent page of synthetic
    /// history and returns its id. The caller enforces a non-empty name.
    pub fn initialize_chat(&mut self, name: &str) -> String {
        let chat_id = Uuid::new_v4().to_string();
        let chat = ChatData {
            id: chat_id.clone(),
            name: name.to_string(),
            messages: history::seed(Utc::now()),
            is_typing: false,
            current_page: 1,
            has_more_messages: history::TOTAL_HISTORICAL_MESSAGES > history::MESSAGES_PER_PAGE,
        };

        self.chats.insert(chat_id.clone(), chat);
        self.touch();
        chat_id
    }

    pub fn delete_chat(&mut self, chat_id: &str) {
        if self.chats.remove(chat_id).is_some() {
            self.touch();
        }
    }

    /// Reveals the next page of synthetic history by prepending it to the
    /// loaded messages. No-op once the backlog is exhausted; that boundary is
    /// signalled by `has_more_messages`, not by an error.
    pub fn load_previous_messages(&mut self, chat_id: &str) {
        let Some(chat) = self.chats.get_mut(chat_id) else {
            return;
        };
        if !chat.has_more_messages {
            return;
        }

        let range = history::revealed_range(chat.current_page);
        // The oldest loaded message sits at index `range.end`; recover the
        // anchor from it so the revealed page continues the same spacing.
        let anchor = chat
            .messages
            .first()
            .map(|oldest| history::anchor_for(oldest.timestamp, range.end))
            .unwrap_or_else(Utc::now);

        let mut combined = history::generate(anchor, range.clone());
        combined.append(&mut chat.messages);
        chat.messages = combined;

        chat.current_page += 1;
        chat.has_more_messages = range.start > 0;
        self.touch();
    }

    pub fn add_message(&mut self, chat_id: &str, draft: MessageDraft) {
        let Some(chat) = self.chats.get_mut(chat_id) else {
            return;
        };

        chat.messages.push(Message {
            id: Uuid::new_v4().to_string(),
            text: draft.text,
            timestamp: Utc::now(),
            sender: draft.sender,
            image_url: draft.image_url,
        });
        self.touch();
    }

    pub fn set_is_typing(&mut self, chat_id: &str, is_typing: bool) {
        let Some(chat) = self.chats.get_mut(chat_id) else {
            return;
        };
        if chat.is_typing == is_typing {
            return;
        }

        chat.is_typing = is_typing;
        self.touch();
    }

    fn touch(&mut self) {
        self.revision += 1;
        self.persist();
    }

    /// Full-snapshot write of the entire state, gated until the initial load
    /// has completed so a fresh default never clobbers durable state. Write
    /// failures are logged and swallowed.
    fn persist(&self) {
        if !self.initialized {
            return;
        }
        if let Err(err) = persist::write_slot(&self.slot, &self.chats) {
            tracing::warn!(slot = %self.slot.display(), "failed to persist chat state: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn fresh_store(prefix: &str) -> (ChatStore, PathBuf) {
        let slot = persist::temp_slot(prefix);
        let mut store = ChatStore::new(slot.clone());
        store.initialize();
        (store, slot)
    }

    fn user_draft(text: &str) -> MessageDraft {
        MessageDraft {
            text: text.to_string(),
            sender: Sender::User,
            image_url: None,
        }
    }

    #[test]
    fn fresh_chatroom_holds_the_newest_page() {
        let (mut store, slot) = fresh_store("fresh_chat");
        let id = store.initialize_chat("Room A");

        let chat = store.chat(&id).expect("chatroom was just created");
        assert_eq!(chat.name, "Room A");
        assert_eq!(chat.messages.len(), 20);
        assert_eq!(chat.current_page, 1);
        assert!(chat.has_more_messages);
        assert!(!chat.is_typing);

        let _ = fs::remove_file(slot);
    }

    #[test]
    fn pagination_reveals_older_pages_then_exhausts() {
        let (mut store, slot) = fresh_store("pagination");
        let id = store.initialize_chat("Room A");

        store.load_previous_messages(&id);
        {
            let chat = store.chat(&id).expect("chatroom exists");
            assert_eq!(chat.messages.len(), 40);
            assert_eq!(chat.current_page, 2);
            assert!(chat.has_more_messages);
        }

        store.load_previous_messages(&id);
        {
            let chat = store.chat(&id).expect("chatroom exists");
            assert_eq!(chat.messages.len(), 60);
            assert_eq!(chat.current_page, 3);
            assert!(!chat.has_more_messages);
        }

        let before = store.revision();
        store.load_previous_messages(&id);
        let chat = store.chat(&id).expect("chatroom exists");
        assert_eq!(chat.messages.len(), 60);
        assert_eq!(chat.current_page, 3);
        assert_eq!(store.revision(), before, "exhausted pagination is a no-op");

        let _ = fs::remove_file(slot);
    }

    #[test]
    fn revealed_pages_keep_messages_in_ascending_order() {
        let (mut store, slot) = fresh_store("page_order");
        let id = store.initialize_chat("Room A");
        store.load_previous_messages(&id);
        store.load_previous_messages(&id);

        let chat = store.chat(&id).expect("chatroom exists");
        for pair in chat.messages.windows(2) {
            assert!(pair[0].timestamp <= pair[1].timestamp);
        }
        assert_eq!(chat.messages.first().map(|m| m.id.as_str()), Some("hist-1"));

        let _ = fs::remove_file(slot);
    }

    #[test]
    fn appended_messages_follow_the_seed_in_call_order() {
        let (mut store, slot) = fresh_store("append");
        let id = store.initialize_chat("Room A");

        store.add_message(&id, user_draft("first"));
        store.add_message(&id, user_draft("second"));
        store.add_message(
            &id,
            MessageDraft {
                text: "reply".to_string(),
                sender: Sender::Ai,
                image_url: None,
            },
        );

        let chat = store.chat(&id).expect("chatroom exists");
        assert_eq!(chat.messages.len(), 23);

        let tail: Vec<&str> = chat.messages[20..].iter().map(|m| m.text.as_str()).collect();
        assert_eq!(tail, vec!["first", "second", "reply"]);

        let mut ids: Vec<&str> = chat.messages.iter().map(|m| m.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), chat.messages.len(), "message ids are unique");

        for pair in chat.messages.windows(2) {
            assert!(pair[0].timestamp <= pair[1].timestamp);
        }

        let _ = fs::remove_file(slot);
    }

    #[test]
    fn attachments_survive_the_draft() {
        let (mut store, slot) = fresh_store("attachment");
        let id = store.initialize_chat("Room A");

        store.add_message(
            &id,
            MessageDraft {
                text: "look at this".to_string(),
                sender: Sender::User,
                image_url: Some("data:image/png;base64,aGk=".to_string()),
            },
        );

        let chat = store.chat(&id).expect("chatroom exists");
        let last = chat.last_message().expect("message was appended");
        assert_eq!(last.image_url.as_deref(), Some("data:image/png;base64,aGk="));

        let _ = fs::remove_file(slot);
    }

    #[test]
    fn delete_removes_the_entry_and_repeats_are_no_ops() {
        let (mut store, slot) = fresh_store("delete");
        let id = store.initialize_chat("Room A");
        assert!(store.chat(&id).is_some());

        store.delete_chat(&id);
        assert!(store.chat(&id).is_none());

        let before = store.revision();
        store.delete_chat(&id);
        assert_eq!(store.revision(), before, "second delete is a no-op");

        let _ = fs::remove_file(slot);
    }

    #[test]
    fn typing_flag_transitions_exactly_once_per_change() {
        let (mut store, slot) = fresh_store("typing");
        let id = store.initialize_chat("Room A");

        let r0 = store.revision();
        store.set_is_typing(&id, true);
        let r1 = store.revision();
        assert_eq!(r1, r0 + 1);

        store.set_is_typing(&id, true);
        assert_eq!(store.revision(), r1, "redundant set is a no-op");

        store.set_is_typing(&id, false);
        assert_eq!(store.revision(), r1 + 1);

        let _ = fs::remove_file(slot);
    }

    #[test]
    fn operations_on_unknown_ids_leave_state_untouched() {
        let (mut store, slot) = fresh_store("unknown_ids");
        let id = store.initialize_chat("Room A");
        store.delete_chat(&id);

        let before = store.revision();
        store.add_message(&id, user_draft("into the void"));
        store.add_message("never-issued", user_draft("also dropped"));
        store.set_is_typing(&id, true);
        store.load_previous_messages(&id);

        assert!(store.chats().is_empty());
        assert_eq!(store.revision(), before);

        let _ = fs::remove_file(slot);
    }

    #[test]
    fn snapshot_round_trips_through_the_slot() {
        let slot = persist::temp_slot("roundtrip");

        let mut store = ChatStore::new(slot.clone());
        store.initialize();
        let id = store.initialize_chat("Room A");
        store.add_message(&id, user_draft("hello"));
        store.set_is_typing(&id, true);
        store.load_previous_messages(&id);
        let snapshot = store.chats().clone();

        let mut reloaded = ChatStore::new(slot.clone());
        reloaded.initialize();
        assert_eq!(reloaded.chats(), &snapshot);

        let _ = fs::remove_file(slot);
    }

    #[test]
    fn corrupt_slot_falls_back_to_empty_state() {
        let slot = persist::temp_slot("corrupt_fallback");
        fs::write(&slot, b"{ definitely not a chat state").expect("fixture should write");

        let mut store = ChatStore::new(slot.clone());
        store.initialize();
        assert!(store.is_initialized());
        assert!(store.chats().is_empty());

        // The store is usable after recovery and persists over the bad data.
        let id = store.initialize_chat("Recovered");
        let reread: ChatState =
            persist::read_slot(&slot).expect("recovered snapshot should parse");
        assert!(reread.contains_key(&id));

        let _ = fs::remove_file(slot);
    }

    #[test]
    fn mutations_before_initialization_never_persist() {
        let slot = persist::temp_slot("gating");

        let mut store = ChatStore::new(slot.clone());
        store.initialize_chat("Too Early");
        assert!(!slot.exists(), "uninitialized store must not write the slot");

        store.initialize();
        store.initialize_chat("On Time");
        assert!(slot.exists());

        let _ = fs::remove_file(slot);
    }

    #[test]
    fn missing_slot_initializes_empty() {
        let (store, slot) = fresh_store("missing_slot");
        assert!(store.is_initialized());
        assert!(store.chats().is_empty());

        let _ = fs::remove_file(slot);
    }

    #[test]
    fn serialized_format_uses_the_documented_field_names() {
        let (mut store, slot) = fresh_store("wire_format");
        let id = store.initialize_chat("Room A");
        store.add_message(
            &id,
            MessageDraft {
                text: "hi".to_string(),
                sender: Sender::User,
                image_url: Some("data:image/png;base64,aGk=".to_string()),
            },
        );

        let raw: serde_json::Value =
            persist::read_slot(&slot).expect("snapshot should parse as JSON");
        let chat = &raw[id.as_str()];
        assert!(chat.get("isTyping").is_some());
        assert!(chat.get("currentPage").is_some());
        assert!(chat.get("hasMoreMessages").is_some());

        let last = chat["messages"]
            .as_array()
            .and_then(|m| m.last())
            .expect("messages serialize as an array");
        assert_eq!(last["sender"], "user");
        assert!(last.get("imageUrl").is_some());
        let hist = &chat["messages"][0];
        assert!(
            hist.get("imageUrl").is_none(),
            "absent attachments are omitted"
        );

        let _ = fs::remove_file(slot);
    }
}
