//! services/api/src/web/conversation.rs
//!
//! Server-side conversation state for chat visitors, keyed by the
//! `visitor_id` cookie. Conversations hold the turns replayed to the model
//! and are dropped after a period of inactivity.

use chrono::{DateTime, Duration, Utc};
use course_assistant_core::domain::ChatTurn;
use std::collections::{HashMap, VecDeque};
use tokio::sync::Mutex;
use uuid::Uuid;

struct Conversation {
    turns: VecDeque<ChatTurn>,
    last_seen: DateTime<Utc>,
}

pub struct ConversationStore {
    conversations: Mutex<HashMap<Uuid, Conversation>>,
    max_turns: usize,
    idle_timeout: Duration,
}

impl ConversationStore {
    pub fn new(max_turns: usize, idle_timeout: Duration) -> Self {
        Self {
            conversations: Mutex::new(HashMap::new()),
            max_turns,
            idle_timeout,
        }
    }

    /// Returns the visitor's live turns, oldest first. Expired conversations
    /// are pruned on the way.
    pub async fn history(&self, visitor: Uuid, now: DateTime<Utc>) -> Vec<ChatTurn> {
        let mut conversations = self.conversations.lock().await;
        let cutoff = now - self.idle_timeout;
        conversations.retain(|_, c| c.last_seen >= cutoff);
        conversations
            .get(&visitor)
            .map(|c| c.turns.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Appends a turn, creating the conversation on first contact.
    pub async fn push(&self, visitor: Uuid, turn: ChatTurn, now: DateTime<Utc>) {
        if self.max_turns == 0 {
            return;
        }
        let mut conversations = self.conversations.lock().await;
        let conversation = conversations.entry(visitor).or_insert_with(|| Conversation {
            turns: VecDeque::new(),
            last_seen: now,
        });
        conversation.turns.push_back(turn);
        while conversation.turns.len() > self.max_turns {
            conversation.turns.pop_front();
        }
        conversation.last_seen = now;
    }

    /// Drops the visitor's conversation. Returns whether one existed.
    pub async fn end(&self, visitor: Uuid) -> bool {
        self.conversations.lock().await.remove(&visitor).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(n: usize) -> ChatTurn {
        ChatTurn {
            user_message: format!("q{n}"),
            bot_response: format!("a{n}"),
        }
    }

    #[tokio::test]
    async fn keeps_only_the_newest_turns() {
        let store = ConversationStore::new(2, Duration::minutes(60));
        let visitor = Uuid::new_v4();
        let now = Utc::now();
        for n in 0..3 {
            store.push(visitor, turn(n), now).await;
        }
        let history = store.history(visitor, now).await;
        assert_eq!(history, vec![turn(1), turn(2)]);
    }

    #[tokio::test]
    async fn idle_conversations_are_forgotten() {
        let store = ConversationStore::new(5, Duration::minutes(30));
        let visitor = Uuid::new_v4();
        let now = Utc::now();
        store.push(visitor, turn(0), now).await;
        assert_eq!(store.history(visitor, now + Duration::minutes(29)).await.len(), 1);
        assert!(store.history(visitor, now + Duration::minutes(31)).await.is_empty());
    }

    #[tokio::test]
    async fn ending_a_conversation_clears_history() {
        let store = ConversationStore::new(5, Duration::minutes(30));
        let visitor = Uuid::new_v4();
        let now = Utc::now();
        store.push(visitor, turn(0), now).await;
        assert!(store.end(visitor).await);
        assert!(!store.end(visitor).await);
        assert!(store.history(visitor, now).await.is_empty());
    }
}
