//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use crate::web::conversation::ConversationStore;
use chrono::Duration;
use course_assistant_core::ports::{ChatModelService, Clock, DatabaseService};
use course_assistant_core::{AdminAuthenticator, ChatService};
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
    pub config: Arc<Config>,
    pub clock: Arc<dyn Clock>,
    pub auth: AdminAuthenticator,
    pub chat: ChatService,
    pub conversations: Arc<ConversationStore>,
}

impl AppState {
    /// Wires the core services around the given store, model and clock.
    pub fn new(
        config: Arc<Config>,
        db: Arc<dyn DatabaseService>,
        chat_model: Arc<dyn ChatModelService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let auth = AdminAuthenticator::new(db.clone(), clock.clone());
        let chat = ChatService::new(db.clone(), chat_model, clock.clone());
        let conversations = Arc::new(ConversationStore::new(
            config.chat_history_turns,
            Duration::minutes(config.chat_idle_minutes),
        ));
        Self {
            db,
            config,
            clock,
            auth,
            chat,
            conversations,
        }
    }
}
