//! crates/course_assistant_core/src/chat.rs
//!
//! Turns a visitor question into a model call and records the exchange.

use crate::domain::{ChatRecord, ChatTurn, CourseCatalog};
use crate::ports::{ChatModelService, Clock, DatabaseService};
use chrono::{DateTime, Utc};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, warn};
use uuid::Uuid;

const COUNSELOR_PREAMBLE: &str = "You are a helpful university admission counselor chatbot. You have information about the following courses:";

const HOUSE_RULES: &str = r#"Key points to remember:
1. Always be polite and professional
2. Provide accurate information about courses based on the data provided
3. Handle general queries and greetings naturally
4. If asked about information not in the data, politely say you can only provide information about the listed courses
5. Keep responses concise but informative
6. Use appropriate emojis to make responses engaging
7. Format responses using markdown for better readability

Example interactions:
- Greet users warmly
- Answer questions about course duration, fees, and subjects
- Provide guidance on admission process
- Handle small talk naturally
- Stay focused on academic and admission related queries"#;

/// Builds the static context string handed to the model with every question.
pub fn build_context(catalog: &CourseCatalog) -> String {
    let data = json!({ "courses": catalog.courses });
    let rendered = serde_json::to_string_pretty(&data).unwrap_or_else(|_| "{}".to_string());
    format!("\n{COUNSELOR_PREAMBLE}\n\n{rendered}\n\n{HOUSE_RULES}\n")
}

/// The user-turn text sent to the model for a new question.
pub fn render_prompt(context: &str, user_message: &str) -> String {
    format!("Context: {context}\n\nUser: {user_message}\n\nResponse:")
}

/// The reply shown to the visitor when the model call fails.
pub fn apology(error: &str) -> String {
    format!(
        "I apologize, but I encountered an error. Please try asking your question again. Error: {error}"
    )
}

/// What the visitor gets back for one question.
#[derive(Debug, Clone)]
pub struct ChatReply {
    pub text: String,
    /// `false` when `text` is the apology for a failed model call.
    pub answered: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Clone)]
pub struct ChatService {
    db: Arc<dyn DatabaseService>,
    model: Arc<dyn ChatModelService>,
    clock: Arc<dyn Clock>,
}

impl ChatService {
    pub fn new(
        db: Arc<dyn DatabaseService>,
        model: Arc<dyn ChatModelService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { db, model, clock }
    }

    /// Asks the model and appends the exchange to the chat log.
    ///
    /// Model failures are turned into an apology and nothing is logged.
    /// A failed chat-log write does not hide a good answer from the visitor.
    pub async fn ask(&self, user_id: Uuid, message: &str, history: &[ChatTurn]) -> ChatReply {
        let catalog = match self.db.get_course_catalog().await {
            Ok(catalog) => catalog.unwrap_or_default(),
            Err(e) => {
                warn!("Could not load the course catalog for chat context: {}", e);
                CourseCatalog::default()
            }
        };
        let prompt = render_prompt(&build_context(&catalog), message);

        match self.model.complete(history, &prompt).await {
            Ok(text) => {
                let timestamp = self.clock.now();
                let record = ChatRecord::new(user_id, message, &text, timestamp);
                if let Err(e) = self.db.save_chat_record(record).await {
                    error!("Failed to save chat record for visitor {}: {:?}", user_id, e);
                }
                ChatReply {
                    text,
                    answered: true,
                    timestamp,
                }
            }
            Err(e) => {
                warn!("Chat model call failed for visitor {}: {}", user_id, e);
                ChatReply {
                    text: apology(&e.to_string()),
                    answered: false,
                    timestamp: self.clock.now(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::default_catalog;

    #[test]
    fn context_embeds_catalog_under_courses_key() {
        let context = build_context(&default_catalog());
        assert!(context.contains("admission counselor"));
        assert!(context.contains("\"courses\""));
        assert!(context.contains("60,000 INR per semester"));
        assert!(context.contains("Stay focused on academic"));
    }

    #[test]
    fn prompt_wraps_context_and_question() {
        let prompt = render_prompt("CTX", "What is the fee for BCA?");
        assert_eq!(prompt, "Context: CTX\n\nUser: What is the fee for BCA?\n\nResponse:");
    }

    #[test]
    fn apology_carries_the_error_text() {
        let text = apology("quota exceeded");
        assert!(text.starts_with("I apologize"));
        assert!(text.ends_with("Error: quota exceeded"));
    }
}
