mod common;

use common::{harness, harness_with_model, ScriptedModel};
use course_assistant_core::catalog::ensure_default_catalog;
use course_assistant_core::ports::DatabaseService;
use uuid::Uuid;

#[tokio::test]
async fn answered_question_is_logged_with_catalog_context() {
    let h = harness().await;
    ensure_default_catalog(&*h.db).await.expect("seed");
    let visitor = Uuid::new_v4();

    let reply = h.state.chat.ask(visitor, "What is the fee for BCA?", &[]).await;
    assert!(reply.answered);
    assert_eq!(reply.text, "answer #1");

    let calls = h.model.calls();
    assert_eq!(calls.len(), 1);
    let prompt = &calls[0].1;
    assert!(prompt.starts_with("Context: "));
    assert!(prompt.contains("50,000 INR per semester"));
    assert!(prompt.ends_with("User: What is the fee for BCA?\n\nResponse:"));

    let log = h.db.recent_chat_records(None).await.expect("log");
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].user_id, visitor);
    assert_eq!(log[0].user_message, "What is the fee for BCA?");
    assert_eq!(log[0].bot_response, "answer #1");
    assert_eq!(log[0].timestamp, reply.timestamp);
}

#[tokio::test]
async fn model_failure_becomes_apology_and_is_not_logged() {
    let h = harness_with_model(ScriptedModel::failing("quota exceeded")).await;

    let reply = h.state.chat.ask(Uuid::new_v4(), "Hi!", &[]).await;
    assert!(!reply.answered);
    assert!(reply.text.starts_with("I apologize, but I encountered an error."));
    assert!(reply.text.contains("quota exceeded"));

    assert!(h.db.recent_chat_records(None).await.expect("log").is_empty());
}

#[tokio::test]
async fn empty_catalog_still_produces_a_prompt() {
    let h = harness().await;
    let reply = h.state.chat.ask(Uuid::new_v4(), "Hello", &[]).await;
    assert!(reply.answered);
    assert!(h.model.calls()[0].1.contains("\"courses\": {}"));
}
