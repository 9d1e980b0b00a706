//! crates/course_assistant_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database driver.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use uuid::Uuid;

// Only used internally for login - contains sensitive data
#[derive(Debug, Clone)]
pub struct AdminCredentials {
    pub username: String,
    pub password_hash: String,
    pub session_token: Option<String>,
    pub last_login: Option<DateTime<Utc>>,
}

/// Represents an anonymous visitor of the chat widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visitor {
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
    pub access_count: i32,
}

/// Represents a single question-and-answer exchange with the model.
#[derive(Debug, Clone)]
pub struct ChatRecord {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub user_id: Uuid,
    pub user_message: String,
    pub bot_response: String,
}

impl ChatRecord {
    pub fn new(
        user_id: Uuid,
        user_message: &str,
        bot_response: &str,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            user_id,
            user_message: user_message.to_string(),
            bot_response: bot_response.to_string(),
        }
    }
}

/// One turn of an in-progress conversation, kept to give the model history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub user_message: String,
    pub bot_response: String,
}

/// The attributes of one course, as seeded on first run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Course {
    pub duration: String,
    pub fees: String,
    #[serde(rename = "semesters")]
    pub semester_count: u32,
    /// Semester label to ordered subject names.
    pub subjects: BTreeMap<String, Vec<String>>,
}

/// The course catalog document: course name to attributes.
///
/// Admin edits are only checked for being a JSON object, so the catalog
/// keeps raw JSON values rather than `Course` structs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CourseCatalog {
    pub courses: Map<String, Value>,
}

/// Counts over the chat log used by the admin dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatOverview {
    pub total_chats: i64,
    pub unique_days: i64,
    pub todays_chats: i64,
}

/// Counts over the visitor registry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisitorOverview {
    pub total_visitors: i64,
    pub total_visits: i64,
}
