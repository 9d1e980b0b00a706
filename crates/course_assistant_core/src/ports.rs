//! crates/course_assistant_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use crate::domain::{
    AdminCredentials, ChatOverview, ChatRecord, ChatTurn, CourseCatalog, Visitor, VisitorOverview,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- Admin Management ---
    async fn count_admins(&self) -> PortResult<i64>;

    /// Inserts an admin unless one with the same username exists.
    async fn create_admin(&self, username: &str, password_hash: &str) -> PortResult<()>;

    async fn get_admin_by_username(&self, username: &str) -> PortResult<AdminCredentials>;

    /// Overwrites the admin's single session slot and stamps `last_login`.
    async fn store_admin_session(
        &self,
        username: &str,
        token: &str,
        logged_in_at: DateTime<Utc>,
    ) -> PortResult<()>;

    /// Finds the admin holding `token` with `last_login >= not_before` and
    /// moves `last_login` to `now` in the same step. Returns the username.
    async fn refresh_admin_session(
        &self,
        token: &str,
        not_before: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> PortResult<Option<String>>;

    /// Empties the session slot holding `token`. Returns whether one was cleared.
    async fn clear_admin_session(&self, token: &str) -> PortResult<bool>;

    // --- Visitor Registry ---
    async fn record_visit(&self, user_id: Uuid, seen_at: DateTime<Utc>) -> PortResult<Visitor>;

    async fn get_visitor(&self, user_id: Uuid) -> PortResult<Visitor>;

    async fn visitor_overview(&self) -> PortResult<VisitorOverview>;

    // --- Chat Log ---
    async fn save_chat_record(&self, record: ChatRecord) -> PortResult<()>;

    /// Newest first. `None` returns the whole log.
    async fn recent_chat_records(&self, limit: Option<i64>) -> PortResult<Vec<ChatRecord>>;

    /// Totals, distinct UTC days, and records at or after `day_start`.
    async fn chat_overview(&self, day_start: DateTime<Utc>) -> PortResult<ChatOverview>;

    // --- Course Catalog ---
    async fn get_course_catalog(&self) -> PortResult<Option<CourseCatalog>>;

    async fn replace_course_catalog(&self, catalog: &CourseCatalog) -> PortResult<()>;
}

#[async_trait]
pub trait ChatModelService: Send + Sync {
    /// Sends the prior turns and the new prompt, returning the model's reply text.
    async fn complete(&self, history: &[ChatTurn], prompt: &str) -> PortResult<String>;
}

/// Source of the current time, injected so session expiry can be tested.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
