//! services/api/src/adapters/memory.rs
//!
//! An in-process implementation of the `DatabaseService` port. Selected with
//! `DATABASE_URL=memory://` for local runs without PostgreSQL. Every operation
//! holds the lock for its whole read-modify-write, matching the single-statement
//! atomicity of the SQL adapter.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use course_assistant_core::domain::{
    AdminCredentials, ChatOverview, ChatRecord, CourseCatalog, Visitor, VisitorOverview,
};
use course_assistant_core::ports::{DatabaseService, PortError, PortResult};
use std::collections::{HashMap, HashSet};
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Default)]
struct MemoryState {
    admins: Vec<AdminCredentials>,
    users: HashMap<Uuid, Visitor>,
    chat_history: Vec<ChatRecord>,
    course_data: Option<CourseCatalog>,
}

#[derive(Default)]
pub struct MemoryDbAdapter {
    state: Mutex<MemoryState>,
}

impl MemoryDbAdapter {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DatabaseService for MemoryDbAdapter {
    async fn count_admins(&self) -> PortResult<i64> {
        Ok(self.state.lock().await.admins.len() as i64)
    }

    async fn create_admin(&self, username: &str, password_hash: &str) -> PortResult<()> {
        let mut state = self.state.lock().await;
        if state.admins.iter().any(|a| a.username == username) {
            return Ok(());
        }
        state.admins.push(AdminCredentials {
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            session_token: None,
            last_login: None,
        });
        Ok(())
    }

    async fn get_admin_by_username(&self, username: &str) -> PortResult<AdminCredentials> {
        self.state
            .lock()
            .await
            .admins
            .iter()
            .find(|a| a.username == username)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Admin {} not found", username)))
    }

    async fn store_admin_session(
        &self,
        username: &str,
        token: &str,
        logged_in_at: DateTime<Utc>,
    ) -> PortResult<()> {
        let mut state = self.state.lock().await;
        let admin = state
            .admins
            .iter_mut()
            .find(|a| a.username == username)
            .ok_or_else(|| PortError::NotFound(format!("Admin {} not found", username)))?;
        admin.session_token = Some(token.to_string());
        admin.last_login = Some(logged_in_at);
        Ok(())
    }

    async fn refresh_admin_session(
        &self,
        token: &str,
        not_before: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> PortResult<Option<String>> {
        let mut state = self.state.lock().await;
        let live = state.admins.iter_mut().find(|a| {
            a.session_token.as_deref() == Some(token)
                && a.last_login.is_some_and(|at| at >= not_before)
        });
        Ok(live.map(|admin| {
            admin.last_login = Some(now);
            admin.username.clone()
        }))
    }

    async fn clear_admin_session(&self, token: &str) -> PortResult<bool> {
        let mut state = self.state.lock().await;
        let mut cleared = false;
        for admin in state
            .admins
            .iter_mut()
            .filter(|a| a.session_token.as_deref() == Some(token))
        {
            admin.session_token = None;
            cleared = true;
        }
        Ok(cleared)
    }

    async fn record_visit(&self, user_id: Uuid, seen_at: DateTime<Utc>) -> PortResult<Visitor> {
        let mut state = self.state.lock().await;
        let visitor = state
            .users
            .entry(user_id)
            .and_modify(|v| {
                v.access_count += 1;
                v.last_active = v.last_active.max(seen_at);
            })
            .or_insert_with(|| Visitor {
                user_id,
                created_at: seen_at,
                last_active: seen_at,
                access_count: 1,
            });
        Ok(visitor.clone())
    }

    async fn get_visitor(&self, user_id: Uuid) -> PortResult<Visitor> {
        self.state
            .lock()
            .await
            .users
            .get(&user_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Visitor {} not found", user_id)))
    }

    async fn visitor_overview(&self) -> PortResult<VisitorOverview> {
        let state = self.state.lock().await;
        Ok(VisitorOverview {
            total_visitors: state.users.len() as i64,
            total_visits: state.users.values().map(|v| v.access_count as i64).sum(),
        })
    }

    async fn save_chat_record(&self, record: ChatRecord) -> PortResult<()> {
        self.state.lock().await.chat_history.push(record);
        Ok(())
    }

    async fn recent_chat_records(&self, limit: Option<i64>) -> PortResult<Vec<ChatRecord>> {
        let state = self.state.lock().await;
        // Reversed first so records sharing a timestamp stay newest first
        // through the stable sort.
        let mut records: Vec<ChatRecord> = state.chat_history.iter().rev().cloned().collect();
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        if let Some(limit) = limit {
            records.truncate(limit.max(0) as usize);
        }
        Ok(records)
    }

    async fn chat_overview(&self, day_start: DateTime<Utc>) -> PortResult<ChatOverview> {
        let state = self.state.lock().await;
        let days: HashSet<_> = state
            .chat_history
            .iter()
            .map(|r| r.timestamp.date_naive())
            .collect();
        Ok(ChatOverview {
            total_chats: state.chat_history.len() as i64,
            unique_days: days.len() as i64,
            todays_chats: state
                .chat_history
                .iter()
                .filter(|r| r.timestamp >= day_start)
                .count() as i64,
        })
    }

    async fn get_course_catalog(&self) -> PortResult<Option<CourseCatalog>> {
        Ok(self.state.lock().await.course_data.clone())
    }

    async fn replace_course_catalog(&self, catalog: &CourseCatalog) -> PortResult<()> {
        self.state.lock().await.course_data = Some(catalog.clone());
        Ok(())
    }
}
