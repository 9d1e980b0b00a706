#![allow(dead_code)]

use api_lib::adapters::MemoryDbAdapter;
use api_lib::config::Config;
use api_lib::web::state::AppState;
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use course_assistant_core::domain::{
    AdminCredentials, ChatOverview, ChatRecord, ChatTurn, CourseCatalog, Visitor, VisitorOverview,
};
use course_assistant_core::ports::{
    ChatModelService, Clock, DatabaseService, PortError, PortResult,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap()
}

/// A clock the test moves by hand.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(start),
        })
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().expect("clock lock");
        *now = *now + by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock lock")
    }
}

/// A chat model that answers from a script and records what it was sent.
#[derive(Default)]
pub struct ScriptedModel {
    pub fail_with: Option<String>,
    pub calls: Mutex<Vec<(Vec<ChatTurn>, String)>>,
}

impl ScriptedModel {
    pub fn answering() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            fail_with: Some(message.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<(Vec<ChatTurn>, String)> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait]
impl ChatModelService for ScriptedModel {
    async fn complete(&self, history: &[ChatTurn], prompt: &str) -> PortResult<String> {
        self.calls
            .lock()
            .expect("calls lock")
            .push((history.to_vec(), prompt.to_string()));
        match &self.fail_with {
            Some(message) => Err(PortError::Unexpected(message.clone())),
            None => Ok(format!("answer #{}", history.len() + 1)),
        }
    }
}

/// A store whose every call fails, for the fail-closed paths.
pub struct FailingStore;

fn down<T>() -> PortResult<T> {
    Err(PortError::Unexpected("connection refused".to_string()))
}

#[async_trait]
impl DatabaseService for FailingStore {
    async fn count_admins(&self) -> PortResult<i64> {
        down()
    }
    async fn create_admin(&self, _: &str, _: &str) -> PortResult<()> {
        down()
    }
    async fn get_admin_by_username(&self, _: &str) -> PortResult<AdminCredentials> {
        down()
    }
    async fn store_admin_session(&self, _: &str, _: &str, _: DateTime<Utc>) -> PortResult<()> {
        down()
    }
    async fn refresh_admin_session(
        &self,
        _: &str,
        _: DateTime<Utc>,
        _: DateTime<Utc>,
    ) -> PortResult<Option<String>> {
        down()
    }
    async fn clear_admin_session(&self, _: &str) -> PortResult<bool> {
        down()
    }
    async fn record_visit(&self, _: Uuid, _: DateTime<Utc>) -> PortResult<Visitor> {
        down()
    }
    async fn get_visitor(&self, _: Uuid) -> PortResult<Visitor> {
        down()
    }
    async fn visitor_overview(&self) -> PortResult<VisitorOverview> {
        down()
    }
    async fn save_chat_record(&self, _: ChatRecord) -> PortResult<()> {
        down()
    }
    async fn recent_chat_records(&self, _: Option<i64>) -> PortResult<Vec<ChatRecord>> {
        down()
    }
    async fn chat_overview(&self, _: DateTime<Utc>) -> PortResult<ChatOverview> {
        down()
    }
    async fn get_course_catalog(&self) -> PortResult<Option<CourseCatalog>> {
        down()
    }
    async fn replace_course_catalog(&self, _: &CourseCatalog) -> PortResult<()> {
        down()
    }
}

pub fn test_config() -> Config {
    let vars: HashMap<&str, &str> = [
        ("DATABASE_URL", "memory://"),
        ("GOOGLE_API_KEY", "test-key"),
        ("COOKIE_SECURE", "false"),
        ("CHAT_HISTORY_TURNS", "3"),
    ]
    .into_iter()
    .collect();
    Config::from_lookup(|name| vars.get(name).map(|v| v.to_string())).expect("test config")
}

pub struct Harness {
    pub state: Arc<AppState>,
    pub db: Arc<MemoryDbAdapter>,
    pub clock: Arc<ManualClock>,
    pub model: Arc<ScriptedModel>,
}

/// App state over a fresh in-memory store with the default admin seeded.
pub async fn harness_with_model(model: Arc<ScriptedModel>) -> Harness {
    let db = Arc::new(MemoryDbAdapter::new());
    let clock = ManualClock::new(t0());
    let state = Arc::new(AppState::new(
        Arc::new(test_config()),
        db.clone(),
        model.clone(),
        clock.clone(),
    ));
    state
        .auth
        .ensure_default_admin()
        .await
        .expect("seed admin");
    Harness {
        state,
        db,
        clock,
        model,
    }
}

pub async fn harness() -> Harness {
    harness_with_model(ScriptedModel::answering()).await
}
