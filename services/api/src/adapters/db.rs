//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use course_assistant_core::domain::{
    AdminCredentials, ChatOverview, ChatRecord, CourseCatalog, Visitor, VisitorOverview,
};
use course_assistant_core::ports::{DatabaseService, PortError, PortResult};
use serde_json::Value;
use sqlx::{types::Json, FromRow, PgPool};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct AdminRecord {
    username: String,
    password_hash: String,
    session_token: Option<String>,
    last_login: Option<DateTime<Utc>>,
}
impl AdminRecord {
    fn to_domain(self) -> AdminCredentials {
        AdminCredentials {
            username: self.username,
            password_hash: self.password_hash,
            session_token: self.session_token,
            last_login: self.last_login,
        }
    }
}

#[derive(FromRow)]
struct UserRecord {
    user_id: Uuid,
    created_at: DateTime<Utc>,
    last_active: DateTime<Utc>,
    access_count: i32,
}
impl UserRecord {
    fn to_domain(self) -> Visitor {
        Visitor {
            user_id: self.user_id,
            created_at: self.created_at,
            last_active: self.last_active,
            access_count: self.access_count,
        }
    }
}

#[derive(FromRow)]
struct ChatRecordRow {
    id: Uuid,
    timestamp: DateTime<Utc>,
    user_id: Uuid,
    user_message: String,
    bot_response: String,
}
impl ChatRecordRow {
    fn to_domain(self) -> ChatRecord {
        ChatRecord {
            id: self.id,
            timestamp: self.timestamp,
            user_id: self.user_id,
            user_message: self.user_message,
            bot_response: self.bot_response,
        }
    }
}

#[derive(FromRow)]
struct ChatOverviewRow {
    total_chats: i64,
    unique_days: i64,
    todays_chats: i64,
}

#[derive(FromRow)]
struct VisitorOverviewRow {
    total_visitors: i64,
    total_visits: i64,
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn count_admins(&self) -> PortResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM admins")
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)
    }

    async fn create_admin(&self, username: &str, password_hash: &str) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO admins (username, password_hash) VALUES ($1, $2) ON CONFLICT (username) DO NOTHING",
        )
        .bind(username)
        .bind(password_hash)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn get_admin_by_username(&self, username: &str) -> PortResult<AdminCredentials> {
        let record = sqlx::query_as::<_, AdminRecord>(
            "SELECT username, password_hash, session_token, last_login FROM admins WHERE username = $1",
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::NotFound(format!("Admin {} not found", username)),
            _ => unexpected(e),
        })?;
        Ok(record.to_domain())
    }

    async fn store_admin_session(
        &self,
        username: &str,
        token: &str,
        logged_in_at: DateTime<Utc>,
    ) -> PortResult<()> {
        let result = sqlx::query(
            "UPDATE admins SET session_token = $2, last_login = $3 WHERE username = $1",
        )
        .bind(username)
        .bind(token)
        .bind(logged_in_at)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Admin {} not found", username)));
        }
        Ok(())
    }

    async fn refresh_admin_session(
        &self,
        token: &str,
        not_before: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> PortResult<Option<String>> {
        sqlx::query_scalar::<_, String>(
            "UPDATE admins SET last_login = $3 WHERE session_token = $1 AND last_login >= $2 RETURNING username",
        )
        .bind(token)
        .bind(not_before)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)
    }

    async fn clear_admin_session(&self, token: &str) -> PortResult<bool> {
        let result = sqlx::query("UPDATE admins SET session_token = NULL WHERE session_token = $1")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(result.rows_affected() > 0)
    }

    async fn record_visit(&self, user_id: Uuid, seen_at: DateTime<Utc>) -> PortResult<Visitor> {
        let record = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (user_id, created_at, last_active, access_count) VALUES ($1, $2, $2, 1) \
             ON CONFLICT (user_id) DO UPDATE SET \
                 access_count = users.access_count + 1, \
                 last_active = GREATEST(users.last_active, EXCLUDED.last_active) \
             RETURNING user_id, created_at, last_active, access_count",
        )
        .bind(user_id)
        .bind(seen_at)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn get_visitor(&self, user_id: Uuid) -> PortResult<Visitor> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT user_id, created_at, last_active, access_count FROM users WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::NotFound(format!("Visitor {} not found", user_id)),
            _ => unexpected(e),
        })?;
        Ok(record.to_domain())
    }

    async fn visitor_overview(&self) -> PortResult<VisitorOverview> {
        let row = sqlx::query_as::<_, VisitorOverviewRow>(
            "SELECT COUNT(*) AS total_visitors, COALESCE(SUM(access_count), 0)::BIGINT AS total_visits FROM users",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(VisitorOverview {
            total_visitors: row.total_visitors,
            total_visits: row.total_visits,
        })
    }

    async fn save_chat_record(&self, record: ChatRecord) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO chat_history (id, \"timestamp\", user_id, user_message, bot_response) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(record.id)
        .bind(record.timestamp)
        .bind(record.user_id)
        .bind(record.user_message)
        .bind(record.bot_response)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn recent_chat_records(&self, limit: Option<i64>) -> PortResult<Vec<ChatRecord>> {
        // LIMIT NULL means no limit in PostgreSQL.
        let records = sqlx::query_as::<_, ChatRecordRow>(
            "SELECT id, \"timestamp\", user_id, user_message, bot_response FROM chat_history \
             ORDER BY \"timestamp\" DESC, seq DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn chat_overview(&self, day_start: DateTime<Utc>) -> PortResult<ChatOverview> {
        let row = sqlx::query_as::<_, ChatOverviewRow>(
            "SELECT COUNT(*) AS total_chats, \
                    COUNT(DISTINCT (\"timestamp\" AT TIME ZONE 'UTC')::date) AS unique_days, \
                    COUNT(*) FILTER (WHERE \"timestamp\" >= $1) AS todays_chats \
             FROM chat_history",
        )
        .bind(day_start)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(ChatOverview {
            total_chats: row.total_chats,
            unique_days: row.unique_days,
            todays_chats: row.todays_chats,
        })
    }

    async fn get_course_catalog(&self) -> PortResult<Option<CourseCatalog>> {
        let stored =
            sqlx::query_scalar::<_, Json<Value>>("SELECT courses FROM course_data WHERE id = 1")
                .fetch_optional(&self.pool)
                .await
                .map_err(unexpected)?;

        match stored {
            None => Ok(None),
            Some(Json(Value::Object(courses))) => Ok(Some(CourseCatalog::new(courses))),
            Some(_) => Err(PortError::Unexpected(
                "Stored course catalog is not a JSON object".to_string(),
            )),
        }
    }

    async fn replace_course_catalog(&self, catalog: &CourseCatalog) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO course_data (id, courses, updated_at) VALUES (1, $1, now()) \
             ON CONFLICT (id) DO UPDATE SET courses = EXCLUDED.courses, updated_at = EXCLUDED.updated_at",
        )
        .bind(Json(catalog.courses.clone()))
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }
}
