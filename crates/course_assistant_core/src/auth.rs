//! crates/course_assistant_core/src/auth.rs
//!
//! Admin session authentication.
//!
//! Each admin record has a single session slot: a bearer token plus the
//! time it was last used. Logging in overwrites the slot, so a newer login
//! silently ends any older session for the same admin. Validation slides
//! the expiry window forward on every successful check.

use crate::password::{self, PasswordError};
use crate::ports::{Clock, DatabaseService, PortError};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// How long a session survives without being validated.
pub const SESSION_TTL_HOURS: i64 = 24;

pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Password hashing failed: {0}")]
    Hashing(#[from] PasswordError),
    #[error("Admin store unavailable: {0}")]
    Storage(PortError),
}

/// Outcome of checking a bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    Valid { username: String },
    Invalid,
}

impl SessionStatus {
    pub fn is_valid(&self) -> bool {
        matches!(self, SessionStatus::Valid { .. })
    }
}

/// A freshly issued admin session.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub username: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Earliest `last_login` that still counts as a live session at `now`.
pub fn session_cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::hours(SESSION_TTL_HOURS)
}

fn generate_token() -> String {
    Uuid::new_v4().simple().to_string()
}

#[derive(Clone)]
pub struct AdminAuthenticator {
    db: Arc<dyn DatabaseService>,
    clock: Arc<dyn Clock>,
}

impl AdminAuthenticator {
    pub fn new(db: Arc<dyn DatabaseService>, clock: Arc<dyn Clock>) -> Self {
        Self { db, clock }
    }

    /// Seeds the default admin when the admin store is empty.
    /// Returns `true` if an admin was created.
    pub async fn ensure_default_admin(&self) -> Result<bool, AuthError> {
        let existing = self.db.count_admins().await.map_err(AuthError::Storage)?;
        if existing > 0 {
            return Ok(false);
        }
        let password_hash = password::hash_password(DEFAULT_ADMIN_PASSWORD)?;
        self.db
            .create_admin(DEFAULT_ADMIN_USERNAME, &password_hash)
            .await
            .map_err(AuthError::Storage)?;
        info!("Provisioned default admin account '{}'", DEFAULT_ADMIN_USERNAME);
        Ok(true)
    }

    /// Checks the credentials and, on success, replaces the admin's session
    /// slot with a new token.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<IssuedSession, AuthError> {
        let admin = match self.db.get_admin_by_username(username).await {
            Ok(admin) => admin,
            Err(PortError::NotFound(_)) => {
                warn!("Login rejected for unknown admin '{}'", username);
                return Err(AuthError::InvalidCredentials);
            }
            Err(e) => return Err(AuthError::Storage(e)),
        };

        if !password::verify_password(password, &admin.password_hash)? {
            warn!("Login rejected for admin '{}': wrong password", username);
            return Err(AuthError::InvalidCredentials);
        }

        let token = generate_token();
        let now = self.clock.now();
        self.db
            .store_admin_session(&admin.username, &token, now)
            .await
            .map_err(AuthError::Storage)?;

        info!("Admin '{}' logged in", admin.username);
        Ok(IssuedSession {
            username: admin.username,
            token,
            expires_at: now + Duration::hours(SESSION_TTL_HOURS),
        })
    }

    /// Checks a bearer token and slides its expiry window forward.
    ///
    /// Never fails open: an empty token, an unknown or expired token, and a
    /// store error all come back as `Invalid`.
    pub async fn validate_session(&self, token: Option<&str>) -> SessionStatus {
        let token = match token.map(str::trim) {
            Some(t) if !t.is_empty() => t,
            _ => return SessionStatus::Invalid,
        };

        let now = self.clock.now();
        match self
            .db
            .refresh_admin_session(token, session_cutoff(now), now)
            .await
        {
            Ok(Some(username)) => SessionStatus::Valid { username },
            Ok(None) => SessionStatus::Invalid,
            Err(e) => {
                warn!("Session check failed against the admin store: {}", e);
                SessionStatus::Invalid
            }
        }
    }

    /// Empties the session slot holding `token`, if any.
    pub async fn logout(&self, token: &str) -> Result<(), AuthError> {
        if token.trim().is_empty() {
            return Ok(());
        }
        let cleared = self
            .db
            .clear_admin_session(token.trim())
            .await
            .map_err(AuthError::Storage)?;
        if cleared {
            info!("Admin session closed");
        }
        Ok(())
    }
}
