//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for admin login and logout.

use crate::web::cookies::{admin_token, build_cookie, ADMIN_SESSION_COOKIE};
use crate::web::state::AppState;
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Duration;
use course_assistant_core::auth::SESSION_TTL_HOURS;
use course_assistant_core::AuthError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub username: String,
    pub token: String,
    pub expires_in_secs: i64,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /admin/login - Exchange admin credentials for a session token
#[utoipa::path(
    post,
    path = "/admin/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let session = state
        .auth
        .authenticate(&req.username, &req.password)
        .await
        .map_err(|e| match e {
            AuthError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string())
            }
            other => {
                error!("Admin login failed: {:?}", other);
                (StatusCode::INTERNAL_SERVER_ERROR, "Authentication error".to_string())
            }
        })?;

    let max_age = Duration::hours(SESSION_TTL_HOURS).num_seconds();
    let cookie = build_cookie(
        ADMIN_SESSION_COOKIE,
        &session.token,
        max_age,
        state.config.cookie_secure,
    );

    let response = LoginResponse {
        username: session.username,
        token: session.token,
        expires_in_secs: max_age,
    };

    Ok((StatusCode::OK, [(header::SET_COOKIE, cookie)], Json(response)))
}

/// POST /admin/logout - End the admin session and clear the cookie
#[utoipa::path(
    post,
    path = "/admin/logout",
    responses(
        (status = 200, description = "Logout successful"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if let Some(token) = admin_token(&headers) {
        state.auth.logout(token).await.map_err(|e| {
            error!("Failed to close admin session: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to logout".to_string())
        })?;
    }

    let cookie = build_cookie(ADMIN_SESSION_COOKIE, "", 0, state.config.cookie_secure);
    Ok((StatusCode::OK, [(header::SET_COOKIE, cookie)]))
}
