//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting admin routes.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use course_assistant_core::SessionStatus;
use std::sync::Arc;

use crate::web::cookies::admin_token;
use crate::web::state::AppState;

/// The admin whose session authorised the current request.
#[derive(Debug, Clone)]
pub struct AdminIdentity {
    pub username: String,
}

/// Middleware that validates the admin session token and slides its expiry.
///
/// If valid, inserts an `AdminIdentity` into request extensions for handlers to use.
/// If invalid, expired, missing, or the store is unreachable, returns 401 Unauthorized.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = admin_token(req.headers()).map(str::to_owned);

    match state.auth.validate_session(token.as_deref()).await {
        SessionStatus::Valid { username } => {
            req.extensions_mut().insert(AdminIdentity { username });
            Ok(next.run(req).await)
        }
        SessionStatus::Invalid => Err(StatusCode::UNAUTHORIZED),
    }
}
