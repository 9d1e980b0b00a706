//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the public chat endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::{
    admin,
    auth,
    cookies::{build_cookie, read_cookie, VISITOR_COOKIE, VISITOR_COOKIE_MAX_AGE_SECS},
    state::AppState,
};
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{AppendHeaders, IntoResponse, Json},
};
use chrono::{DateTime, Utc};
use course_assistant_core::domain::{ChatTurn, Visitor};
use course_assistant_core::ports::PortError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        visit_handler,
        chat_handler,
        end_chat_handler,
        auth::login_handler,
        auth::logout_handler,
        admin::session_handler,
        admin::analytics_handler,
        admin::list_chats_handler,
        admin::get_courses_handler,
        admin::update_courses_handler,
    ),
    components(
        schemas(
            VisitResponse,
            ChatRequest,
            ChatResponse,
            auth::LoginRequest,
            auth::LoginResponse,
            admin::SessionResponse,
            admin::ChatRecordView,
            admin::AnalyticsResponse,
            admin::CourseUpdateResponse,
        )
    ),
    tags(
        (name = "Course Assistant API", description = "Chat widget and admin endpoints for the university course assistant.")
    )
)]
pub struct ApiDoc;

/// The OpenAPI document as indented JSON.
pub fn openapi_json() -> Result<String, serde_json::Error> {
    ApiDoc::openapi().to_pretty_json()
}

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// The visitor record after registering a visit.
#[derive(Serialize, Deserialize, ToSchema)]
pub struct VisitResponse {
    pub visitor_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
    pub access_count: i32,
}

impl From<Visitor> for VisitResponse {
    fn from(v: Visitor) -> Self {
        Self {
            visitor_id: v.user_id,
            created_at: v.created_at,
            last_active: v.last_active,
            access_count: v.access_count,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ChatResponse {
    pub visitor_id: Uuid,
    pub reply: String,
    /// `false` when the reply is an apology for a failed model call.
    pub answered: bool,
    pub timestamp: DateTime<Utc>,
}

//=========================================================================================
// Visitor Helpers
//=========================================================================================

fn visitor_from_cookie(headers: &HeaderMap) -> Option<Uuid> {
    read_cookie(headers, VISITOR_COOKIE).and_then(|raw| Uuid::parse_str(raw).ok())
}

fn visitor_cookie(state: &AppState, visitor_id: Uuid) -> String {
    build_cookie(
        VISITOR_COOKIE,
        &visitor_id.to_string(),
        VISITOR_COOKIE_MAX_AGE_SECS,
        state.config.cookie_secure,
    )
}

async fn record_visit(
    state: &AppState,
    visitor_id: Uuid,
) -> Result<Visitor, (StatusCode, String)> {
    state
        .db
        .record_visit(visitor_id, state.clock.now())
        .await
        .map_err(|e| {
            error!("Failed to record visit for {}: {:?}", visitor_id, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to record visit".to_string())
        })
}

/// Registers a cookie-borne id the registry has never seen, e.g. one issued
/// before an in-memory store restarted.
async fn ensure_registered(
    state: &AppState,
    visitor_id: Uuid,
) -> Result<(), (StatusCode, String)> {
    match state.db.get_visitor(visitor_id).await {
        Ok(_) => Ok(()),
        Err(PortError::NotFound(_)) => {
            info!("Registering unknown visitor {} from cookie", visitor_id);
            record_visit(state, visitor_id).await.map(|_| ())
        }
        Err(e) => {
            error!("Failed to look up visitor {}: {:?}", visitor_id, e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, "Failed to look up visitor".to_string()))
        }
    }
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Register a page visit for the anonymous visitor.
///
/// Issues a `visitor_id` cookie when the request carries none.
#[utoipa::path(
    post,
    path = "/visit",
    responses(
        (status = 200, description = "Visit recorded", body = VisitResponse),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn visit_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let (visitor_id, set_cookie) = match visitor_from_cookie(&headers) {
        Some(id) => (id, None),
        None => {
            let id = Uuid::new_v4();
            info!("New visitor {}", id);
            (id, Some(visitor_cookie(&state, id)))
        }
    };

    let visitor = record_visit(&state, visitor_id).await?;

    Ok((
        StatusCode::OK,
        AppendHeaders(set_cookie.map(|c| (header::SET_COOKIE, c))),
        Json(VisitResponse::from(visitor)),
    ))
}

/// Ask the course assistant a question.
///
/// Model failures are reported inside a 200 response as an apology.
#[utoipa::path(
    post,
    path = "/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Assistant reply", body = ChatResponse),
        (status = 400, description = "Empty message"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn chat_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<ChatRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let message = req.message.trim();
    if message.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Message must not be empty".to_string()));
    }

    // First contact without a cookie counts as a visit.
    let (visitor_id, set_cookie) = match visitor_from_cookie(&headers) {
        Some(id) => {
            ensure_registered(&state, id).await?;
            (id, None)
        }
        None => {
            let id = Uuid::new_v4();
            record_visit(&state, id).await?;
            (id, Some(visitor_cookie(&state, id)))
        }
    };

    let history = state
        .conversations
        .history(visitor_id, state.clock.now())
        .await;
    let reply = state.chat.ask(visitor_id, message, &history).await;

    if reply.answered {
        let turn = ChatTurn {
            user_message: message.to_string(),
            bot_response: reply.text.clone(),
        };
        state
            .conversations
            .push(visitor_id, turn, reply.timestamp)
            .await;
    }

    let response = ChatResponse {
        visitor_id,
        reply: reply.text,
        answered: reply.answered,
        timestamp: reply.timestamp,
    };

    Ok((
        StatusCode::OK,
        AppendHeaders(set_cookie.map(|c| (header::SET_COOKIE, c))),
        Json(response),
    ))
}

/// Forget the visitor's conversation history.
#[utoipa::path(
    delete,
    path = "/chat",
    responses(
        (status = 204, description = "Conversation cleared")
    )
)]
pub async fn end_chat_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> StatusCode {
    if let Some(visitor_id) = visitor_from_cookie(&headers) {
        state.conversations.end(visitor_id).await;
    }
    StatusCode::NO_CONTENT
}
