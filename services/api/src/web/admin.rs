//! services/api/src/web/admin.rs
//!
//! Handlers behind the `require_admin` middleware: chat analytics and the
//! course catalog editor.

use crate::web::{middleware::AdminIdentity, state::AppState};
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
    Extension,
};
use chrono::{DateTime, Utc};
use course_assistant_core::{ChatRecord, CourseCatalog, DashboardAnalytics};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Serialize, Deserialize, ToSchema)]
pub struct SessionResponse {
    pub username: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ChatRecordView {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub user_id: Uuid,
    pub user_message: String,
    pub bot_response: String,
}

impl From<ChatRecord> for ChatRecordView {
    fn from(r: ChatRecord) -> Self {
        Self {
            id: r.id,
            timestamp: r.timestamp,
            user_id: r.user_id,
            user_message: r.user_message,
            bot_response: r.bot_response,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct AnalyticsResponse {
    pub total_chats: i64,
    pub unique_days: i64,
    pub todays_chats: i64,
    pub total_visitors: i64,
    pub total_visits: i64,
    pub recent_chats: Vec<ChatRecordView>,
}

#[derive(Deserialize)]
pub struct ChatListQuery {
    pub limit: Option<i64>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct CourseUpdateResponse {
    pub message: String,
    pub course_count: usize,
}

fn internal(context: &str, e: impl std::fmt::Debug) -> (StatusCode, String) {
    error!("{}: {:?}", context, e);
    (StatusCode::INTERNAL_SERVER_ERROR, context.to_string())
}

//=========================================================================================
// Handlers
//=========================================================================================

/// Report which admin owns the presented session.
#[utoipa::path(
    get,
    path = "/admin/session",
    responses(
        (status = 200, description = "Session is live", body = SessionResponse),
        (status = 401, description = "Missing, expired or superseded session")
    )
)]
pub async fn session_handler(Extension(admin): Extension<AdminIdentity>) -> Json<SessionResponse> {
    Json(SessionResponse {
        username: admin.username,
    })
}

/// Dashboard overview of chat and visitor activity.
#[utoipa::path(
    get,
    path = "/admin/analytics",
    responses(
        (status = 200, description = "Analytics overview", body = AnalyticsResponse),
        (status = 401, description = "Not authenticated"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn analytics_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<AnalyticsResponse>, (StatusCode, String)> {
    let analytics = DashboardAnalytics::gather(state.db.as_ref(), state.clock.now())
        .await
        .map_err(|e| internal("Failed to load analytics", e))?;

    Ok(Json(AnalyticsResponse {
        total_chats: analytics.total_chats,
        unique_days: analytics.unique_days,
        todays_chats: analytics.todays_chats,
        total_visitors: analytics.total_visitors,
        total_visits: analytics.total_visits,
        recent_chats: analytics.recent_chats.into_iter().map(Into::into).collect(),
    }))
}

/// The chat log, newest first.
#[utoipa::path(
    get,
    path = "/admin/chats",
    params(
        ("limit" = Option<i64>, Query, description = "Maximum number of records; all when omitted.")
    ),
    responses(
        (status = 200, description = "Chat records", body = [ChatRecordView]),
        (status = 400, description = "Negative limit"),
        (status = 401, description = "Not authenticated"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_chats_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ChatListQuery>,
) -> Result<Json<Vec<ChatRecordView>>, (StatusCode, String)> {
    if query.limit.is_some_and(|l| l < 0) {
        return Err((StatusCode::BAD_REQUEST, "limit must not be negative".to_string()));
    }
    let records = state
        .db
        .recent_chat_records(query.limit)
        .await
        .map_err(|e| internal("Failed to load chat history", e))?;
    Ok(Json(records.into_iter().map(Into::into).collect()))
}

/// The stored course catalog, indented for the editor (an empty object when
/// none is stored).
#[utoipa::path(
    get,
    path = "/admin/courses",
    responses(
        (status = 200, description = "Course catalog", body = Object),
        (status = 401, description = "Not authenticated"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_courses_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let catalog = state
        .db
        .get_course_catalog()
        .await
        .map_err(|e| internal("Failed to load course data", e))?
        .unwrap_or_default();
    Ok((
        [(header::CONTENT_TYPE, "application/json")],
        catalog.to_pretty_json(),
    ))
}

/// Replace the course catalog with the submitted JSON text.
///
/// The body must parse as a JSON object; anything else leaves the stored
/// catalog untouched.
#[utoipa::path(
    put,
    path = "/admin/courses",
    request_body(content = String, content_type = "text/plain", description = "The entire catalog as JSON text."),
    responses(
        (status = 200, description = "Catalog replaced", body = CourseUpdateResponse),
        (status = 400, description = "Invalid JSON or not a JSON object"),
        (status = 401, description = "Not authenticated"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn update_courses_handler(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AdminIdentity>,
    body: String,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let catalog = CourseCatalog::from_json_text(&body).map_err(|e| {
        warn!("Admin '{}' submitted an unusable catalog: {}", admin.username, e);
        (StatusCode::BAD_REQUEST, e.to_string())
    })?;

    state
        .db
        .replace_course_catalog(&catalog)
        .await
        .map_err(|e| internal("Failed to update course data", e))?;

    info!(
        "Admin '{}' replaced the course catalog ({} courses)",
        admin.username,
        catalog.len()
    );
    Ok(Json(CourseUpdateResponse {
        message: "Course data updated successfully!".to_string(),
        course_count: catalog.len(),
    }))
}
