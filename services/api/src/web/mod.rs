pub mod admin;
pub mod auth;
pub mod conversation;
pub mod cookies;
pub mod middleware;
pub mod rest;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

pub use middleware::require_admin;
pub use rest::{chat_handler, end_chat_handler, visit_handler};

use state::AppState;

/// Builds the API router: public chat and login routes plus the admin routes
/// guarded by `require_admin`.
pub fn router(app_state: Arc<AppState>) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/visit", post(visit_handler))
        .route("/chat", post(chat_handler).delete(end_chat_handler))
        .route("/admin/login", post(auth::login_handler))
        .route("/admin/logout", post(auth::logout_handler));

    // Protected routes (admin session required)
    let admin_routes = Router::new()
        .route("/admin/session", get(admin::session_handler))
        .route("/admin/analytics", get(admin::analytics_handler))
        .route("/admin/chats", get(admin::list_chats_handler))
        .route(
            "/admin/courses",
            get(admin::get_courses_handler).put(admin::update_courses_handler),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_admin,
        ));

    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .with_state(app_state)
}
