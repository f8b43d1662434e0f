//! API 模块
//!
//! 提供 REST API 支持。

pub mod app_state;
pub mod dto;
pub mod handlers;

use axum::{
    Router,
    routing::{delete, get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::api::app_state::AppState;
use crate::security::auth_middleware;

pub fn create_router(app_state: AppState) -> Router {
    let api = Router::new()
        .route("/chat", post(handlers::chat))
        .route("/sessions", post(handlers::start_session))
        .route("/sessions/current", delete(handlers::end_session))
        .route("/curriculum", post(handlers::add_curriculum))
        .route("/suggestions", get(handlers::suggestions))
        .route("/status", get(handlers::status));

    Router::new()
        .nest("/api/v1", api)
        .layer(axum::middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
