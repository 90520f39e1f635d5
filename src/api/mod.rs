//! API module for HTTP handlers.
//!
//! This module contains route definitions and request/response handlers.

pub mod dto;
pub mod error;
pub mod handlers;

use axum::Router;
use axum::routing::{get, put};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use dto::{CreateTodoRequest, MessageResponse, TodoResponse, UpdateTodoRequest};
pub use error::{ApiError, ApiErrorResponse, ValidationError};
pub use handlers::{
    AppState, HealthResponse, create_todo, delete_todo, health_check, list_todos, root,
    update_todo,
};

/// Builds the application router with tracing and permissive CORS.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/{id}", put(update_todo).delete(delete_todo))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
