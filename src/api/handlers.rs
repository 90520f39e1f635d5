//! HTTP handlers for the todo API.
//!
//! Each handler validates its input, issues at most one repository call and
//! shapes the response. Validation and not-found outcomes are returned
//! directly; store failures are logged and mapped to an opaque 500.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};

use super::dto::{
    CreateTodoRequest, MessageResponse, TodoResponse, UpdateTodoRequest, validate_create_request,
    validate_update_request,
};
use super::error::{ApiErrorResponse, ValidationError};
use crate::domain::TodoId;
use crate::infrastructure::TodoRepository;

/// Body of `GET /`.
pub const LIVENESS_MESSAGE: &str = "Hello from the todo service!";

// =============================================================================
// Application State
// =============================================================================

/// Shared application dependencies.
///
/// The repository (and the pool behind it) is created once at startup and
/// shared by every request; handlers never open connections themselves.
#[derive(Clone)]
pub struct AppState {
    /// Todo repository for persistence.
    pub todo_repository: Arc<dyn TodoRepository>,
}

impl AppState {
    /// Creates a new `AppState` around an initialized repository.
    #[must_use]
    pub fn new(todo_repository: Arc<dyn TodoRepository>) -> Self {
        Self { todo_repository }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("AppState")
            .field("todo_repository", &"Arc<dyn TodoRepository>")
            .finish()
    }
}

/// Parses a path id. A non-integer id cannot match any row.
fn parse_todo_id(raw: &str) -> Result<TodoId, ApiErrorResponse> {
    raw.parse().map_err(|_| ApiErrorResponse::todo_not_found())
}

// =============================================================================
// GET / and GET /health Handlers
// =============================================================================

/// Liveness marker. Never touches the store.
pub async fn root() -> &'static str {
    LIVENESS_MESSAGE
}

/// Health check response body.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
}

/// Health check endpoint.
///
/// Returns a static JSON document without touching the store.
///
/// ```json
/// { "status": "healthy", "version": "0.1.0" }
/// ```
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// =============================================================================
// GET /todos Handler
// =============================================================================

/// Lists every todo, newest first.
///
/// # Errors
///
/// Returns 500 if the store fails.
pub async fn list_todos(
    State(state): State<AppState>,
) -> Result<Json<Vec<TodoResponse>>, ApiErrorResponse> {
    let todos = state
        .todo_repository
        .list()
        .await
        .map_err(|error| ApiErrorResponse::store_failure("list", &error))?;

    Ok(Json(todos.into_iter().map(TodoResponse::from).collect()))
}

// =============================================================================
// POST /todos Handler
// =============================================================================

/// Creates a todo.
///
/// # Request Body
///
/// ```json
/// { "text": "Buy milk" }
/// ```
///
/// # Errors
///
/// - 400 if `text` is missing, empty, too long, or the body is not valid JSON.
///   The store is never touched in that case.
/// - 500 if the store fails.
pub async fn create_todo(
    State(state): State<AppState>,
    payload: Result<Json<CreateTodoRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TodoResponse>), ApiErrorResponse> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::debug!(%rejection, "create body rejected");
            return Err(ValidationError::text_required().into());
        }
    };
    let new_todo = validate_create_request(&request)?;

    let todo = state
        .todo_repository
        .create(new_todo)
        .await
        .map_err(|error| ApiErrorResponse::store_failure("create", &error))?;

    Ok((StatusCode::CREATED, Json(TodoResponse::from(todo))))
}

// =============================================================================
// PUT /todos/{id} Handler
// =============================================================================

/// Merges the fields present in the body into an existing todo.
///
/// # Request Body
///
/// ```json
/// { "text": "optional", "completed": true }
/// ```
///
/// A request without a JSON body changes nothing and returns the row as is.
///
/// # Errors
///
/// - 400 if a JSON body is malformed or `text` is too long.
/// - 404 if no todo has the id.
/// - 500 if the store fails.
pub async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateTodoRequest>, JsonRejection>,
) -> Result<Json<TodoResponse>, ApiErrorResponse> {
    let id = parse_todo_id(&id)?;
    let request = match payload {
        Ok(Json(request)) => request,
        // No JSON body at all is an empty patch.
        Err(JsonRejection::MissingJsonContentType(_)) => UpdateTodoRequest::default(),
        Err(rejection) => {
            tracing::debug!(%rejection, "update body rejected");
            return Err(ValidationError::new("Invalid request body").into());
        }
    };
    let patch = validate_update_request(request)?;

    state
        .todo_repository
        .update(id, patch)
        .await
        .map_err(|error| ApiErrorResponse::store_failure("update", &error))?
        .map(|todo| Json(TodoResponse::from(todo)))
        .ok_or_else(ApiErrorResponse::todo_not_found)
}

// =============================================================================
// DELETE /todos/{id} Handler
// =============================================================================

/// Hard-deletes a todo.
///
/// # Errors
///
/// - 404 if no todo has the id.
/// - 500 if the store fails.
pub async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiErrorResponse> {
    let id = parse_todo_id(&id)?;

    let deleted = state
        .todo_repository
        .delete(id)
        .await
        .map_err(|error| ApiErrorResponse::store_failure("delete", &error))?;

    if deleted {
        Ok(Json(MessageResponse::todo_deleted()))
    } else {
        Err(ApiErrorResponse::todo_not_found())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1", true)]
    #[case("42", true)]
    #[case("abc", false)]
    #[case("1; DROP TABLE todos", false)]
    fn test_parse_todo_id(#[case] raw: &str, #[case] valid: bool) {
        let result = parse_todo_id(raw);
        assert_eq!(result.is_ok(), valid);
        if let Err(error) = result {
            assert_eq!(error.status, StatusCode::NOT_FOUND);
        }
    }

    #[rstest]
    #[tokio::test]
    async fn test_root_is_static_text() {
        assert_eq!(root().await, "Hello from the todo service!");
    }

    #[rstest]
    #[tokio::test]
    async fn test_health_check() {
        let Json(response) = health_check().await;
        assert_eq!(response.status, "healthy");
        assert_eq!(response.version, env!("CARGO_PKG_VERSION"));
    }
}
