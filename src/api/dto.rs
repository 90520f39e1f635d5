//! Data Transfer Objects for API requests and responses.
//!
//! This module contains DTOs that are separate from domain models,
//! providing a clean API contract, plus the input validation applied
//! before any store access.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::ValidationError;
use crate::domain::{MAX_TEXT_LENGTH, NewTodo, Todo, TodoPatch};

// =============================================================================
// Todo DTOs
// =============================================================================

/// Request DTO for `POST /todos`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateTodoRequest {
    /// Task text. Required and non-empty.
    #[serde(default)]
    pub text: Option<String>,
}

/// Request DTO for `PUT /todos/{id}`.
///
/// Absent and `null` fields both mean "leave unchanged".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTodoRequest {
    /// New text for the todo.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// New completion flag for the todo.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

/// Response DTO for a todo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoResponse {
    /// Todo id.
    pub id: i64,
    /// Task text.
    pub text: String,
    /// Completion flag.
    pub completed: bool,
    /// Creation timestamp (RFC 3339).
    pub created_at: DateTime<Utc>,
}

impl From<&Todo> for TodoResponse {
    fn from(todo: &Todo) -> Self {
        Self {
            id: todo.id.value(),
            text: todo.text.clone(),
            completed: todo.completed,
            created_at: *todo.created_at.as_datetime(),
        }
    }
}

impl From<Todo> for TodoResponse {
    fn from(todo: Todo) -> Self {
        Self {
            id: todo.id.value(),
            text: todo.text,
            completed: todo.completed,
            created_at: *todo.created_at.as_datetime(),
        }
    }
}

/// Response DTO for a successful delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Confirmation message.
    pub message: String,
}

impl MessageResponse {
    /// The confirmation returned by `DELETE /todos/{id}`.
    #[must_use]
    pub fn todo_deleted() -> Self {
        Self {
            message: "Todo deleted successfully".to_string(),
        }
    }
}

// =============================================================================
// Validation Functions
// =============================================================================

/// Validates the text of a new todo.
///
/// # Validation Rules
///
/// - Text must be present and not empty
/// - Text must not exceed 255 characters
///
/// # Errors
///
/// Returns `ValidationError` describing the first rule that failed.
pub fn validate_text(text: Option<&str>) -> Result<String, ValidationError> {
    match text {
        None | Some("") => Err(ValidationError::text_required()),
        Some(text) => validate_text_length(text).map(|()| text.to_string()),
    }
}

fn validate_text_length(text: &str) -> Result<(), ValidationError> {
    if text.chars().count() > MAX_TEXT_LENGTH {
        return Err(ValidationError::new(format!(
            "Text must not exceed {MAX_TEXT_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validates a create request into a `NewTodo`.
///
/// # Errors
///
/// Returns `ValidationError` if the text is missing, empty or too long.
pub fn validate_create_request(request: &CreateTodoRequest) -> Result<NewTodo, ValidationError> {
    validate_text(request.text.as_deref()).map(NewTodo::new)
}

/// Validates an update request into a `TodoPatch`.
///
/// Only the length of a present `text` is checked; every other combination,
/// including an empty body, is a valid patch.
///
/// # Errors
///
/// Returns `ValidationError` if `text` is longer than 255 characters.
pub fn validate_update_request(request: UpdateTodoRequest) -> Result<TodoPatch, ValidationError> {
    if let Some(text) = request.text.as_deref() {
        validate_text_length(text)?;
    }
    Ok(TodoPatch {
        text: request.text,
        completed: request.completed,
    })
}
