//! Todo domain model.
//!
//! A `Todo` is the single persisted entity. Identifiers and creation
//! timestamps are assigned by the store; `text` and `completed` are the only
//! mutable fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of characters accepted for a todo's text.
///
/// Matches the `VARCHAR(255)` column of the `todos` table.
pub const MAX_TEXT_LENGTH: usize = 255;

// =============================================================================
// Value Objects - Newtypes
// =============================================================================

/// Store-assigned identifier of a todo.
///
/// Ids are assigned monotonically by the store and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(i64);

impl TodoId {
    /// Creates a `TodoId` from a raw store value.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the raw store value.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for TodoId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl std::str::FromStr for TodoId {
    type Err = std::num::ParseIntError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        value.trim().parse().map(Self)
    }
}

/// Creation timestamp of a todo, serialized as RFC 3339.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a `Timestamp` from a `DateTime<Utc>`.
    #[must_use]
    pub const fn from_datetime(datetime: DateTime<Utc>) -> Self {
        Self(datetime)
    }

    /// Returns the inner `DateTime<Utc>`.
    #[must_use]
    pub const fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Returns the current time as a `Timestamp`.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0.to_rfc3339())
    }
}

// =============================================================================
// Todo Entity
// =============================================================================

/// A persisted to-do item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    /// Store-assigned identifier.
    pub id: TodoId,
    /// Task description.
    pub text: String,
    /// Whether the task has been completed.
    pub completed: bool,
    /// Creation time, the listing order key.
    pub created_at: Timestamp,
}

impl Todo {
    /// Returns a copy of this todo with the patch merged in.
    ///
    /// Fields absent from the patch keep their current value.
    #[must_use]
    pub fn merged(&self, patch: &TodoPatch) -> Self {
        Self {
            id: self.id,
            text: patch.text.clone().unwrap_or_else(|| self.text.clone()),
            completed: patch.completed.unwrap_or(self.completed),
            created_at: self.created_at,
        }
    }
}

/// Validated input for inserting a todo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    /// Non-empty task text.
    pub text: String,
}

impl NewTodo {
    /// Creates a new insert request. Callers validate `text` first.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Partial update of a todo. `None` means "leave unchanged".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoPatch {
    /// Replacement text, if any.
    pub text: Option<String>,
    /// Replacement completion flag, if any.
    pub completed: Option<bool>,
}

impl TodoPatch {
    /// A patch that only sets the completion flag.
    #[must_use]
    pub const fn completed(completed: bool) -> Self {
        Self {
            text: None,
            completed: Some(completed),
        }
    }

    /// A patch that only replaces the text.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            completed: None,
        }
    }

    /// Returns true if the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.text.is_none() && self.completed.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn todo() -> Todo {
        Todo {
            id: TodoId::new(1),
            text: "Buy milk".to_string(),
            completed: false,
            created_at: Timestamp::now(),
        }
    }

    #[rstest]
    fn test_merged_completed_only_keeps_text(todo: Todo) {
        let merged = todo.merged(&TodoPatch::completed(true));
        assert_eq!(merged.text, "Buy milk");
        assert!(merged.completed);
        assert_eq!(merged.id, todo.id);
        assert_eq!(merged.created_at, todo.created_at);
    }

    #[rstest]
    fn test_merged_text_only_keeps_completed(todo: Todo) {
        let done = todo.merged(&TodoPatch::completed(true));
        let merged = done.merged(&TodoPatch::text("Buy oat milk"));
        assert_eq!(merged.text, "Buy oat milk");
        assert!(merged.completed);
    }

    #[rstest]
    fn test_empty_patch_is_identity(todo: Todo) {
        let patch = TodoPatch::default();
        assert!(patch.is_empty());
        assert_eq!(todo.merged(&patch), todo);
    }

    #[rstest]
    #[case("1", Some(1))]
    #[case(" 42 ", Some(42))]
    #[case("abc", None)]
    #[case("", None)]
    #[case("1.5", None)]
    fn test_todo_id_from_str(#[case] input: &str, #[case] expected: Option<i64>) {
        let parsed: Result<TodoId, _> = input.parse();
        assert_eq!(parsed.ok().map(TodoId::value), expected);
    }

    #[rstest]
    fn test_todo_serializes_flat(todo: Todo) {
        let value = serde_json::to_value(&todo).unwrap();
        assert_eq!(value["id"], 1);
        assert_eq!(value["text"], "Buy milk");
        assert_eq!(value["completed"], false);
        assert!(value["created_at"].is_string());
    }
}
