//! Client-side todo list state and its transitions.
//!
//! Every transition takes the previous state plus the outcome of one server
//! round trip and returns the next state. Nothing here performs I/O, so the
//! whole synchronization logic is testable without a server.
//!
//! The list only changes after the server confirms; the input text is the
//! one piece of state that lives ahead of the server.

use crate::domain::{Todo, TodoId};

/// Shown when the initial fetch fails.
pub const FETCH_FAILED: &str = "Failed to fetch tasks. Please try again later.";
/// Shown when creating a task fails.
pub const ADD_FAILED: &str = "Failed to add task. Please try again.";
/// Shown when toggling a task fails.
pub const TOGGLE_FAILED: &str = "Failed to update task. Please try again.";
/// Shown when deleting a task fails.
pub const DELETE_FAILED: &str = "Failed to delete task. Please try again.";

/// Local mirror of the server's todo list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoListState {
    /// Tasks in server order, newest first.
    pub todos: Vec<Todo>,
    /// Text typed by the user but not yet confirmed by the server.
    pub input: String,
    /// True only while the initial fetch is outstanding.
    pub loading: bool,
    /// User-visible message of the last failed operation.
    pub error: Option<String>,
}

impl Default for TodoListState {
    fn default() -> Self {
        Self::new()
    }
}

impl TodoListState {
    /// State before the initial fetch has resolved.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            todos: Vec::new(),
            input: String::new(),
            loading: true,
            error: None,
        }
    }

    /// Clears the error at the start of a new operation.
    #[must_use]
    pub fn begin_operation(self) -> Self {
        Self {
            error: None,
            ..self
        }
    }

    /// Replaces the input text.
    #[must_use]
    pub fn with_input(self, input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            ..self
        }
    }

    /// Applies the result of the initial fetch.
    #[must_use]
    pub fn fetch_resolved<E>(self, result: Result<Vec<Todo>, E>) -> Self {
        match result {
            Ok(todos) => Self {
                todos,
                loading: false,
                ..self
            },
            Err(_) => Self {
                todos: Vec::new(),
                loading: false,
                error: Some(FETCH_FAILED.to_string()),
                ..self
            },
        }
    }

    /// Trimmed input to send, or `None` if the input is blank.
    #[must_use]
    pub fn pending_text(&self) -> Option<String> {
        let trimmed = self.input.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }

    /// Applies the result of creating a task.
    ///
    /// On success the task is prepended and the input cleared; on failure the
    /// input is kept so the user can retry.
    #[must_use]
    pub fn add_resolved<E>(self, result: Result<Todo, E>) -> Self {
        match result {
            Ok(todo) => {
                let mut todos = Vec::with_capacity(self.todos.len() + 1);
                todos.push(todo);
                todos.extend(self.todos);
                Self {
                    todos,
                    input: String::new(),
                    ..self
                }
            }
            Err(_) => Self {
                error: Some(ADD_FAILED.to_string()),
                ..self
            },
        }
    }

    /// The `completed` value a toggle of `id` should send, or `None` if the
    /// task is not in the local list.
    #[must_use]
    pub fn toggle_target(&self, id: TodoId) -> Option<bool> {
        self.find(id).map(|todo| !todo.completed)
    }

    /// Applies the result of toggling a task.
    ///
    /// On success the local copy is replaced by the server's.
    #[must_use]
    pub fn toggle_resolved<E>(self, id: TodoId, result: Result<Todo, E>) -> Self {
        match result {
            Ok(updated) => Self {
                todos: self
                    .todos
                    .into_iter()
                    .map(|todo| if todo.id == id { updated.clone() } else { todo })
                    .collect(),
                ..self
            },
            Err(_) => Self {
                error: Some(TOGGLE_FAILED.to_string()),
                ..self
            },
        }
    }

    /// Applies the result of deleting a task.
    #[must_use]
    pub fn delete_resolved<T, E>(self, id: TodoId, result: Result<T, E>) -> Self {
        match result {
            Ok(_) => Self {
                todos: self.todos.into_iter().filter(|todo| todo.id != id).collect(),
                ..self
            },
            Err(_) => Self {
                error: Some(DELETE_FAILED.to_string()),
                ..self
            },
        }
    }

    /// Looks up a task in the local list.
    #[must_use]
    pub fn find(&self, id: TodoId) -> Option<&Todo> {
        self.todos.iter().find(|todo| todo.id == id)
    }

    /// Number of tasks in the list.
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.todos.len()
    }

    /// Number of completed tasks in the list.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.todos.iter().filter(|todo| todo.completed).count()
    }

    /// `"{completed} of {total} tasks completed"`, or `None` for an empty list.
    #[must_use]
    pub fn summary(&self) -> Option<String> {
        let total = self.total_count();
        (total > 0).then(|| format!("{} of {total} tasks completed", self.completed_count()))
    }

    /// Completion percentage rounded to the nearest integer, or `None` for an
    /// empty list.
    #[must_use]
    pub fn progress_percent(&self) -> Option<u8> {
        let total = self.total_count();
        if total == 0 {
            return None;
        }
        let percent = (self.completed_count() * 200 + total) / (total * 2);
        u8::try_from(percent).ok()
    }
}
