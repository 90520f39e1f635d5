//! Client state controller.
//!
//! Couples a `TodoClient` with a `TodoListState`: each user action issues one
//! request and feeds its outcome through the matching state transition.
//! Failures are logged and surfaced through `state().error`.

use super::http::{ClientError, TodoClient};
use super::state::TodoListState;
use crate::domain::TodoId;

/// Keeps a local todo list in sync with the service.
#[derive(Debug, Clone)]
pub struct TodoListController {
    client: TodoClient,
    state: TodoListState,
}

impl TodoListController {
    /// Creates a controller in the loading state. Call [`Self::load`] next.
    #[must_use]
    pub fn new(client: TodoClient) -> Self {
        Self {
            client,
            state: TodoListState::new(),
        }
    }

    /// Current state snapshot.
    #[must_use]
    pub const fn state(&self) -> &TodoListState {
        &self.state
    }

    fn transition(&mut self, apply: impl FnOnce(TodoListState) -> TodoListState) {
        let previous = std::mem::take(&mut self.state);
        self.state = apply(previous);
    }

    /// Initial fetch of the list.
    pub async fn load(&mut self) {
        self.transition(TodoListState::begin_operation);
        let result = self.client.list_todos().await;
        log_failure("fetching tasks", &result);
        self.transition(|state| state.fetch_resolved(result));
    }

    /// Updates the pending input text.
    pub fn set_input(&mut self, input: impl Into<String>) {
        let input = input.into();
        self.transition(|state| state.with_input(input));
    }

    /// Sends the trimmed input as a new task. Blank input sends nothing.
    pub async fn add(&mut self) {
        let Some(text) = self.state.pending_text() else {
            return;
        };
        self.transition(TodoListState::begin_operation);
        let result = self.client.create_todo(text).await;
        log_failure("adding task", &result);
        self.transition(|state| state.add_resolved(result));
    }

    /// Flips `completed` of a task. Unknown ids are ignored.
    pub async fn toggle(&mut self, id: TodoId) {
        let Some(completed) = self.state.toggle_target(id) else {
            return;
        };
        self.transition(TodoListState::begin_operation);
        let result = self.client.set_completed(id, completed).await;
        log_failure("updating task", &result);
        self.transition(|state| state.toggle_resolved(id, result));
    }

    /// Deletes a task.
    pub async fn delete(&mut self, id: TodoId) {
        self.transition(TodoListState::begin_operation);
        let result = self.client.delete_todo(id).await;
        log_failure("deleting task", &result);
        self.transition(|state| state.delete_resolved(id, result));
    }
}

fn log_failure<T>(action: &'static str, result: &Result<T, ClientError>) {
    if let Err(error) = result {
        tracing::error!(action, %error, "todo request failed");
    }
}
