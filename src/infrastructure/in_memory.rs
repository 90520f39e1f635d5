//! In-memory repository implementation.
//!
//! Mirrors the observable behavior of the `PostgreSQL` store: monotonic ids,
//! strictly increasing creation timestamps, merge updates and hard deletes.
//! Suitable for development and tests.
//!
//! # Features
//!
//! - Thread-safe with `Arc<RwLock<...>>`
//! - Each operation takes the lock once, so every write is atomic

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Duration;
use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::sync::RwLock;

use crate::domain::{NewTodo, Timestamp, Todo, TodoId, TodoPatch};
use crate::infrastructure::{RepositoryError, TodoRepository};

// =============================================================================
// Table State
// =============================================================================

/// Rows plus the sequence state of the emulated table.
#[derive(Debug, Default)]
struct Table {
    rows: BTreeMap<TodoId, Todo>,
    /// Last id handed out; ids are never reused, even after deletes.
    last_id: i64,
    /// Last creation timestamp handed out.
    last_created_at: Option<Timestamp>,
}

impl Table {
    fn next_id(&mut self) -> TodoId {
        self.last_id += 1;
        TodoId::new(self.last_id)
    }

    /// Returns `now`, bumped past the previous timestamp if the clock has not
    /// advanced, so creation order and timestamp order always agree.
    fn next_created_at(&mut self, now: Timestamp) -> Timestamp {
        let created_at = match self.last_created_at {
            Some(last) if now <= last => {
                Timestamp::from_datetime(*last.as_datetime() + Duration::microseconds(1))
            }
            _ => now,
        };
        self.last_created_at = Some(created_at);
        created_at
    }
}

// =============================================================================
// In-Memory Todo Repository
// =============================================================================

/// In-memory implementation of `TodoRepository`.
///
/// # Example
///
/// ```ignore
/// let repository = InMemoryTodoRepository::new();
/// let todo = repository.create(NewTodo::new("Buy milk")).await?;
/// assert_eq!(todo.id, TodoId::new(1));
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryTodoRepository {
    table: Arc<RwLock<Table>>,
}

impl InMemoryTodoRepository {
    /// Creates a new empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[allow(clippy::significant_drop_tightening)]
impl TodoRepository for InMemoryTodoRepository {
    fn ensure_schema(&self) -> BoxFuture<'_, Result<(), RepositoryError>> {
        async { Ok(()) }.boxed()
    }

    fn list(&self) -> BoxFuture<'_, Result<Vec<Todo>, RepositoryError>> {
        async move {
            let table = self.table.read().await;
            let mut todos: Vec<Todo> = table.rows.values().cloned().collect();
            todos.sort_by(|left, right| {
                right
                    .created_at
                    .cmp(&left.created_at)
                    .then_with(|| right.id.cmp(&left.id))
            });
            Ok(todos)
        }
        .boxed()
    }

    fn create(&self, todo: NewTodo) -> BoxFuture<'_, Result<Todo, RepositoryError>> {
        async move {
            let mut table = self.table.write().await;
            let id = table.next_id();
            let created_at = table.next_created_at(Timestamp::now());
            let todo = Todo {
                id,
                text: todo.text,
                completed: false,
                created_at,
            };
            table.rows.insert(id, todo.clone());
            Ok(todo)
        }
        .boxed()
    }

    fn update(
        &self,
        id: TodoId,
        patch: TodoPatch,
    ) -> BoxFuture<'_, Result<Option<Todo>, RepositoryError>> {
        async move {
            let mut table = self.table.write().await;
            Ok(table.rows.get_mut(&id).map(|row| {
                *row = row.merged(&patch);
                row.clone()
            }))
        }
        .boxed()
    }

    fn delete(&self, id: TodoId) -> BoxFuture<'_, Result<bool, RepositoryError>> {
        async move {
            let mut table = self.table.write().await;
            Ok(table.rows.remove(&id).is_some())
        }
        .boxed()
    }

    fn count(&self) -> BoxFuture<'_, Result<u64, RepositoryError>> {
        async move {
            let table = self.table.read().await;
            Ok(table.rows.len() as u64)
        }
        .boxed()
    }

    fn close(&self) -> BoxFuture<'_, ()> {
        async {}.boxed()
    }
}
