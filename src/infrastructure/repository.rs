//! Repository trait for the todo store.
//!
//! Methods return boxed futures so the repository can be shared as a trait
//! object (`Arc<dyn TodoRepository>`) and the backend chosen at runtime.

use futures::future::BoxFuture;
use thiserror::Error;

use crate::domain::{NewTodo, Todo, TodoId, TodoPatch};

// =============================================================================
// Repository Error
// =============================================================================

/// Errors that can occur during repository operations.
///
/// Every variant is a store failure; "row not found" is not an error at this
/// layer and is reported through `Option`/`bool` return values instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// Query execution or row decoding failed.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// No connection could be obtained (pool closed or timed out).
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::PoolClosed | sqlx::Error::PoolTimedOut => {
                Self::Unavailable(error.to_string())
            }
            other => Self::DatabaseError(other.to_string()),
        }
    }
}

// =============================================================================
// Todo Repository
// =============================================================================

/// Repository trait for `Todo` rows.
///
/// Each mutating method maps to exactly one atomic statement in the store.
/// Concurrent writes to the same id are last-writer-wins.
pub trait TodoRepository: Send + Sync {
    /// Creates the backing table if it does not exist. Never destructive.
    fn ensure_schema(&self) -> BoxFuture<'_, Result<(), RepositoryError>>;

    /// Lists every todo, newest `created_at` first (ties: highest id first).
    fn list(&self) -> BoxFuture<'_, Result<Vec<Todo>, RepositoryError>>;

    /// Inserts a todo; the store assigns `id`, `created_at` and `completed = false`.
    fn create(&self, todo: NewTodo) -> BoxFuture<'_, Result<Todo, RepositoryError>>;

    /// Merges `patch` into the row with `id`.
    ///
    /// Returns `Ok(None)` if no row has that id.
    fn update(
        &self,
        id: TodoId,
        patch: TodoPatch,
    ) -> BoxFuture<'_, Result<Option<Todo>, RepositoryError>>;

    /// Deletes the row with `id`.
    ///
    /// Returns `Ok(true)` if a row was deleted, `Ok(false)` if it didn't exist.
    fn delete(&self, id: TodoId) -> BoxFuture<'_, Result<bool, RepositoryError>>;

    /// Counts all rows.
    fn count(&self) -> BoxFuture<'_, Result<u64, RepositoryError>>;

    /// Releases the store's resources. Called once on shutdown.
    fn close(&self) -> BoxFuture<'_, ()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_repository_error_display() {
        let error = RepositoryError::DatabaseError("relation \"todos\" does not exist".to_string());
        assert_eq!(
            format!("{error}"),
            "Database error: relation \"todos\" does not exist"
        );

        let error = RepositoryError::Unavailable("pool timed out".to_string());
        assert_eq!(format!("{error}"), "Store unavailable: pool timed out");
    }

    #[rstest]
    fn test_sqlx_pool_errors_map_to_unavailable() {
        assert!(matches!(
            RepositoryError::from(sqlx::Error::PoolClosed),
            RepositoryError::Unavailable(_)
        ));
        assert!(matches!(
            RepositoryError::from(sqlx::Error::PoolTimedOut),
            RepositoryError::Unavailable(_)
        ));
    }

    #[rstest]
    fn test_sqlx_row_not_found_maps_to_database_error() {
        assert!(matches!(
            RepositoryError::from(sqlx::Error::RowNotFound),
            RepositoryError::DatabaseError(_)
        ));
    }
}
