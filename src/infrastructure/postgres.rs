//! `PostgreSQL` repository implementation.
//!
//! Uses `sqlx` with a shared `PgPool`. Every operation is a single
//! parameterized statement, so atomicity comes from `PostgreSQL` itself.
//!
//! # Table Schema
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS todos (
//!     id BIGSERIAL PRIMARY KEY,
//!     text VARCHAR(255) NOT NULL,
//!     completed BOOLEAN NOT NULL DEFAULT FALSE,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```

use chrono::{DateTime, Utc};
use futures::FutureExt;
use futures::future::BoxFuture;
use sqlx::PgPool;

use crate::domain::{NewTodo, Timestamp, Todo, TodoId, TodoPatch};
use crate::infrastructure::{RepositoryError, TodoRepository};

const CREATE_TABLE_SQL: &str = r"
    CREATE TABLE IF NOT EXISTS todos (
        id BIGSERIAL PRIMARY KEY,
        text VARCHAR(255) NOT NULL,
        completed BOOLEAN NOT NULL DEFAULT FALSE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
";

const LIST_SQL: &str =
    "SELECT id, text, completed, created_at FROM todos ORDER BY created_at DESC, id DESC";

const INSERT_SQL: &str =
    "INSERT INTO todos (text) VALUES ($1) RETURNING id, text, completed, created_at";

const UPDATE_SQL: &str = "UPDATE todos \
     SET text = COALESCE($1, text), completed = COALESCE($2, completed) \
     WHERE id = $3 \
     RETURNING id, text, completed, created_at";

const DELETE_SQL: &str = "DELETE FROM todos WHERE id = $1";

const COUNT_SQL: &str = "SELECT COUNT(*) FROM todos";

// =============================================================================
// Row Mapping
// =============================================================================

/// Raw `todos` row as decoded by `sqlx`.
#[derive(Debug, sqlx::FromRow)]
struct TodoRow {
    id: i64,
    text: String,
    completed: bool,
    created_at: DateTime<Utc>,
}

impl From<TodoRow> for Todo {
    fn from(row: TodoRow) -> Self {
        Self {
            id: TodoId::new(row.id),
            text: row.text,
            completed: row.completed,
            created_at: Timestamp::from_datetime(row.created_at),
        }
    }
}

// =============================================================================
// PostgreSQL Todo Repository
// =============================================================================

/// `PostgreSQL` implementation of `TodoRepository`.
///
/// # Example
///
/// ```ignore
/// let pool = PgPool::connect("postgres://localhost/todos").await?;
/// let repository = PostgresTodoRepository::new(pool);
/// repository.ensure_schema().await?;
/// let todo = repository.create(NewTodo::new("Buy milk")).await?;
/// ```
#[derive(Debug, Clone)]
pub struct PostgresTodoRepository {
    pool: PgPool,
}

impl PostgresTodoRepository {
    /// Creates a repository over an already-connected pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns the underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl TodoRepository for PostgresTodoRepository {
    fn ensure_schema(&self) -> BoxFuture<'_, Result<(), RepositoryError>> {
        async move {
            sqlx::query(CREATE_TABLE_SQL).execute(&self.pool).await?;
            Ok(())
        }
        .boxed()
    }

    fn list(&self) -> BoxFuture<'_, Result<Vec<Todo>, RepositoryError>> {
        async move {
            let rows: Vec<TodoRow> = sqlx::query_as(LIST_SQL).fetch_all(&self.pool).await?;
            Ok(rows.into_iter().map(Todo::from).collect())
        }
        .boxed()
    }

    fn create(&self, todo: NewTodo) -> BoxFuture<'_, Result<Todo, RepositoryError>> {
        async move {
            let row: TodoRow = sqlx::query_as(INSERT_SQL)
                .bind(todo.text)
                .fetch_one(&self.pool)
                .await?;
            Ok(Todo::from(row))
        }
        .boxed()
    }

    fn update(
        &self,
        id: TodoId,
        patch: TodoPatch,
    ) -> BoxFuture<'_, Result<Option<Todo>, RepositoryError>> {
        async move {
            let row: Option<TodoRow> = sqlx::query_as(UPDATE_SQL)
                .bind(patch.text)
                .bind(patch.completed)
                .bind(id.value())
                .fetch_optional(&self.pool)
                .await?;
            Ok(row.map(Todo::from))
        }
        .boxed()
    }

    fn delete(&self, id: TodoId) -> BoxFuture<'_, Result<bool, RepositoryError>> {
        async move {
            let result = sqlx::query(DELETE_SQL)
                .bind(id.value())
                .execute(&self.pool)
                .await?;
            Ok(result.rows_affected() > 0)
        }
        .boxed()
    }

    fn count(&self) -> BoxFuture<'_, Result<u64, RepositoryError>> {
        async move {
            let (count,): (i64,) = sqlx::query_as(COUNT_SQL).fetch_one(&self.pool).await?;
            Ok(u64::try_from(count).unwrap_or_default())
        }
        .boxed()
    }

    fn close(&self) -> BoxFuture<'_, ()> {
        async move {
            self.pool.close().await;
        }
        .boxed()
    }
}
