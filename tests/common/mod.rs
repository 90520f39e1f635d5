//! Common test helpers for integration tests.
//!
//! # Usage
//!
//! ```ignore
//! mod common;
//! use common::{create_test_app_state, send_json};
//! ```
//!
//! # Note
//!
//! The `#![allow(dead_code)]` attribute is necessary because Rust compiles each
//! integration test file as a separate crate, and not every file uses every
//! helper.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use futures::FutureExt;
use futures::future::BoxFuture;
use http_body_util::BodyExt;
use tokio::net::TcpListener;
use tower::ServiceExt;

use todo_service::api::{AppState, router};
use todo_service::domain::{NewTodo, Todo, TodoId, TodoPatch};
use todo_service::infrastructure::{InMemoryTodoRepository, RepositoryError, TodoRepository};

// =============================================================================
// AppState Creation Helpers
// =============================================================================

/// Creates a test `AppState` backed by a fresh in-memory repository.
pub fn create_test_app_state() -> AppState {
    AppState::new(Arc::new(InMemoryTodoRepository::new()))
}

/// Creates an `AppState` whose store fails every call.
pub fn create_failing_app_state() -> (AppState, Arc<FailingTodoRepository>) {
    let repository = Arc::new(FailingTodoRepository::default());
    (AppState::new(repository.clone()), repository)
}

/// Inserts a todo directly through the repository.
pub async fn create_and_save_todo(state: &AppState, text: &str) -> Todo {
    state
        .todo_repository
        .create(NewTodo::new(text))
        .await
        .expect("Failed to save todo")
}

/// Current row count of the store.
pub async fn row_count(state: &AppState) -> u64 {
    state
        .todo_repository
        .count()
        .await
        .expect("Failed to count todos")
}

// =============================================================================
// Failing Repository
// =============================================================================

/// Repository that fails every operation and counts the calls it receives.
#[derive(Debug, Default)]
pub struct FailingTodoRepository {
    calls: AtomicUsize,
}

impl FailingTodoRepository {
    /// Number of repository calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn fail<T: Send + 'static>(&self) -> BoxFuture<'_, Result<T, RepositoryError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        async {
            Err(RepositoryError::DatabaseError(
                "connection to server at \"db\" refused".to_string(),
            ))
        }
        .boxed()
    }
}

impl TodoRepository for FailingTodoRepository {
    fn ensure_schema(&self) -> BoxFuture<'_, Result<(), RepositoryError>> {
        self.fail()
    }

    fn list(&self) -> BoxFuture<'_, Result<Vec<Todo>, RepositoryError>> {
        self.fail()
    }

    fn create(&self, _todo: NewTodo) -> BoxFuture<'_, Result<Todo, RepositoryError>> {
        self.fail()
    }

    fn update(
        &self,
        _id: TodoId,
        _patch: TodoPatch,
    ) -> BoxFuture<'_, Result<Option<Todo>, RepositoryError>> {
        self.fail()
    }

    fn delete(&self, _id: TodoId) -> BoxFuture<'_, Result<bool, RepositoryError>> {
        self.fail()
    }

    fn count(&self) -> BoxFuture<'_, Result<u64, RepositoryError>> {
        self.fail()
    }

    fn close(&self) -> BoxFuture<'_, ()> {
        async {}.boxed()
    }
}

// =============================================================================
// Router Helpers
// =============================================================================

/// Builds the full application router over `state`.
pub fn test_router(state: AppState) -> Router {
    router(state)
}

/// Sends one request through the router and returns status and raw body.
pub async fn send(
    application: Router,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, Vec<u8>) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let request = builder.body(body).expect("Failed to build request");

    let response = application
        .oneshot(request)
        .await
        .expect("Router is infallible");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to collect body")
        .to_bytes();
    (status, bytes.to_vec())
}

/// Like [`send`], but decodes the body as JSON.
pub async fn send_json(
    application: Router,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let (status, bytes) = send(application, method, uri, body).await;
    let json = serde_json::from_slice(&bytes).expect("Response body is JSON");
    (status, json)
}

// =============================================================================
// Live Server Helpers
// =============================================================================

/// Serves the router on an ephemeral local port and returns its base URL.
pub async fn spawn_server(state: AppState) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let address = listener.local_addr().expect("Listener has an address");

    tokio::spawn(async move {
        axum::serve(listener, router(state))
            .await
            .expect("Test server failed");
    });

    format!("http://{address}")
}
