//! HTTP client for the todo API.
//!
//! Speaks the JSON contract served by [`crate::api::router`]. Any non-2xx
//! status is a `ClientError`, with the server's `error` message attached
//! when the body carries one.

use std::env;
use std::time::Duration;

use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::api::{ApiError, CreateTodoRequest, MessageResponse, UpdateTodoRequest};
use crate::domain::{Todo, TodoId};

/// Base URL used when `TODO_API_URL` is not set.
pub const DEFAULT_API_URL: &str = "http://localhost:5000";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors surfaced by `TodoClient`.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced a response.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The server answered with a non-success status.
    #[error("HTTP error! status: {status}{}", message_suffix(.message))]
    Status {
        status: StatusCode,
        message: Option<String>,
    },

    /// The response body did not match the expected shape.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The underlying HTTP client could not be built.
    #[error("Client setup error: {0}")]
    Setup(String),
}

fn message_suffix(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|message| format!(" ({message})"))
        .unwrap_or_default()
}

impl ClientError {
    /// Status code of a `Status` error.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(_) | Self::Decode(_) | Self::Setup(_) => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            Self::Decode(error.to_string())
        } else {
            Self::Transport(error.to_string())
        }
    }
}

/// Typed client for the todo endpoints.
#[derive(Debug, Clone)]
pub struct TodoClient {
    client: reqwest::Client,
    base_url: String,
}

impl TodoClient {
    /// Creates a client for the service rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Setup` if the HTTP client cannot be initialized.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|error| ClientError::Setup(error.to_string()))?;
        Ok(Self { client, base_url })
    }

    /// Creates a client from `TODO_API_URL`, defaulting to `http://localhost:5000`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Setup` if the HTTP client cannot be initialized.
    pub fn from_env() -> Result<Self, ClientError> {
        let base_url = env::var("TODO_API_URL")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        Self::new(base_url)
    }

    /// Returns the service root this client talks to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn todos_url(&self) -> String {
        format!("{}/todos", self.base_url)
    }

    fn todo_url(&self, id: TodoId) -> String {
        format!("{}/todos/{id}", self.base_url)
    }

    /// `GET /todos`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` on transport failure, non-2xx status or bad body.
    pub async fn list_todos(&self) -> Result<Vec<Todo>, ClientError> {
        let response = self.client.get(self.todos_url()).send().await?;
        decode(response).await
    }

    /// `POST /todos`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` on transport failure, non-2xx status or bad body.
    pub async fn create_todo(&self, text: impl Into<String>) -> Result<Todo, ClientError> {
        let request = CreateTodoRequest {
            text: Some(text.into()),
        };
        let response = self
            .client
            .post(self.todos_url())
            .json(&request)
            .send()
            .await?;
        decode(response).await
    }

    /// `PUT /todos/{id}` with an arbitrary merge body.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` on transport failure, non-2xx status or bad body.
    pub async fn update_todo(
        &self,
        id: TodoId,
        request: &UpdateTodoRequest,
    ) -> Result<Todo, ClientError> {
        let response = self
            .client
            .put(self.todo_url(id))
            .json(request)
            .send()
            .await?;
        decode(response).await
    }

    /// `PUT /todos/{id}` with only `completed`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` on transport failure, non-2xx status or bad body.
    pub async fn set_completed(&self, id: TodoId, completed: bool) -> Result<Todo, ClientError> {
        let request = UpdateTodoRequest {
            text: None,
            completed: Some(completed),
        };
        self.update_todo(id, &request).await
    }

    /// `DELETE /todos/{id}`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` on transport failure, non-2xx status or bad body.
    pub async fn delete_todo(&self, id: TodoId) -> Result<MessageResponse, ClientError> {
        let response = self.client.delete(self.todo_url(id)).send().await?;
        decode(response).await
    }
}

/// Decodes a success body, or turns a non-2xx response into `ClientError::Status`.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return response
            .json()
            .await
            .map_err(|error| ClientError::Decode(error.to_string()));
    }

    let message = response
        .json::<ApiError>()
        .await
        .ok()
        .map(|body| body.error);
    Err(ClientError::Status { status, message })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("http://localhost:5000", "http://localhost:5000/todos")]
    #[case("http://localhost:5000/", "http://localhost:5000/todos")]
    #[case("https://api.example.com/v1//", "https://api.example.com/v1/todos")]
    fn test_todos_url(#[case] base: &str, #[case] expected: &str) {
        assert_eq!(TodoClient::new(base).unwrap().todos_url(), expected);
    }

    #[rstest]
    fn test_todo_url() {
        let client = TodoClient::new("http://localhost:5000").unwrap();
        assert_eq!(
            client.todo_url(TodoId::new(12)),
            "http://localhost:5000/todos/12"
        );
    }

    #[rstest]
    fn test_status_error_display() {
        let error = ClientError::Status {
            status: StatusCode::NOT_FOUND,
            message: Some("Todo not found".to_string()),
        };
        assert_eq!(
            error.to_string(),
            "HTTP error! status: 404 Not Found (Todo not found)"
        );
        assert_eq!(error.status(), Some(StatusCode::NOT_FOUND));

        let error = ClientError::Status {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: None,
        };
        assert_eq!(
            error.to_string(),
            "HTTP error! status: 500 Internal Server Error"
        );
    }

    #[rstest]
    fn test_transport_error_has_no_status() {
        assert_eq!(ClientError::Transport("refused".to_string()).status(), None);
    }

    #[rstest]
    fn test_setup_error_has_no_status() {
        let error = ClientError::Setup("no TLS backend".to_string());
        assert_eq!(error.status(), None);
        assert_eq!(error.to_string(), "Client setup error: no TLS backend");
    }

    #[rstest]
    fn test_new_builds_client_without_panicking() {
        let client = TodoClient::new(DEFAULT_API_URL).expect("client should build");
        assert_eq!(client.base_url(), "http://localhost:5000");
    }
}
