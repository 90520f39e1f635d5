//! Client side of the todo service.
//!
//! `TodoClient` speaks the HTTP contract, `TodoListState` holds the local
//! mirror with pure transitions, and `TodoListController` wires the two.

pub mod controller;
pub mod http;
pub mod state;

pub use controller::TodoListController;
pub use http::{ClientError, DEFAULT_API_URL, TodoClient};
pub use state::TodoListState;
