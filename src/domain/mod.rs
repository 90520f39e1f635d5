//! Domain module for the todo resource.
//!
//! This module contains the `Todo` entity, its value objects and the pure
//! merge logic used by partial updates.

pub mod todo;

pub use todo::{MAX_TEXT_LENGTH, NewTodo, Timestamp, Todo, TodoId, TodoPatch};
