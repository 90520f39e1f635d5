//! Todo Service Library
//!
//! HTTP CRUD service over a single `todos` table, plus the client-side
//! controller that keeps a local list in sync with it.

pub mod api;
pub mod client;
pub mod domain;
pub mod infrastructure;
