//! Infrastructure module for persistence and configuration.
//!
//! This module contains the repository trait, its `PostgreSQL` and
//! in-memory implementations, and the configuration-driven factory.

pub mod factory;
pub mod in_memory;
pub mod postgres;
pub mod repository;

pub use factory::{
    AppConfig, ConfigurationError, DatabaseConfig, FactoryError, RepositoryConfig,
    RepositoryFactory, ServerConfig, StorageMode, load_env_file,
};
pub use in_memory::InMemoryTodoRepository;
pub use postgres::PostgresTodoRepository;
pub use repository::{RepositoryError, TodoRepository};
