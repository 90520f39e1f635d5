//! Configuration and repository factory for runtime backend selection.
//!
//! Configuration is resolved from the environment before the service accepts
//! traffic. The factory turns it into a ready-to-use repository: it opens the
//! connection pool once and bootstraps the schema.
//!
//! # Environment Variables
//!
//! - `APP_ENV`: `production` loads `.env.production`, anything else `.env.development`
//! - `STORAGE_MODE`: `postgres` (default) | `in_memory`
//! - `DATABASE_URL`: full `PostgreSQL` URL; overrides the `DB_*` parts
//! - `DB_HOST` (default `localhost`), `DB_PORT` (default `5432`), `DB_USER`, `DB_PASS`, `DB_NAME`
//! - `DB_MAX_CONNECTIONS`: pool size (default `10`)
//! - `HOST` (default `0.0.0.0`), `PORT` (default `5000`)
//!
//! # Example
//!
//! ```ignore
//! let config = AppConfig::from_env()?;
//! let repository = RepositoryFactory::new(config.repository).create().await?;
//! ```

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use thiserror::Error;

use super::{InMemoryTodoRepository, PostgresTodoRepository, RepositoryError, TodoRepository};

const DEFAULT_DB_HOST: &str = "localhost";
const DEFAULT_DB_PORT: u16 = 5432;
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5000;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

// =============================================================================
// Environment File Selection
// =============================================================================

/// Returns the environment file name selected by `APP_ENV`.
#[must_use]
pub fn env_file_for(app_env: Option<&str>) -> &'static str {
    match app_env.map(str::trim) {
        Some(value) if value.eq_ignore_ascii_case("production") => ".env.production",
        _ => ".env.development",
    }
}

/// Loads the environment file selected by `APP_ENV`, falling back to `.env`.
///
/// Variables already present in the process environment win. A missing file
/// is not an error. Returns the name of the file that was loaded, if any.
pub fn load_env_file() -> Option<String> {
    let app_env = env::var("APP_ENV").ok();
    let selected = env_file_for(app_env.as_deref());

    if dotenvy::from_filename(selected).is_ok() {
        return Some(selected.to_string());
    }
    dotenvy::dotenv()
        .ok()
        .map(|path| path.display().to_string())
}

// =============================================================================
// Configuration Types
// =============================================================================

/// Storage backend for todo rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageMode {
    /// `PostgreSQL` storage for production use.
    #[default]
    Postgres,
    /// In-process storage. Suitable for testing and development.
    InMemory,
}

impl FromStr for StorageMode {
    type Err = ConfigurationError;

    /// Parses a storage mode from a string.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidStorageMode` if the string is not recognized.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            "in_memory" | "inmemory" | "memory" => Ok(Self::InMemory),
            _ => Err(ConfigurationError::InvalidStorageMode(value.to_string())),
        }
    }
}

/// Connection parameters for `PostgreSQL`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// Full connection URL. Takes precedence over the individual parts.
    pub url: Option<String>,
    /// Server host name.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Login role.
    pub user: Option<String>,
    /// Login password.
    pub password: Option<String>,
    /// Database name.
    pub database: Option<String>,
    /// Maximum number of pooled connections.
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: DEFAULT_DB_HOST.to_string(),
            port: DEFAULT_DB_PORT,
            user: None,
            password: None,
            database: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl DatabaseConfig {
    /// Builds `sqlx` connect options from this configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidDatabaseUrl` if `url` cannot be parsed.
    pub fn connect_options(&self) -> Result<PgConnectOptions, ConfigurationError> {
        if let Some(url) = &self.url {
            return url
                .parse()
                .map_err(|error: sqlx::Error| ConfigurationError::InvalidDatabaseUrl(error.to_string()));
        }

        let mut options = PgConnectOptions::new().host(&self.host).port(self.port);
        if let Some(user) = &self.user {
            options = options.username(user);
        }
        if let Some(password) = &self.password {
            options = options.password(password);
        }
        if let Some(database) = &self.database {
            options = options.database(database);
        }
        Ok(options)
    }
}

/// Configuration for the repository factory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositoryConfig {
    /// Which backend stores todo rows.
    pub storage_mode: StorageMode,
    /// `PostgreSQL` parameters (ignored for `InMemory`).
    pub database: DatabaseConfig,
}

impl RepositoryConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> RepositoryConfigBuilder {
        RepositoryConfigBuilder::default()
    }

    /// Creates a configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if a variable holds a malformed value.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        let storage_mode = match env::var("STORAGE_MODE") {
            Ok(value) => value.parse()?,
            Err(env::VarError::NotPresent) => StorageMode::default(),
            Err(env::VarError::NotUnicode(_)) => {
                return Err(ConfigurationError::InvalidStorageMode(
                    "<non-UTF-8 value>".to_string(),
                ));
            }
        };

        let database = DatabaseConfig {
            url: non_empty_var("DATABASE_URL"),
            host: non_empty_var("DB_HOST").unwrap_or_else(|| DEFAULT_DB_HOST.to_string()),
            port: parse_var("DB_PORT", DEFAULT_DB_PORT)?,
            user: non_empty_var("DB_USER"),
            password: non_empty_var("DB_PASS"),
            database: non_empty_var("DB_NAME"),
            max_connections: parse_var("DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?,
        };

        let config = Self {
            storage_mode,
            database,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidValue` if the pool size is zero.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.storage_mode == StorageMode::Postgres && self.database.max_connections == 0 {
            return Err(ConfigurationError::InvalidValue {
                name: "DB_MAX_CONNECTIONS",
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}

/// Builder for `RepositoryConfig`.
///
/// # Example
///
/// ```ignore
/// let config = RepositoryConfig::builder()
///     .storage_mode(StorageMode::Postgres)
///     .database_url("postgres://localhost/todos")
///     .build()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct RepositoryConfigBuilder {
    storage_mode: StorageMode,
    database: DatabaseConfig,
}

impl RepositoryConfigBuilder {
    /// Sets the storage mode.
    #[must_use]
    pub const fn storage_mode(mut self, mode: StorageMode) -> Self {
        self.storage_mode = mode;
        self
    }

    /// Sets the `PostgreSQL` database URL.
    #[must_use]
    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.database.url = Some(url.into());
        self
    }

    /// Sets the pool size.
    #[must_use]
    pub const fn max_connections(mut self, max_connections: u32) -> Self {
        self.database.max_connections = max_connections;
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if the configuration is invalid.
    pub fn build(self) -> Result<RepositoryConfig, ConfigurationError> {
        let config = RepositoryConfig {
            storage_mode: self.storage_mode,
            database: self.database,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Listening address of the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,
    /// TCP port to bind.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    /// Reads `HOST` and `PORT`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidValue` if `PORT` is not a valid port.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Ok(Self {
            host: non_empty_var("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_var("PORT", DEFAULT_PORT)?,
        })
    }

    /// Resolves the socket address to bind.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidAddress` if `host` is not an IPv4 or
    /// IPv6 literal.
    pub fn socket_address(&self) -> Result<SocketAddr, ConfigurationError> {
        let host = self.host.trim();
        let ip: IpAddr = host
            .trim_start_matches('[')
            .trim_end_matches(']')
            .parse()
            .map_err(|_| ConfigurationError::InvalidAddress(host.to_string()))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Complete service configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    /// Store configuration.
    pub repository: RepositoryConfig,
    /// Listener configuration.
    pub server: ServerConfig,
}

impl AppConfig {
    /// Reads the full configuration from the environment.
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigurationError` encountered.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Ok(Self {
            repository: RepositoryConfig::from_env()?,
            server: ServerConfig::from_env()?,
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigurationError> {
    non_empty_var(name).map_or(Ok(default), |value| {
        value
            .parse()
            .map_err(|_| ConfigurationError::InvalidValue { name, value })
    })
}

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur while reading configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// Invalid storage mode value.
    #[error("Invalid storage mode: '{0}'. Expected 'postgres' or 'in_memory'")]
    InvalidStorageMode(String),

    /// A variable holds a value of the wrong shape.
    #[error("Invalid value for {name}: '{value}'")]
    InvalidValue { name: &'static str, value: String },

    /// `DATABASE_URL` could not be parsed.
    #[error("Invalid DATABASE_URL: {0}")]
    InvalidDatabaseUrl(String),

    /// `HOST`/`PORT` do not form a socket address.
    #[error("Invalid server address: {0}")]
    InvalidAddress(String),
}

/// Errors that can occur during factory initialization.
#[derive(Debug, Error)]
pub enum FactoryError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    DatabaseConnection(String),

    /// Schema bootstrap error.
    #[error("Schema bootstrap error: {0}")]
    Schema(#[from] RepositoryError),
}

// =============================================================================
// Repository Factory
// =============================================================================

/// Factory for creating the repository selected by configuration.
#[derive(Debug, Clone)]
pub struct RepositoryFactory {
    config: RepositoryConfig,
}

impl RepositoryFactory {
    /// Creates a new repository factory with the given configuration.
    #[must_use]
    pub const fn new(config: RepositoryConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration used by this factory.
    #[must_use]
    pub const fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    /// Creates the repository and bootstraps its schema.
    ///
    /// # Errors
    ///
    /// Returns `FactoryError` if the pool cannot connect or the schema
    /// bootstrap fails.
    pub async fn create(&self) -> Result<Arc<dyn TodoRepository>, FactoryError> {
        let repository: Arc<dyn TodoRepository> = match self.config.storage_mode {
            StorageMode::InMemory => Arc::new(InMemoryTodoRepository::new()),
            StorageMode::Postgres => Arc::new(self.create_postgres_repository().await?),
        };

        repository.ensure_schema().await?;
        tracing::info!("todos table created or already exists");
        Ok(repository)
    }

    async fn create_postgres_repository(&self) -> Result<PostgresTodoRepository, FactoryError> {
        let options = self.config.database.connect_options()?;

        let pool = PgPoolOptions::new()
            .max_connections(self.config.database.max_connections)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect_with(options)
            .await
            .map_err(|error| FactoryError::DatabaseConnection(error.to_string()))?;

        Ok(PostgresTodoRepository::new(pool))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("postgres", StorageMode::Postgres)]
    #[case("postgresql", StorageMode::Postgres)]
    #[case("pg", StorageMode::Postgres)]
    #[case("POSTGRES", StorageMode::Postgres)]
    #[case("in_memory", StorageMode::InMemory)]
    #[case("inmemory", StorageMode::InMemory)]
    #[case("memory", StorageMode::InMemory)]
    #[case(" IN_MEMORY ", StorageMode::InMemory)]
    fn test_storage_mode_from_str_valid(#[case] input: &str, #[case] expected: StorageMode) {
        let result: Result<StorageMode, _> = input.parse();
        assert_eq!(result, Ok(expected));
    }

    #[rstest]
    #[case("invalid")]
    #[case("redis")]
    #[case("")]
    fn test_storage_mode_from_str_invalid(#[case] input: &str) {
        let result: Result<StorageMode, _> = input.parse();
        assert_eq!(
            result,
            Err(ConfigurationError::InvalidStorageMode(input.to_string()))
        );
    }

    #[rstest]
    #[case(Some("production"), ".env.production")]
    #[case(Some("PRODUCTION"), ".env.production")]
    #[case(Some("development"), ".env.development")]
    #[case(Some("staging"), ".env.development")]
    #[case(None, ".env.development")]
    fn test_env_file_for(#[case] app_env: Option<&str>, #[case] expected: &str) {
        assert_eq!(env_file_for(app_env), expected);
    }

    #[rstest]
    fn test_default_storage_is_postgres() {
        let config = RepositoryConfig::default();
        assert_eq!(config.storage_mode, StorageMode::Postgres);
        assert_eq!(config.database.port, 5432);
        assert_eq!(config.database.host, "localhost");
        assert_eq!(config.database.max_connections, 10);
    }

    #[rstest]
    fn test_builder_rejects_zero_pool_size() {
        let result = RepositoryConfig::builder().max_connections(0).build();
        assert!(matches!(
            result,
            Err(ConfigurationError::InvalidValue {
                name: "DB_MAX_CONNECTIONS",
                ..
            })
        ));
    }

    #[rstest]
    fn test_builder_allows_zero_pool_size_in_memory() {
        let result = RepositoryConfig::builder()
            .storage_mode(StorageMode::InMemory)
            .max_connections(0)
            .build();
        assert!(result.is_ok());
    }

    #[rstest]
    fn test_connect_options_from_parts() {
        let config = DatabaseConfig {
            host: "db.internal".to_string(),
            port: 6543,
            user: Some("todo".to_string()),
            database: Some("todos".to_string()),
            ..DatabaseConfig::default()
        };

        let options = config.connect_options().unwrap();
        assert_eq!(options.get_host(), "db.internal");
        assert_eq!(options.get_port(), 6543);
        assert_eq!(options.get_username(), "todo");
        assert_eq!(options.get_database(), Some("todos"));
    }

    #[rstest]
    fn test_connect_options_url_takes_precedence() {
        let config = DatabaseConfig {
            url: Some("postgres://app@example.com:5433/tracker".to_string()),
            host: "ignored".to_string(),
            ..DatabaseConfig::default()
        };

        let options = config.connect_options().unwrap();
        assert_eq!(options.get_host(), "example.com");
        assert_eq!(options.get_port(), 5433);
        assert_eq!(options.get_database(), Some("tracker"));
    }

    #[rstest]
    fn test_connect_options_invalid_url() {
        let config = DatabaseConfig {
            url: Some("not a url".to_string()),
            ..DatabaseConfig::default()
        };

        assert!(matches!(
            config.connect_options(),
            Err(ConfigurationError::InvalidDatabaseUrl(_))
        ));
    }

    #[rstest]
    #[case("0.0.0.0", 5000, true)]
    #[case("127.0.0.1", 8080, true)]
    #[case("::", 5000, true)]
    #[case("::1", 5000, true)]
    #[case("[::1]", 5000, true)]
    #[case("not-an-ip", 5000, false)]
    #[case("127.0.0.1:80", 5000, false)]
    fn test_server_socket_address(#[case] host: &str, #[case] port: u16, #[case] valid: bool) {
        let config = ServerConfig {
            host: host.to_string(),
            port,
        };
        assert_eq!(config.socket_address().is_ok(), valid);
    }

    #[rstest]
    fn test_server_socket_address_binds_ipv6_unspecified() {
        let config = ServerConfig {
            host: "::".to_string(),
            port: 5000,
        };

        let address = config.socket_address().unwrap();

        assert!(address.is_ipv6());
        assert!(address.ip().is_unspecified());
        assert_eq!(address.port(), 5000);
    }

    #[rstest]
    #[tokio::test]
    async fn test_factory_creates_in_memory_repository() {
        let config = RepositoryConfig::builder()
            .storage_mode(StorageMode::InMemory)
            .build()
            .unwrap();

        let repository = RepositoryFactory::new(config).create().await.unwrap();
        assert_eq!(repository.count().await.unwrap(), 0);
    }
}
