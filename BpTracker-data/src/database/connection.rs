//! Database connection module for the BP Tracker application
//!
//! Readings are stored in SQLite through an r2d2 connection pool. When the
//! configured database file cannot be opened the pool falls back to an
//! in-memory database so the server keeps accepting readings.

use std::env;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::OnceCell;
use r2d2::PooledConnection;
use r2d2_sqlite::SqliteConnectionManager;
use thiserror::Error;
use tracing::{error, info, warn};

use super::migrations::run_sqlite_migrations;

/// Global database pool used throughout the application
static DB_POOL: OnceCell<DatabasePool> = OnceCell::new();

/// Default location of the SQLite database file
pub const DEFAULT_SQLITE_PATH: &str = "./data/bp_tracker.db";

/// Supported database types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseType {
    /// SQLite database (file-based)
    Sqlite,
}

impl FromStr for DatabaseType {
    type Err = DatabaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sqlite" => Ok(DatabaseType::Sqlite),
            _ => Err(DatabaseError::UnsupportedDatabaseType(s.to_string())),
        }
    }
}

/// Database error
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// SQLite error
    #[error("SQLite error: {0}")]
    SqliteError(#[from] rusqlite::Error),

    /// SQLite connection pool error
    #[error("SQLite connection pool error: {0}")]
    SqlitePoolError(#[from] r2d2::Error),

    /// Database pool already initialized
    #[error("Database pool is already initialized")]
    PoolAlreadyInitialized,

    /// Database pool not initialized
    #[error("Database pool is not initialized")]
    PoolNotInitialized,

    /// Unsupported database type
    #[error("Unsupported database type: {0}")]
    UnsupportedDatabaseType(String),

    /// Configuration error
    #[error("Database configuration error: {0}")]
    ConfigError(String),

    /// Migration error
    #[error("Database migration error: {0}")]
    MigrationError(String),
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database type
    pub db_type: DatabaseType,
    /// Path to SQLite database file
    pub sqlite_path: Option<String>,
    /// Maximum number of pooled connections
    pub max_connections: u32,
    /// Connection timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            db_type: DatabaseType::Sqlite,
            sqlite_path: Some(DEFAULT_SQLITE_PATH.to_string()),
            max_connections: 10,
            timeout_seconds: 30,
        }
    }
}

impl DatabaseConfig {
    /// Create a new database configuration from environment variables
    pub fn from_env() -> Result<Self, DatabaseError> {
        let db_type = env::var("DB_TYPE")
            .unwrap_or_else(|_| "sqlite".to_string())
            .parse::<DatabaseType>()?;

        let sqlite_path = env::var("DB_SQLITE_PATH").ok();
        match sqlite_path {
            Some(ref path) => info!("Using SQLite database at: {}", path),
            None => info!("No DB_SQLITE_PATH provided, will use default path: {}", DEFAULT_SQLITE_PATH),
        }

        let max_connections = parse_env("DB_MAX_CONNECTIONS", 10u32)?;
        if max_connections == 0 {
            return Err(DatabaseError::ConfigError(
                "DB_MAX_CONNECTIONS must be at least 1".to_string(),
            ));
        }
        let timeout_seconds = parse_env("DB_TIMEOUT_SECONDS", 30u64)?;

        info!("Database configuration: max_connections={}, timeout={}s",
            max_connections, timeout_seconds);

        Ok(DatabaseConfig {
            db_type,
            sqlite_path: sqlite_path.or_else(|| Some(DEFAULT_SQLITE_PATH.to_string())),
            max_connections,
            timeout_seconds,
        })
    }
}

/// Read an optional numeric environment variable
fn parse_env<T: FromStr>(name: &str, default: T) -> Result<T, DatabaseError> {
    match env::var(name) {
        Ok(value) => value.trim().parse::<T>().map_err(|_| {
            DatabaseError::ConfigError(format!("{} must be a number, got '{}'", name, value))
        }),
        Err(_) => Ok(default),
    }
}

/// Pool of SQLite connections with the schema already migrated
#[derive(Clone)]
pub struct DatabasePool {
    pool: Arc<r2d2::Pool<SqliteConnectionManager>>,
    in_memory: bool,
}

impl fmt::Debug for DatabasePool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabasePool")
            .field("in_memory", &self.in_memory)
            .field("connections", &self.pool.state().connections)
            .finish()
    }
}

impl DatabasePool {
    /// Open the configured SQLite file, falling back to an in-memory database
    pub fn open(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        use rusqlite::OpenFlags;
        use std::fs;
        use std::path::Path;

        let sqlite_path = config.sqlite_path.clone()
            .unwrap_or_else(|| DEFAULT_SQLITE_PATH.to_string());

        info!("Initializing SQLite database at: {}", sqlite_path);

        if let Some(parent) = Path::new(&sqlite_path).parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                info!("Creating parent directory: {:?}", parent);
                if let Err(e) = fs::create_dir_all(parent) {
                    warn!("Failed to create directory: {}, falling back to in-memory database", e);
                    return Self::in_memory(config);
                }
            }
        }

        let manager = SqliteConnectionManager::file(&sqlite_path)
            .with_flags(OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE);

        let pool = match r2d2::Pool::builder()
            .max_size(config.max_connections)
            .connection_timeout(Duration::from_secs(config.timeout_seconds))
            .build(manager)
        {
            Ok(pool) => pool,
            Err(e) => {
                error!("Failed to create SQLite connection pool: {}", e);
                warn!("Falling back to in-memory SQLite database");
                return Self::in_memory(config);
            }
        };

        let pool = Self { pool: Arc::new(pool), in_memory: false };
        pool.migrate()?;

        info!("SQLite connection pool created successfully");
        Ok(pool)
    }

    /// Create an in-memory SQLite database.
    ///
    /// Every in-memory connection is its own database, so the pool holds a
    /// single connection.
    pub fn in_memory(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        info!("Initializing in-memory SQLite database");

        let pool = r2d2::Pool::builder()
            .max_size(1)
            .connection_timeout(Duration::from_secs(config.timeout_seconds))
            .build(SqliteConnectionManager::memory())?;

        let pool = Self { pool: Arc::new(pool), in_memory: true };
        pool.migrate()?;

        info!("In-memory SQLite database initialized successfully");
        Ok(pool)
    }

    /// Check out a connection from the pool
    pub fn connection(&self) -> Result<PooledConnection<SqliteConnectionManager>, DatabaseError> {
        Ok(self.pool.get()?)
    }

    /// Whether this pool is backed by an in-memory database
    pub fn is_in_memory(&self) -> bool {
        self.in_memory
    }

    /// Human readable description of the database and pool state
    pub fn describe(&self) -> String {
        let location = if self.in_memory {
            "SQLite in-memory database".to_string()
        } else {
            self.connection()
                .ok()
                .and_then(|conn| {
                    conn.query_row("PRAGMA database_list", [], |row| row.get::<_, String>(2)).ok()
                })
                .map(|path| format!("SQLite database at {}", path))
                .unwrap_or_else(|| "SQLite database (path unknown)".to_string())
        };

        let state = self.pool.state();
        format!("{} (connections: active={}, idle={})",
            location, state.connections, state.idle_connections)
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        let conn = self.connection()?;
        run_sqlite_migrations(&conn).map_err(DatabaseError::MigrationError)
    }
}

/// Initialize the global database pool from environment configuration
pub fn initialize_database_pool() -> Result<(), DatabaseError> {
    let config = DatabaseConfig::from_env()?;
    initialize_database_pool_with(&config)
}

/// Initialize the global database pool from an explicit configuration
pub fn initialize_database_pool_with(config: &DatabaseConfig) -> Result<(), DatabaseError> {
    if DB_POOL.get().is_some() {
        return Err(DatabaseError::PoolAlreadyInitialized);
    }

    info!("Initializing database pool with type: {:?}", config.db_type);
    let pool = DatabasePool::open(config)?;

    DB_POOL.set(pool).map_err(|_| DatabaseError::PoolAlreadyInitialized)
}

/// Get the database connection pool
pub fn get_db_pool() -> Result<DatabasePool, DatabaseError> {
    DB_POOL.get()
        .cloned()
        .ok_or(DatabaseError::PoolNotInitialized)
}

/// Get information about the current database connection
pub fn get_connection_info() -> Option<String> {
    let pool = DB_POOL.get()?;

    match pool.connection() {
        Ok(_) => Some(pool.describe()),
        Err(e) => {
            error!("Failed to get SQLite connection: {}", e);
            Some(format!("SQLite connection error: {}", e))
        }
    }
}
