//! SQLite database operations
//!
//! Provides connection pool management and database initialization for both
//! the primary store and the search index.

use crate::storage::migrations::{self, Schema};
use anyhow::{Context, Result};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Default maximum connections in the pool
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

const IN_MEMORY: &str = ":memory:";

/// Database configuration options
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file
    pub path: PathBuf,
    /// Schema carried by this database
    pub schema: Schema,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Whether to run migrations automatically
    pub auto_migrate: bool,
    /// Journal mode (default: WAL for better concurrency)
    pub journal_mode: SqliteJournalMode,
    /// Synchronous mode (default: NORMAL for balance of safety/performance)
    pub synchronous: SqliteSynchronous,
}

impl DatabaseConfig {
    /// Create a new database config with the specified path
    pub fn with_path(path: impl Into<PathBuf>, schema: Schema) -> Self {
        Self {
            path: path.into(),
            schema,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            auto_migrate: true,
            journal_mode: SqliteJournalMode::Wal,
            synchronous: SqliteSynchronous::Normal,
        }
    }

    /// Primary store at its default location
    pub fn primary() -> Self {
        Self::with_path(default_primary_path(), Schema::Primary)
    }

    /// Search index at its default location
    pub fn search_index() -> Self {
        Self::with_path(default_search_index_path(), Schema::SearchIndex)
    }

    /// Create a config for an in-memory database (useful for testing)
    pub fn in_memory(schema: Schema) -> Self {
        Self {
            max_connections: 1, // In-memory requires single connection
            ..Self::with_path(IN_MEMORY, schema)
        }
    }

    /// Set the maximum number of connections
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Disable automatic migrations
    pub fn no_migrate(mut self) -> Self {
        self.auto_migrate = false;
        self
    }

    fn is_in_memory(&self) -> bool {
        self.path.to_string_lossy() == IN_MEMORY
    }
}

/// Directory holding the database files
///
/// `CONFERENCE_DATA_DIR` overrides the platform data directory.
pub fn data_dir() -> PathBuf {
    if let Ok(custom_dir) = env::var("CONFERENCE_DATA_DIR") {
        return PathBuf::from(custom_dir);
    }
    match dirs::data_dir() {
        Some(dir) => dir.join("conference"),
        None => PathBuf::from("."),
    }
}

/// Get the default primary store path
pub fn default_primary_path() -> PathBuf {
    data_dir().join("conferences.db")
}

/// Get the default search index path
pub fn default_search_index_path() -> PathBuf {
    data_dir().join("conferences-search.db")
}

/// Database connection pool wrapper
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
    config: DatabaseConfig,
}

impl Database {
    /// Create a new database connection with the given configuration
    pub async fn new(config: DatabaseConfig) -> Result<Self> {
        // Ensure the directory exists
        if let Some(parent) = config.path.parent()
            && !config.is_in_memory()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create database directory: {:?}", parent))?;
        }

        let connection_str = if config.is_in_memory() {
            "sqlite::memory:".to_string()
        } else {
            format!("sqlite:{}?mode=rwc", config.path.display())
        };

        let connect_options = SqliteConnectOptions::from_str(&connection_str)?
            .journal_mode(config.journal_mode)
            .synchronous(config.synchronous)
            .create_if_missing(true);

        let mut pool_options = SqlitePoolOptions::new().max_connections(config.max_connections);
        if config.is_in_memory() {
            // The database vanishes with its only connection
            pool_options = pool_options.idle_timeout(None).max_lifetime(None);
        }

        let pool = pool_options
            .connect_with(connect_options)
            .await
            .with_context(|| format!("Failed to connect to database: {:?}", config.path))?;

        let db = Self {
            pool,
            config: config.clone(),
        };

        if config.auto_migrate {
            db.migrate().await?;
        }

        Ok(db)
    }

    /// Open the primary store with default configuration
    pub async fn primary() -> Result<Self> {
        Self::new(DatabaseConfig::primary()).await
    }

    /// Open the search index with default configuration
    pub async fn search_index() -> Result<Self> {
        Self::new(DatabaseConfig::search_index()).await
    }

    /// Create an in-memory database (useful for testing)
    pub async fn in_memory(schema: Schema) -> Result<Self> {
        Self::new(DatabaseConfig::in_memory(schema)).await
    }

    /// Get the underlying connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Get the database configuration
    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// Run database migrations
    pub async fn migrate(&self) -> Result<()> {
        migrations::run_migrations(&self.pool, self.config.schema)
            .await
            .context("Failed to run database migrations")
    }

    /// Check migration status
    pub async fn migration_status(&self) -> Result<migrations::MigrationStatus> {
        migrations::migration_status(&self.pool, self.config.schema)
            .await
            .context("Failed to check migration status")
    }

    /// Check if database is healthy
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("Database health check failed")?;
        Ok(())
    }

    /// Close the database connection pool
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Get the database file path
    pub fn path(&self) -> &Path {
        &self.config.path
    }
}
