//! Database migrations
//!
//! The primary store and the search index live in separate SQLite databases,
//! each with its own versioned schema. Migrations are applied automatically on
//! database connection.

use sqlx::SqlitePool;

/// Which schema a database carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schema {
    /// Authoritative conference rows
    Primary,
    /// FTS5 index mirroring the primary rows
    SearchIndex,
}

impl Schema {
    fn migrations(&self) -> &'static [Migration] {
        match self {
            Self::Primary => PRIMARY_MIGRATIONS,
            Self::SearchIndex => SEARCH_INDEX_MIGRATIONS,
        }
    }

    /// Latest schema version
    pub fn current_version(&self) -> i32 {
        self.migrations().last().map(|m| m.version).unwrap_or(0)
    }
}

struct Migration {
    version: i32,
    description: &'static str,
    sql: &'static str,
}

/// SQL for creating the migrations tracking table
const CREATE_MIGRATIONS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS _migrations (
        version INTEGER PRIMARY KEY NOT NULL,
        applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    );
"#;

/// Primary v1: conferences table
const PRIMARY_V1: &str = r#"
    CREATE TABLE IF NOT EXISTS conferences (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        date TIMESTAMP NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_conferences_name ON conferences(name);
"#;

/// Search index v1: FTS5 table keyed by conference id (rowid)
const SEARCH_INDEX_V1: &str = r#"
    CREATE VIRTUAL TABLE IF NOT EXISTS conferences_fts USING fts5(
        id, name, date,
        tokenize = 'unicode61'
    );
"#;

const PRIMARY_MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    description: "Conferences table",
    sql: PRIMARY_V1,
}];

const SEARCH_INDEX_MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    description: "Conference full-text index",
    sql: SEARCH_INDEX_V1,
}];

async fn ensure_migrations_table(pool: &SqlitePool) -> anyhow::Result<()> {
    sqlx::raw_sql(CREATE_MIGRATIONS_TABLE).execute(pool).await?;
    Ok(())
}

async fn get_current_version(pool: &SqlitePool) -> anyhow::Result<i32> {
    ensure_migrations_table(pool).await?;

    let (version,): (i32,) =
        sqlx::query_as("SELECT COALESCE(MAX(version), 0) FROM _migrations")
            .fetch_one(pool)
            .await?;

    Ok(version)
}

async fn record_migration(pool: &SqlitePool, version: i32) -> anyhow::Result<()> {
    sqlx::query("INSERT INTO _migrations (version) VALUES (?)")
        .bind(version)
        .execute(pool)
        .await?;
    Ok(())
}

/// Run all pending migrations for a schema
pub async fn run_migrations(pool: &SqlitePool, schema: Schema) -> anyhow::Result<()> {
    let current_version = get_current_version(pool).await?;
    let target_version = schema.current_version();

    tracing::info!(
        ?schema,
        current_version = current_version,
        target_version = target_version,
        "Checking database migrations"
    );

    if current_version >= target_version {
        tracing::debug!(?schema, "Database is up to date");
        return Ok(());
    }

    for migration in schema.migrations() {
        if migration.version <= current_version {
            continue;
        }
        tracing::info!(
            ?schema,
            version = migration.version,
            "Applying migration: {}",
            migration.description
        );
        sqlx::raw_sql(migration.sql).execute(pool).await?;
        record_migration(pool, migration.version).await?;
    }

    tracing::info!(?schema, "Database migrations completed");
    Ok(())
}

/// Get migration status information
pub async fn migration_status(pool: &SqlitePool, schema: Schema) -> anyhow::Result<MigrationStatus> {
    let current_version = get_current_version(pool).await?;
    let target_version = schema.current_version();
    Ok(MigrationStatus {
        current_version,
        target_version,
        needs_migration: current_version < target_version,
    })
}

/// Migration status information
#[derive(Debug, Clone)]
pub struct MigrationStatus {
    /// Current schema version in the database
    pub current_version: i32,
    /// Target schema version (latest)
    pub target_version: i32,
    /// Whether migrations need to be run
    pub needs_migration: bool,
}
