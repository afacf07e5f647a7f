//! Storage layer - SQLite
//!
//! Provides database management and migrations for the primary store and the
//! search index.
//!
//! # Architecture
//!
//! - `database`: Connection pool management and initialization
//! - `migrations`: Schema versioning and automatic migration
//!
//! # Usage
//!
//! ```ignore
//! use conference_core::storage::{Database, Schema};
//!
//! let primary = Database::in_memory(Schema::Primary).await?;
//! let index = Database::in_memory(Schema::SearchIndex).await?;
//! ```

pub mod database;
pub mod migrations;

// Re-export commonly used types
pub use database::{
    Database, DatabaseConfig, data_dir, default_primary_path, default_search_index_path,
};
pub use migrations::{MigrationStatus, Schema, migration_status, run_migrations};
