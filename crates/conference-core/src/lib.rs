//! Conference Core Library
//!
//! This crate keeps conference records in sync between two stores:
//! - Primary store (SQLite, source of truth, assigns ids)
//! - Search index (SQLite FTS5 in its own database, derived view)
//! - Sync coordinator, partial-update merge and query translation
//! - REST-shaped resource layer with alert headers
//! - Configuration and storage bootstrap

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod storage;

pub use error::{Error, ErrorKind, IndexOperation, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::api::{ApiError, ApiResponse, ConferenceResource, StatusCode};
    pub use crate::config::Config;
    pub use crate::domain::conference::{Conference, ConferencePatch, ConferenceService};
    pub use crate::error::{Error, Result};
}

#[cfg(test)]
mod config_tests;
