//! Error types for conference records

use thiserror::Error;

/// Result type alias using the conference Error
pub type Result<T> = std::result::Result<T, Error>;

/// Which search index write failed after the primary store committed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexOperation {
    Put,
    Delete,
    Clear,
}

impl IndexOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Put => "put",
            Self::Delete => "delete",
            Self::Clear => "clear",
        }
    }
}

impl std::fmt::Display for IndexOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse classification used by the resource layer to pick a status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    IndexSync,
    Query,
    Storage,
    Config,
    Internal,
}

/// Conference error types with helpful messages and suggestions
#[derive(Error, Debug)]
pub enum Error {
    // Validation errors (E001-E099)
    #[error("A new conference cannot already have an ID (got {0})")]
    IdAlreadyPresent(i64),

    #[error("Invalid id: the conference body carries no id")]
    MissingId,

    #[error("Invalid ID: path id {path} does not match body id {body}")]
    IdMismatch { path: i64, body: i64 },

    // Lookup errors (E100-E199)
    #[error("Conference {0} not found. Run `conference list` to see all conferences.")]
    NotFound(i64),

    #[error("Conference {0} was deleted before the update could be applied")]
    Vanished(i64),

    // Search index errors (E200-E299)
    #[error("Search index {operation} failed for conference {id}: {reason}")]
    IndexSync {
        operation: IndexOperation,
        id: i64,
        reason: String,
    },

    #[error("Search query rejected by the index: {0}")]
    InvalidQuery(String),

    // Database errors (E400-E499)
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    // Config errors (E600-E699)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    // Generic errors
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Get error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            Self::IdAlreadyPresent(_) => "E001",
            Self::MissingId => "E002",
            Self::IdMismatch { .. } => "E003",
            Self::NotFound(_) => "E100",
            Self::Vanished(_) => "E101",
            Self::IndexSync { .. } => "E200",
            Self::InvalidQuery(_) => "E201",
            Self::DatabaseError(_) => "E400",
            Self::Parse(_) => "E401",
            Self::ConfigError(_) => "E600",
            Self::Other(_) | Self::Io(_) => "E9999",
        }
    }

    /// Coarse kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::IdAlreadyPresent(_) | Self::MissingId | Self::IdMismatch { .. } => {
                ErrorKind::Validation
            }
            Self::NotFound(_) | Self::Vanished(_) => ErrorKind::NotFound,
            Self::IndexSync { .. } => ErrorKind::IndexSync,
            Self::InvalidQuery(_) => ErrorKind::Query,
            Self::DatabaseError(_) | Self::Parse(_) => ErrorKind::Storage,
            Self::ConfigError(_) => ErrorKind::Config,
            Self::Other(_) | Self::Io(_) => ErrorKind::Internal,
        }
    }

    /// Reason key reported alongside a rejected request
    pub fn error_key(&self) -> &'static str {
        match self {
            Self::IdAlreadyPresent(_) => "idexists",
            Self::MissingId => "idnull",
            Self::IdMismatch { .. } => "idinvalid",
            Self::NotFound(_) | Self::Vanished(_) => "notfound",
            Self::InvalidQuery(_) => "badquery",
            _ => "internal",
        }
    }

    /// Get suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::IdAlreadyPresent(_) => Some("Omit the id; the store assigns one".to_string()),
            Self::MissingId => Some("Include the id of the conference in the body".to_string()),
            Self::IdMismatch { path, .. } => Some(format!("Set the body id to {}", path)),
            Self::NotFound(_) | Self::Vanished(_) => Some("conference list".to_string()),
            Self::IndexSync { .. } => Some("conference reindex".to_string()),
            _ => None,
        }
    }

    /// Wrap a failed index write into an `IndexSync` error
    pub fn index_sync(operation: IndexOperation, id: i64, source: &Error) -> Self {
        Self::IndexSync {
            operation,
            id,
            reason: source.to_string(),
        }
    }
}
