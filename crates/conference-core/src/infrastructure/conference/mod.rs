//! Conference storage backends
//!
//! - SQLite primary store and FTS5 search index (separate databases)
//! - In-memory primary store and search index

mod in_memory;
mod repository;
mod search_index;

pub use in_memory::{InMemoryConferenceRepository, InMemoryConferenceSearchIndex};
#[cfg(test)]
pub(crate) use in_memory::VanishingConferenceRepository;
pub use repository::SqliteConferenceRepository;
pub use search_index::SqliteConferenceSearchIndex;
