//! Conference domain module
//!
//! Keeps conferences consistent between an authoritative primary store and a
//! derived full-text search index.
//!
//! # Architecture
//!
//! - **Entity**: `Conference`, `ConferencePatch` and the `merge` rule
//! - **Capabilities**: `ConferenceRepositoryTrait` (primary store) and
//!   `ConferenceSearchIndex` (search index)
//! - **Query translation**: `IndexQuery` and `IndexHit`
//! - **Service**: `ConferenceService`, the coordinator that orders every write
//!   primary-first, index-second
//!
//! # Example
//!
//! ```ignore
//! use conference_core::domain::conference::{Conference, ConferenceService};
//! use conference_core::storage::{Database, Schema};
//!
//! let primary = Database::in_memory(Schema::Primary).await?;
//! let index = Database::in_memory(Schema::SearchIndex).await?;
//! let service = ConferenceService::from_databases(&primary, &index);
//!
//! let created = service.create(&Conference::new("RustConf", date)).await?.into_value();
//! let hits = service.search_all("name:rustconf").await?;
//! ```

pub mod entity;
pub mod query;
pub mod repository_trait;
pub mod search_index;
pub mod service;

// Re-export main types
pub use entity::{Conference, ConferencePatch, merge};
pub use query::{IndexHit, IndexQuery, QueryClause, index_date, translate_hits};
pub use repository_trait::ConferenceRepositoryTrait;
pub use search_index::{ConferenceSearchIndex, ConferenceStream};
pub use service::{ConferenceService, ReindexReport, Synced};
