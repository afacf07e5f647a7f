//! Search index capability
//!
//! The search index is a derived view of the primary store. It is written
//! after the primary store and may lag behind it; it is never consulted to
//! decide whether a conference exists.

use std::pin::Pin;

use async_trait::async_trait;
use futures_core::Stream;

use crate::error::Result;

use super::entity::Conference;
use super::query::IndexQuery;

/// Lazy, one-shot sequence of conferences produced by a search
///
/// Polling it drives the underlying index query. Running the same search
/// again requires asking the index again.
pub type ConferenceStream = Pin<Box<dyn Stream<Item = Result<Conference>> + Send>>;

/// Full-text search index for conferences
#[async_trait]
pub trait ConferenceSearchIndex: Send + Sync {
    /// Write the full conference into the index, replacing any previous entry
    async fn put(&self, conference: &Conference) -> Result<()>;

    /// Remove a conference from the index. Missing entries are not an error.
    async fn delete_by_id(&self, id: i64) -> Result<()>;

    /// Run a query against the index
    ///
    /// The query grammar belongs to the index implementation.
    fn search(&self, query: IndexQuery) -> ConferenceStream;

    /// Drop every entry from the index
    async fn clear(&self) -> Result<()>;
}
