//! Repository trait for conference persistence
//!
//! This module defines the primary store capability. The primary store is
//! authoritative: it assigns ids and decides whether a conference exists.
//! The trait abstracts over different storage backends (SQLite, in-memory).

use async_trait::async_trait;

use crate::error::Result;

use super::entity::Conference;

/// Primary store for conferences
#[async_trait]
pub trait ConferenceRepositoryTrait: Send + Sync {
    /// Insert a new conference, returning it with the id the store assigned
    async fn insert(&self, conference: &Conference) -> Result<Conference>;

    /// Replace the stored conference with the given id
    ///
    /// Fails with `Error::NotFound` if no such conference exists.
    async fn replace(&self, id: i64, conference: &Conference) -> Result<Conference>;

    /// Get a conference by id
    async fn find_by_id(&self, id: i64) -> Result<Option<Conference>>;

    /// List every conference in store order
    async fn list_all(&self) -> Result<Vec<Conference>>;

    /// Delete a conference by id. Returns true if it existed.
    async fn delete_by_id(&self, id: i64) -> Result<bool>;

    /// Check whether a conference with this id exists
    async fn exists_by_id(&self, id: i64) -> Result<bool>;

    /// Count stored conferences
    async fn count(&self) -> Result<i64>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Verify trait is object-safe
    fn _assert_object_safe(_: &dyn ConferenceRepositoryTrait) {}
}
