//! Conference service keeping the primary store and the search index in sync
//!
//! Every mutation reaches the primary store first and the search index
//! second. An index failure never undoes a committed primary write: it is
//! logged and handed back to the caller next to the result, so the divergence
//! can be reconciled with [`ConferenceService::reindex`].

use std::sync::Arc;

use futures_util::StreamExt;
use serde::Serialize;

use super::entity::{Conference, ConferencePatch, merge};
use super::query::IndexQuery;
use super::repository_trait::ConferenceRepositoryTrait;
use super::search_index::{ConferenceSearchIndex, ConferenceStream};
use crate::error::{Error, IndexOperation, Result};
use crate::infrastructure::conference::{SqliteConferenceRepository, SqliteConferenceSearchIndex};
use crate::storage::Database;

/// Result of a mutation that committed to the primary store
#[derive(Debug)]
pub struct Synced<T> {
    /// Value produced by the primary store
    pub value: T,
    /// Set when the follow-up index write failed
    pub index_error: Option<Error>,
}

impl<T> Synced<T> {
    fn new(value: T, index_error: Option<Error>) -> Self {
        Self { value, index_error }
    }

    /// Whether the index write went through
    pub fn is_indexed(&self) -> bool {
        self.index_error.is_none()
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

/// Outcome of a full reindex
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReindexReport {
    pub indexed: usize,
    pub failed: usize,
}

/// Coordinator for conference mutations, lookups and search
#[derive(Clone)]
pub struct ConferenceService {
    repository: Arc<dyn ConferenceRepositoryTrait>,
    index: Arc<dyn ConferenceSearchIndex>,
}

impl ConferenceService {
    /// Create a service over any primary store and search index
    pub fn new(
        repository: Arc<dyn ConferenceRepositoryTrait>,
        index: Arc<dyn ConferenceSearchIndex>,
    ) -> Self {
        Self { repository, index }
    }

    /// Create a service over the SQLite primary store and FTS index
    pub fn from_databases(primary: &Database, index: &Database) -> Self {
        Self::new(
            Arc::new(SqliteConferenceRepository::new(primary.pool().clone())),
            Arc::new(SqliteConferenceSearchIndex::new(index.pool().clone())),
        )
    }

    /// Get the underlying primary store
    pub fn repository(&self) -> &Arc<dyn ConferenceRepositoryTrait> {
        &self.repository
    }

    /// Get the underlying search index
    pub fn index(&self) -> &Arc<dyn ConferenceSearchIndex> {
        &self.index
    }

    /// Store a new conference and index it
    pub async fn create(&self, conference: &Conference) -> Result<Synced<Conference>> {
        if let Some(id) = conference.id {
            return Err(Error::IdAlreadyPresent(id));
        }

        let stored = self.repository.insert(conference).await?;
        let index_error = self.index_put(&stored).await;
        Ok(Synced::new(stored, index_error))
    }

    /// Replace an existing conference wholesale and reindex it
    pub async fn update(&self, id: i64, conference: &Conference) -> Result<Synced<Conference>> {
        self.validate_target(id, conference.id).await?;

        let stored = self.replace_validated(id, conference).await?;
        let index_error = self.index_put(&stored).await;
        Ok(Synced::new(stored, index_error))
    }

    /// Merge a sparse patch onto an existing conference and reindex the result
    pub async fn partial_update(
        &self,
        id: i64,
        patch: &ConferencePatch,
    ) -> Result<Synced<Conference>> {
        self.validate_target(id, patch.id).await?;

        // The conference may have been deleted since the existence check
        let existing = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(Error::Vanished(id))?;

        let merged = merge(&existing, patch);
        let stored = self.replace_validated(id, &merged).await?;
        let index_error = self.index_put(&stored).await;
        Ok(Synced::new(stored, index_error))
    }

    /// Delete a conference from both stores. Unknown ids are not an error.
    pub async fn delete(&self, id: i64) -> Result<Synced<bool>> {
        let existed = self.repository.delete_by_id(id).await?;
        if !existed {
            tracing::debug!(id, "Delete of unknown conference");
        }

        let index_error = match self.index.delete_by_id(id).await {
            Ok(()) => None,
            Err(e) => Some(self.index_failure(IndexOperation::Delete, id, &e)),
        };
        Ok(Synced::new(existed, index_error))
    }

    /// List every conference in the primary store
    pub async fn list(&self) -> Result<Vec<Conference>> {
        self.repository.list_all().await
    }

    /// Get a conference from the primary store
    pub async fn get(&self, id: i64) -> Result<Conference> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(Error::NotFound(id))
    }

    /// Search the index. The primary store is not consulted.
    pub fn search(&self, query: &str) -> ConferenceStream {
        self.index.search(IndexQuery::query_string(query))
    }

    /// Rebuild the search index from the primary store
    pub async fn reindex(&self) -> Result<ReindexReport> {
        tracing::info!("Rebuilding conference search index");

        let conferences = self.repository.list_all().await?;
        self.index
            .clear()
            .await
            .map_err(|e| self.index_failure(IndexOperation::Clear, 0, &e))?;

        let mut report = ReindexReport::default();
        for conference in &conferences {
            match self.index_put(conference).await {
                None => report.indexed += 1,
                Some(_) => report.failed += 1,
            }
        }

        tracing::info!(
            indexed = report.indexed,
            failed = report.failed,
            "Conference search index rebuilt"
        );
        Ok(report)
    }

    /// Collect a search into memory
    pub async fn search_all(&self, query: &str) -> Result<Vec<Conference>> {
        let mut stream = self.search(query);
        let mut results = Vec::new();
        while let Some(conference) = stream.next().await {
            results.push(conference?);
        }
        Ok(results)
    }

    // ========== Private Helper Methods ==========

    /// Id checks shared by update and partial update
    async fn validate_target(&self, id: i64, body_id: Option<i64>) -> Result<()> {
        let body_id = body_id.ok_or(Error::MissingId)?;
        if body_id != id {
            return Err(Error::IdMismatch { path: id, body: body_id });
        }
        if !self.repository.exists_by_id(id).await? {
            return Err(Error::NotFound(id));
        }
        Ok(())
    }

    /// Replace a conference whose existence was already checked
    async fn replace_validated(&self, id: i64, conference: &Conference) -> Result<Conference> {
        self.repository
            .replace(id, conference)
            .await
            .map_err(|e| match e {
                Error::NotFound(id) => Error::Vanished(id),
                other => other,
            })
    }

    async fn index_put(&self, conference: &Conference) -> Option<Error> {
        match self.index.put(conference).await {
            Ok(()) => None,
            Err(e) => Some(self.index_failure(
                IndexOperation::Put,
                conference.id.unwrap_or_default(),
                &e,
            )),
        }
    }

    fn index_failure(&self, operation: IndexOperation, id: i64, source: &Error) -> Error {
        tracing::error!(
            id,
            operation = operation.as_str(),
            error = %source,
            "Search index out of sync with primary store"
        );
        Error::index_sync(operation, id, source)
    }
}
