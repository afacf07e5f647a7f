//! Query translation
//!
//! Turns a caller's free-text string into an index query and adapts the raw
//! hits an index returns back into conferences. The string is never parsed
//! here; its grammar belongs to the index.

use chrono::{DateTime, Utc};
use futures_core::Stream;
use futures_util::StreamExt;

use crate::error::{Error, Result};

use super::entity::Conference;
use super::search_index::ConferenceStream;

/// Structured query handed to a search index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexQuery {
    clause: QueryClause,
}

/// A single clause of an index query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryClause {
    /// Query-string clause interpreted by the index's own grammar
    QueryString(String),
}

impl IndexQuery {
    /// Wrap a free-text query as a single query-string clause
    pub fn query_string(query: impl Into<String>) -> Self {
        Self {
            clause: QueryClause::QueryString(query.into()),
        }
    }

    pub fn clause(&self) -> &QueryClause {
        &self.clause
    }

    /// The raw query string, exactly as the caller supplied it
    pub fn as_str(&self) -> &str {
        match &self.clause {
            QueryClause::QueryString(query) => query,
        }
    }
}

/// A native index hit, as stored in the index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexHit {
    pub id: i64,
    pub name: String,
    /// RFC 3339 timestamp
    pub date: String,
}

impl IndexHit {
    /// Rebuild the conference carried by this hit
    pub fn into_conference(self) -> Result<Conference> {
        let date = DateTime::parse_from_rfc3339(&self.date)
            .map_err(|e| Error::Parse(format!("Invalid indexed date for {}: {}", self.id, e)))?
            .with_timezone(&Utc);

        Ok(Conference {
            id: Some(self.id),
            name: self.name,
            date,
        })
    }
}

/// Format a date the way the index stores it
pub fn index_date(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(chrono::SecondsFormat::AutoSi, true)
}

/// Adapt a stream of raw hits into a stream of conferences
pub fn translate_hits<S>(hits: S) -> ConferenceStream
where
    S: Stream<Item = Result<IndexHit>> + Send + 'static,
{
    Box::pin(hits.map(|hit| hit.and_then(IndexHit::into_conference)))
}
