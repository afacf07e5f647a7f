//! In-memory primary store and search index
//!
//! Used as test doubles and for embedding without a database. The search
//! index counts its writes and can be told to fail them, which makes the
//! coordinator's index-failure path observable.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::domain::conference::{
    Conference, ConferenceRepositoryTrait, ConferenceSearchIndex, ConferenceStream, IndexHit,
    IndexQuery, index_date, translate_hits,
};
use crate::error::{Error, Result};

fn poisoned(operation: &str) -> Error {
    Error::Other(format!("in-memory store lock poisoned during {}", operation))
}

/// Primary store kept in a map
#[derive(Debug)]
pub struct InMemoryConferenceRepository {
    rows: RwLock<BTreeMap<i64, Conference>>,
    next_id: AtomicI64,
}

impl Default for InMemoryConferenceRepository {
    fn default() -> Self {
        Self {
            rows: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl InMemoryConferenceRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConferenceRepositoryTrait for InMemoryConferenceRepository {
    async fn insert(&self, conference: &Conference) -> Result<Conference> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let stored = Conference {
            id: Some(id),
            ..conference.clone()
        };
        self.rows
            .write()
            .map_err(|_| poisoned("insert"))?
            .insert(id, stored.clone());
        Ok(stored)
    }

    async fn replace(&self, id: i64, conference: &Conference) -> Result<Conference> {
        let mut rows = self.rows.write().map_err(|_| poisoned("replace"))?;
        let slot = rows.get_mut(&id).ok_or(Error::NotFound(id))?;
        *slot = Conference {
            id: Some(id),
            ..conference.clone()
        };
        Ok(slot.clone())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Conference>> {
        let rows = self.rows.read().map_err(|_| poisoned("find_by_id"))?;
        Ok(rows.get(&id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Conference>> {
        let rows = self.rows.read().map_err(|_| poisoned("list_all"))?;
        Ok(rows.values().cloned().collect())
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool> {
        let mut rows = self.rows.write().map_err(|_| poisoned("delete_by_id"))?;
        Ok(rows.remove(&id).is_some())
    }

    async fn exists_by_id(&self, id: i64) -> Result<bool> {
        let rows = self.rows.read().map_err(|_| poisoned("exists_by_id"))?;
        Ok(rows.contains_key(&id))
    }

    async fn count(&self) -> Result<i64> {
        let rows = self.rows.read().map_err(|_| poisoned("count"))?;
        Ok(rows.len() as i64)
    }
}

/// Primary store that confirms every id but loses the row before it is read
///
/// Stands in for a concurrent delete landing between the existence check of
/// an update and its read. Listing fails outright.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct VanishingConferenceRepository;

#[cfg(test)]
#[async_trait]
impl ConferenceRepositoryTrait for VanishingConferenceRepository {
    async fn insert(&self, _conference: &Conference) -> Result<Conference> {
        Err(Error::Other("primary store unavailable".to_string()))
    }

    async fn replace(&self, id: i64, _conference: &Conference) -> Result<Conference> {
        Err(Error::NotFound(id))
    }

    async fn find_by_id(&self, _id: i64) -> Result<Option<Conference>> {
        Ok(None)
    }

    async fn list_all(&self) -> Result<Vec<Conference>> {
        Err(Error::Other("primary store unavailable".to_string()))
    }

    async fn delete_by_id(&self, _id: i64) -> Result<bool> {
        Ok(false)
    }

    async fn exists_by_id(&self, _id: i64) -> Result<bool> {
        Ok(true)
    }

    async fn count(&self) -> Result<i64> {
        Ok(0)
    }
}

/// Search index kept in a map, with a tiny query grammar of its own
///
/// A query is a whitespace-separated list of terms; every term must match.
/// `field:value` matches a token of that field (`id`, `name` or `date`), a
/// bare `value` matches a token of any field. Matching ignores case. An empty
/// query matches everything.
#[derive(Debug, Default)]
pub struct InMemoryConferenceSearchIndex {
    entries: Arc<RwLock<BTreeMap<i64, IndexHit>>>,
    put_calls: AtomicUsize,
    delete_calls: AtomicUsize,
    fail_writes: AtomicBool,
}

impl InMemoryConferenceSearchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following write fail until switched off again
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of `put` calls received, failed ones included
    pub fn put_calls(&self) -> usize {
        self.put_calls.load(Ordering::SeqCst)
    }

    /// Number of `delete_by_id` calls received, failed ones included
    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    /// Indexed copy of a conference
    pub fn get(&self, id: i64) -> Option<Conference> {
        let entries = self.entries.read().ok()?;
        entries.get(&id).cloned()?.into_conference().ok()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_writable(&self, operation: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::Other(format!("search index unavailable for {}", operation)));
        }
        Ok(())
    }
}

#[async_trait]
impl ConferenceSearchIndex for InMemoryConferenceSearchIndex {
    async fn put(&self, conference: &Conference) -> Result<()> {
        self.put_calls.fetch_add(1, Ordering::SeqCst);
        self.check_writable("put")?;

        let id = conference
            .id
            .ok_or_else(|| Error::Other("Cannot index a conference without an id".to_string()))?;
        let hit = IndexHit {
            id,
            name: conference.name.clone(),
            date: index_date(&conference.date),
        };
        self.entries
            .write()
            .map_err(|_| poisoned("put"))?
            .insert(id, hit);
        Ok(())
    }

    async fn delete_by_id(&self, id: i64) -> Result<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.check_writable("delete")?;

        self.entries
            .write()
            .map_err(|_| poisoned("delete_by_id"))?
            .remove(&id);
        Ok(())
    }

    // Nothing is read until the stream is first polled
    fn search(&self, query: IndexQuery) -> ConferenceStream {
        let entries = Arc::clone(&self.entries);

        let hits = async_stream::stream! {
            let terms = Term::parse_all(query.as_str());
            let matched: Result<Vec<IndexHit>> = entries
                .read()
                .map(|entries| {
                    entries
                        .values()
                        .filter(|hit| terms.iter().all(|term| term.matches(hit)))
                        .cloned()
                        .collect()
                })
                .map_err(|_| poisoned("search"));

            match matched {
                Ok(matched) => {
                    for hit in matched {
                        yield Ok(hit);
                    }
                }
                Err(e) => yield Err(e),
            }
        };
        translate_hits(hits)
    }

    async fn clear(&self) -> Result<()> {
        self.check_writable("clear")?;
        self.entries.write().map_err(|_| poisoned("clear"))?.clear();
        Ok(())
    }
}

/// One term of the in-memory grammar
struct Term {
    field: Option<String>,
    value: String,
}

impl Term {
    fn parse_all(query: &str) -> Vec<Term> {
        query
            .split_whitespace()
            .map(|raw| match raw.split_once(':') {
                Some((field, value)) if matches!(field, "id" | "name" | "date") => Term {
                    field: Some(field.to_string()),
                    value: value.to_lowercase(),
                },
                _ => Term {
                    field: None,
                    value: raw.to_lowercase(),
                },
            })
            .collect()
    }

    fn matches(&self, hit: &IndexHit) -> bool {
        let id = hit.id.to_string();
        let fields = match self.field.as_deref() {
            Some("id") => vec![id.as_str()],
            Some("name") => vec![hit.name.as_str()],
            Some("date") => vec![hit.date.as_str()],
            _ => vec![id.as_str(), hit.name.as_str(), hit.date.as_str()],
        };
        fields.into_iter().any(|field| {
            field
                .to_lowercase()
                .split(|c: char| !c.is_alphanumeric())
                .any(|token| token == self.value)
        })
    }
}
