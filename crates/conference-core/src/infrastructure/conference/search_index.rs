//! FTS5 search index for conferences
//!
//! Lives in its own SQLite database. Each entry's rowid is the conference
//! id and its columns carry the full record, so hits can be turned back into
//! conferences without reading the primary store.

use async_trait::async_trait;
use futures_util::TryStreamExt;
use sqlx::SqlitePool;

use crate::domain::conference::{
    Conference, ConferenceSearchIndex, ConferenceStream, IndexHit, IndexQuery, index_date,
    translate_hits,
};
use crate::error::{Error, Result};

/// SQLite FTS5-backed search index
#[derive(Debug, Clone)]
pub struct SqliteConferenceSearchIndex {
    pool: SqlitePool,
}

impl SqliteConferenceSearchIndex {
    /// Create a new index with the given connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Number of indexed conferences
    pub async fn len(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM conferences_fts")
            .fetch_one(&self.pool)
            .await
            .map_err(Error::DatabaseError)?;
        Ok(count)
    }

    pub async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }
}

#[async_trait]
impl ConferenceSearchIndex for SqliteConferenceSearchIndex {
    async fn put(&self, conference: &Conference) -> Result<()> {
        let id = conference
            .id
            .ok_or_else(|| Error::Other("Cannot index a conference without an id".to_string()))?;

        // FTS5 has no upsert
        let mut tx = self.pool.begin().await.map_err(Error::DatabaseError)?;
        sqlx::query("DELETE FROM conferences_fts WHERE rowid = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(Error::DatabaseError)?;
        sqlx::query("INSERT INTO conferences_fts (rowid, id, name, date) VALUES (?, ?, ?, ?)")
            .bind(id)
            .bind(id.to_string())
            .bind(&conference.name)
            .bind(index_date(&conference.date))
            .execute(&mut *tx)
            .await
            .map_err(Error::DatabaseError)?;
        tx.commit().await.map_err(Error::DatabaseError)?;

        Ok(())
    }

    async fn delete_by_id(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM conferences_fts WHERE rowid = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::DatabaseError)?;
        Ok(())
    }

    fn search(&self, query: IndexQuery) -> ConferenceStream {
        let pool = self.pool.clone();

        let hits = async_stream::stream! {
            let mut rows = sqlx::query_as::<_, HitRow>(
                r#"
                SELECT rowid AS id, name, date
                FROM conferences_fts
                WHERE conferences_fts MATCH ?
                ORDER BY rank
                "#,
            )
            .bind(query.as_str())
            .fetch(&pool);

            loop {
                match rows.try_next().await {
                    Ok(Some(row)) => yield Ok(row.into_hit()),
                    Ok(None) => break,
                    Err(e) => {
                        yield Err(query_error(e));
                        break;
                    }
                }
            }
        };

        translate_hits(hits)
    }

    async fn clear(&self) -> Result<()> {
        sqlx::query("DELETE FROM conferences_fts")
            .execute(&self.pool)
            .await
            .map_err(Error::DatabaseError)?;
        Ok(())
    }
}

/// Messages FTS5 uses when it cannot parse a MATCH expression
const QUERY_PARSE_ERRORS: &[&str] = &[
    "fts5:",
    "syntax error",
    "unterminated string",
    "no such column",
];

fn is_query_parse_error(message: &str) -> bool {
    QUERY_PARSE_ERRORS
        .iter()
        .any(|marker| message.contains(marker))
}

/// Only parse errors are the caller's fault; a missing table, a locked
/// database or an I/O failure stays a storage error
fn query_error(e: sqlx::Error) -> Error {
    match e {
        sqlx::Error::Database(db) if is_query_parse_error(db.message()) => {
            Error::InvalidQuery(db.message().to_string())
        }
        other => Error::DatabaseError(other),
    }
}

/// Database row for an index hit
#[derive(sqlx::FromRow)]
struct HitRow {
    id: i64,
    name: String,
    date: String,
}

impl HitRow {
    fn into_hit(self) -> IndexHit {
        IndexHit {
            id: self.id,
            name: self.name,
            date: self.date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Database, DatabaseConfig, Schema};
    use chrono::{TimeZone, Utc};
    use futures_util::StreamExt;

    async fn create_index() -> SqliteConferenceSearchIndex {
        let db = Database::in_memory(Schema::SearchIndex)
            .await
            .expect("Failed to create test database");
        SqliteConferenceSearchIndex::new(db.pool().clone())
    }

    fn conference(id: i64, name: &str) -> Conference {
        Conference::new(name, Utc.timestamp_millis_opt(0).unwrap()).with_id(id)
    }

    async fn search(index: &SqliteConferenceSearchIndex, query: &str) -> Result<Vec<Conference>> {
        index
            .search(IndexQuery::query_string(query))
            .try_collect()
            .await
    }

    #[tokio::test]
    async fn test_put_and_search_by_name() {
        let index = create_index().await;
        index.put(&conference(1, "RustConf")).await.unwrap();
        index.put(&conference(2, "EuroRust")).await.unwrap();

        let hits = search(&index, "rustconf").await.unwrap();
        assert_eq!(hits, vec![conference(1, "RustConf")]);

        let hits = search(&index, "name:eurorust").await.unwrap();
        assert_eq!(hits, vec![conference(2, "EuroRust")]);
    }

    #[tokio::test]
    async fn test_search_by_id_column() {
        let index = create_index().await;
        index.put(&conference(1, "Conf 12")).await.unwrap();
        index.put(&conference(12, "Other")).await.unwrap();

        let hits = search(&index, "id:12").await.unwrap();
        assert_eq!(hits, vec![conference(12, "Other")]);
    }

    #[tokio::test]
    async fn test_put_replaces_previous_entry() {
        let index = create_index().await;
        index.put(&conference(1, "Before")).await.unwrap();
        index.put(&conference(1, "After")).await.unwrap();

        assert_eq!(index.len().await.unwrap(), 1);
        assert!(search(&index, "before").await.unwrap().is_empty());
        assert_eq!(search(&index, "after").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_put_without_id_fails() {
        let index = create_index().await;
        let unsaved = Conference::new("x", Utc.timestamp_millis_opt(0).unwrap());
        assert!(index.put(&unsaved).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_and_clear() {
        let index = create_index().await;
        index.put(&conference(1, "One")).await.unwrap();
        index.put(&conference(2, "Two")).await.unwrap();

        index.delete_by_id(1).await.unwrap();
        index.delete_by_id(1).await.unwrap();
        assert!(search(&index, "id:1").await.unwrap().is_empty());

        index.clear().await.unwrap();
        assert!(index.is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn test_malformed_query_is_rejected_by_index() {
        let index = create_index().await;
        index.put(&conference(1, "One")).await.unwrap();

        let mut stream = index.search(IndexQuery::query_string("name:\"unterminated"));
        let first = stream.next().await.expect("error item");
        assert!(matches!(first, Err(Error::InvalidQuery(_))));
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_missing_table_is_a_storage_error() {
        let db = Database::new(DatabaseConfig::in_memory(Schema::SearchIndex).no_migrate())
            .await
            .expect("Failed to create test database");
        let index = SqliteConferenceSearchIndex::new(db.pool().clone());

        let err = search(&index, "anything").await.unwrap_err();
        assert!(matches!(err, Error::DatabaseError(_)), "{err:?}");
        assert_eq!(err.kind(), crate::error::ErrorKind::Storage);
    }

    #[test]
    fn test_query_parse_error_messages() {
        assert!(is_query_parse_error("fts5: syntax error near \"\""));
        assert!(is_query_parse_error("unterminated string"));
        assert!(!is_query_parse_error("no such table: conferences_fts"));
        assert!(!is_query_parse_error("database is locked"));
    }

    #[tokio::test]
    async fn test_stream_is_lazy() {
        let index = create_index().await;
        let stream = index.search(IndexQuery::query_string("one"));

        // Nothing has run yet; writes issued before polling are visible
        index.put(&conference(1, "One")).await.unwrap();
        let hits: Vec<Conference> = stream.try_collect().await.unwrap();
        assert_eq!(hits.len(), 1);
    }
}
