//! Conference repository implementation
//!
//! Primary store operations on the `conferences` table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::domain::conference::{Conference, ConferenceRepositoryTrait};
use crate::error::{Error, Result};

/// SQLite-backed primary store
#[derive(Debug, Clone)]
pub struct SqliteConferenceRepository {
    pool: SqlitePool,
}

impl SqliteConferenceRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl ConferenceRepositoryTrait for SqliteConferenceRepository {
    async fn insert(&self, conference: &Conference) -> Result<Conference> {
        let result = sqlx::query("INSERT INTO conferences (name, date) VALUES (?, ?)")
            .bind(&conference.name)
            .bind(conference.date)
            .execute(&self.pool)
            .await
            .map_err(Error::DatabaseError)?;

        let id = result.last_insert_rowid();
        tracing::debug!(id, "Inserted conference");

        Ok(Conference {
            id: Some(id),
            ..conference.clone()
        })
    }

    async fn replace(&self, id: i64, conference: &Conference) -> Result<Conference> {
        let result = sqlx::query("UPDATE conferences SET name = ?, date = ? WHERE id = ?")
            .bind(&conference.name)
            .bind(conference.date)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::DatabaseError)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(id));
        }

        Ok(Conference {
            id: Some(id),
            ..conference.clone()
        })
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Conference>> {
        let row: Option<ConferenceRow> =
            sqlx::query_as("SELECT id, name, date FROM conferences WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(Error::DatabaseError)?;

        Ok(row.map(ConferenceRow::into_conference))
    }

    async fn list_all(&self) -> Result<Vec<Conference>> {
        let rows: Vec<ConferenceRow> =
            sqlx::query_as("SELECT id, name, date FROM conferences ORDER BY id")
                .fetch_all(&self.pool)
                .await
                .map_err(Error::DatabaseError)?;

        Ok(rows.into_iter().map(ConferenceRow::into_conference).collect())
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM conferences WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::DatabaseError)?;

        Ok(result.rows_affected() > 0)
    }

    async fn exists_by_id(&self, id: i64) -> Result<bool> {
        let (exists,): (i64,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM conferences WHERE id = ?)")
                .bind(id)
                .fetch_one(&self.pool)
                .await
                .map_err(Error::DatabaseError)?;

        Ok(exists != 0)
    }

    async fn count(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM conferences")
            .fetch_one(&self.pool)
            .await
            .map_err(Error::DatabaseError)?;

        Ok(count)
    }
}

/// Database row for a conference
#[derive(sqlx::FromRow)]
struct ConferenceRow {
    id: i64,
    name: String,
    date: DateTime<Utc>,
}

impl ConferenceRow {
    fn into_conference(self) -> Conference {
        Conference {
            id: Some(self.id),
            name: self.name,
            date: self.date,
        }
    }
}
