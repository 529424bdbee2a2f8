//! Direct `PostgreSQL` lead store backed by the shared SQLx pool.

use std::future::Future;
use std::time::Duration;

use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use super::{Lead, LeadStore, NewLead, StoreError, UNIQUE_VIOLATION};

type LeadTuple = (Uuid, String, String, OffsetDateTime);

// Table name is spelled out literally; it must match `LEADS_TABLE`.
const LIST_SQL: &str = "SELECT id, keyword, reply, created_at FROM auto_replies ORDER BY created_at ASC, id ASC";
const GET_SQL: &str = "SELECT id, keyword, reply, created_at FROM auto_replies WHERE id = $1";
const INSERT_SQL: &str = "INSERT INTO auto_replies (id, keyword, reply)
     VALUES ($1, $2, $3)
     RETURNING id, keyword, reply, created_at";

pub struct PgLeadStore {
    pool: PgPool,
    timeout: Duration,
}

impl PgLeadStore {
    #[must_use]
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    async fn bounded<T, F>(&self, query: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        tokio::time::timeout(self.timeout, query)
            .await
            .map_err(|_| StoreError::Timeout)?
            .map_err(map_db_error)
    }
}

#[async_trait::async_trait]
impl LeadStore for PgLeadStore {
    async fn list_leads(&self) -> Result<Vec<Lead>, StoreError> {
        let rows = self
            .bounded(sqlx::query_as::<_, LeadTuple>(LIST_SQL).fetch_all(&self.pool))
            .await?;
        Ok(rows.into_iter().map(to_lead).collect())
    }

    async fn get_lead(&self, id: Uuid) -> Result<Option<Lead>, StoreError> {
        let row = self
            .bounded(
                sqlx::query_as::<_, LeadTuple>(GET_SQL)
                    .bind(id)
                    .fetch_optional(&self.pool),
            )
            .await?;
        Ok(row.map(to_lead))
    }

    async fn insert_lead(&self, lead: &NewLead) -> Result<Lead, StoreError> {
        let row = self
            .bounded(
                sqlx::query_as::<_, LeadTuple>(INSERT_SQL)
                    .bind(Uuid::new_v4())
                    .bind(&lead.keyword)
                    .bind(&lead.reply)
                    .fetch_one(&self.pool),
            )
            .await?;
        Ok(to_lead(row))
    }
}

fn to_lead((id, keyword, reply, created_at): LeadTuple) -> Lead {
    Lead { id, keyword, reply, created_at }
}

fn map_db_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.code().as_deref() == Some(UNIQUE_VIOLATION) {
            return StoreError::Conflict(db.message().to_string());
        }
    }
    StoreError::Database(err)
}

#[cfg(test)]
#[path = "postgres_test.rs"]
mod tests;
