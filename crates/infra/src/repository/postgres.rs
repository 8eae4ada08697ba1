//! Postgres-backed document repository.
//!
//! Every collection lives in one `documents` table keyed by
//! `(collection, id)`, with the record serialized into a JSONB `body`.
//! Filters compile to `body -> field = value` comparisons.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | RepositoryError |
//! |------------|----------------------|-----------------|
//! | Database (unique violation) | `23505` | `Duplicate` |
//! | Database (other) | Any other | `Storage` |
//! | PoolClosed / PoolTimedOut / Io | N/A | `Unavailable` |
//! | Other | N/A | `Storage` |

use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::Value as JsonValue;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use tracing::{instrument, Span};
use uuid::Uuid;

use super::{Filter, Record, Repository, RepositoryError, UpdateResult};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    collection TEXT NOT NULL,
    id UUID NOT NULL,
    body JSONB NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ,
    PRIMARY KEY (collection, id)
)
"#;

/// Open a connection pool.
pub async fn connect(database_url: &str) -> Result<PgPool, RepositoryError> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .map_err(|e| map_sqlx_error("connect", e))
}

/// Create the `documents` table when missing. Idempotent.
#[instrument(skip(pool), err)]
pub async fn ensure_schema(pool: &PgPool) -> Result<(), RepositoryError> {
    sqlx::query(SCHEMA)
        .execute(pool)
        .await
        .map_err(|e| map_sqlx_error("ensure_schema", e))?;
    Ok(())
}

/// Repository over one collection of the `documents` table.
#[derive(Debug)]
pub struct PostgresRepository<R> {
    pool: Arc<PgPool>,
    _record: PhantomData<fn() -> R>,
}

impl<R> Clone for PostgresRepository<R> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _record: PhantomData,
        }
    }
}

impl<R: Record> PostgresRepository<R> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
            _record: PhantomData,
        }
    }

    fn select(filter: &Filter, columns: &str, lock: bool, limit: Option<i64>) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new(format!("SELECT {columns} FROM documents WHERE collection = "));
        qb.push_bind(R::COLLECTION);

        for (field, value) in filter.conditions() {
            qb.push(" AND body -> ");
            qb.push_bind(field.clone());
            qb.push(" = ");
            qb.push_bind(Json(value.clone()));
        }

        if !filter.alternatives().is_empty() {
            qb.push(" AND (");
            for (i, (field, value)) in filter.alternatives().iter().enumerate() {
                if i > 0 {
                    qb.push(" OR ");
                }
                qb.push("body -> ");
                qb.push_bind(field.clone());
                qb.push(" = ");
                qb.push_bind(Json(value.clone()));
            }
            qb.push(")");
        }

        qb.push(" ORDER BY created_at, id");
        if let Some(limit) = limit {
            qb.push(" LIMIT ");
            qb.push_bind(limit);
        }
        if lock {
            qb.push(" FOR UPDATE");
        }
        qb
    }

    fn decode(body: JsonValue) -> Result<R, RepositoryError> {
        Ok(serde_json::from_value(body)?)
    }

    async fn update(
        &self,
        filter: &Filter,
        mutation: &(dyn for<'m> Fn(&'m mut R) + Send + Sync),
        limit: Option<i64>,
    ) -> Result<UpdateResult, RepositoryError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin", e))?;

        let rows = Self::select(filter, "id, body", true, limit)
            .build()
            .fetch_all(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("select_for_update", e))?;

        let mut result = UpdateResult::default();
        for row in rows {
            let id: Uuid = row
                .try_get("id")
                .map_err(|e| map_sqlx_error("read_id", e))?;
            let Json(body): Json<JsonValue> = row
                .try_get("body")
                .map_err(|e| map_sqlx_error("read_body", e))?;

            let current = Self::decode(body)?;
            let mut updated = current.clone();
            mutation(&mut updated);
            result.matched += 1;
            if updated == current {
                continue;
            }

            sqlx::query(
                r#"
                UPDATE documents
                SET body = $1, updated_at = now()
                WHERE collection = $2 AND id = $3
                "#,
            )
            .bind(Json(serde_json::to_value(&updated)?))
            .bind(R::COLLECTION)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("update", e))?;
            result.modified += 1;
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit", e))?;

        Span::current().record("modified", result.modified);
        Ok(result)
    }
}

#[async_trait::async_trait]
impl<R: Record> Repository<R> for PostgresRepository<R> {
    #[instrument(skip(self), fields(collection = R::COLLECTION), err)]
    async fn find_one(&self, filter: &Filter) -> Result<Option<R>, RepositoryError> {
        let row = Self::select(filter, "body", false, Some(1))
            .build()
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_one", e))?;

        match row {
            Some(row) => {
                let Json(body): Json<JsonValue> = row
                    .try_get("body")
                    .map_err(|e| map_sqlx_error("find_one", e))?;
                Ok(Some(Self::decode(body)?))
            }
            None => Ok(None),
        }
    }

    #[instrument(skip(self), fields(collection = R::COLLECTION), err)]
    async fn find(&self, filter: &Filter) -> Result<Vec<R>, RepositoryError> {
        let rows = Self::select(filter, "body", false, None)
            .build()
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find", e))?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let Json(body): Json<JsonValue> = row
                .try_get("body")
                .map_err(|e| map_sqlx_error("find", e))?;
            out.push(Self::decode(body)?);
        }
        Ok(out)
    }

    #[instrument(skip(self, mutation), fields(collection = R::COLLECTION, modified), err)]
    async fn update_one(
        &self,
        filter: &Filter,
        mutation: &(dyn for<'m> Fn(&'m mut R) + Send + Sync),
    ) -> Result<UpdateResult, RepositoryError> {
        self.update(filter, mutation, Some(1)).await
    }

    #[instrument(skip(self, mutation), fields(collection = R::COLLECTION, modified), err)]
    async fn update_many(
        &self,
        filter: &Filter,
        mutation: &(dyn for<'m> Fn(&'m mut R) + Send + Sync),
    ) -> Result<UpdateResult, RepositoryError> {
        self.update(filter, mutation, None).await
    }

    #[instrument(skip(self, record), fields(collection = R::COLLECTION, id = %record.key()), err)]
    async fn insert_one(&self, record: R) -> Result<R, RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO documents (collection, id, body)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(R::COLLECTION)
        .bind(record.key())
        .bind(Json(serde_json::to_value(&record)?))
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_one", e))?;
        Ok(record)
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> RepositoryError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => RepositoryError::Duplicate(msg),
                _ => RepositoryError::Storage(msg),
            }
        }
        sqlx::Error::PoolClosed | sqlx::Error::PoolTimedOut => {
            RepositoryError::Unavailable(format!("connection pool unavailable in {}", operation))
        }
        sqlx::Error::Io(e) => {
            RepositoryError::Unavailable(format!("io error in {}: {}", operation, e))
        }
        _ => RepositoryError::Storage(format!("sqlx error in {}: {}", operation, err)),
    }
}
