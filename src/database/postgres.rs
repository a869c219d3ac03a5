use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, QueryBuilder, Row};
use std::time::Duration;
use tracing::info;

use super::store::{
    strip_top_level_nulls, CollectionPath, DocumentPath, DocumentStore, Filter, Query, StoreError,
};
use crate::config::StoreConfig;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    path        TEXT PRIMARY KEY,
    collection  TEXT NOT NULL,
    data        JSONB NOT NULL,
    updated_at  TIMESTAMPTZ NOT NULL DEFAULT now()
)"#;

const COLLECTION_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS documents_collection_idx ON documents (collection)";

/// Document store on a single Postgres table of JSONB documents keyed by path.
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    /// Connect using the configured pool settings and make sure the table exists.
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let url = config
            .database_url
            .as_deref()
            .filter(|u| !u.is_empty())
            .ok_or(StoreError::ConfigMissing("DATABASE_URL"))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        let store = Self::from_pool(pool);
        store.ensure_schema().await?;
        info!(
            "Connected document store (max {} connections)",
            config.max_connections
        );
        Ok(store)
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(SCHEMA).execute(&self.pool).await?;
        sqlx::query(COLLECTION_INDEX).execute(&self.pool).await?;
        Ok(())
    }
}

/// Split a field map into values to write and keys to remove.
fn split_fields(fields: Map<String, Value>) -> (Map<String, Value>, Vec<String>) {
    let mut set = Map::new();
    let mut removed = Vec::new();
    for (key, value) in fields {
        if value.is_null() {
            removed.push(key);
        } else {
            set.insert(key, value);
        }
    }
    (set, removed)
}

/// Build the SELECT for a collection query. Field names are bound, never interpolated.
fn build_select<'a>(collection: &'a CollectionPath, query: &'a Query) -> QueryBuilder<'a, Postgres> {
    let mut qb = QueryBuilder::new("SELECT data FROM documents WHERE collection = ");
    qb.push_bind(collection.as_str());

    for filter in &query.filters {
        match filter {
            Filter::Eq { field, value } => {
                qb.push(" AND data -> ");
                qb.push_bind(field.as_str());
                qb.push(" = ");
                qb.push_bind(sqlx::types::Json(value));
            }
            Filter::AtOrAfter { field, at } => {
                qb.push(" AND (data ->> ");
                qb.push_bind(field.as_str());
                qb.push(")::timestamptz >= ");
                qb.push_bind(*at);
            }
            Filter::AtOrBefore { field, at } => {
                qb.push(" AND (data ->> ");
                qb.push_bind(field.as_str());
                qb.push(")::timestamptz <= ");
                qb.push_bind(*at);
            }
        }
    }

    match &query.order_by {
        Some(order) => {
            qb.push(" AND data ? ");
            qb.push_bind(order.field.as_str());
            qb.push(" ORDER BY (data ->> ");
            qb.push_bind(order.field.as_str());
            qb.push(if order.descending {
                ")::timestamptz DESC, path ASC"
            } else {
                ")::timestamptz ASC, path ASC"
            });
        }
        None => {
            qb.push(" ORDER BY path ASC");
        }
    }

    if let Some(limit) = query.limit {
        qb.push(" LIMIT ");
        qb.push_bind(i64::try_from(limit).unwrap_or(i64::MAX));
    }

    qb
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn get(&self, path: &DocumentPath) -> Result<Option<Value>, StoreError> {
        let row = sqlx::query("SELECT data FROM documents WHERE path = $1")
            .bind(path.to_string())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(row.try_get::<Value, _>("data")?)),
            None => Ok(None),
        }
    }

    async fn set(&self, path: &DocumentPath, document: Value) -> Result<(), StoreError> {
        let document = strip_top_level_nulls(path, document)?;
        sqlx::query(
            "INSERT INTO documents (path, collection, data) VALUES ($1, $2, $3) \
             ON CONFLICT (path) DO UPDATE SET data = EXCLUDED.data, updated_at = now()",
        )
        .bind(path.to_string())
        .bind(path.parent().as_str())
        .bind(sqlx::types::Json(Value::Object(document)))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn merge(&self, path: &DocumentPath, fields: Map<String, Value>) -> Result<(), StoreError> {
        let (set, removed) = split_fields(fields);
        sqlx::query(
            "INSERT INTO documents (path, collection, data) VALUES ($1, $2, $3) \
             ON CONFLICT (path) DO UPDATE \
             SET data = (documents.data || EXCLUDED.data) - $4::text[], updated_at = now()",
        )
        .bind(path.to_string())
        .bind(path.parent().as_str())
        .bind(sqlx::types::Json(Value::Object(set)))
        .bind(removed)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update(&self, path: &DocumentPath, fields: Map<String, Value>) -> Result<(), StoreError> {
        let (set, removed) = split_fields(fields);
        let result = sqlx::query(
            "UPDATE documents SET data = (data || $2) - $3::text[], updated_at = now() \
             WHERE path = $1",
        )
        .bind(path.to_string())
        .bind(sqlx::types::Json(Value::Object(set)))
        .bind(removed)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(path.to_string()));
        }
        Ok(())
    }

    async fn delete(&self, path: &DocumentPath) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM documents WHERE path = $1")
            .bind(path.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn query(&self, collection: &CollectionPath, query: &Query) -> Result<Vec<Value>, StoreError> {
        let mut qb = build_select(collection, query);
        let rows = qb.build().fetch_all(&self.pool).await?;
        rows.iter()
            .map(|row| row.try_get::<Value, _>("data").map_err(StoreError::from))
            .collect()
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
        info!("Closed document store pool");
    }
}
