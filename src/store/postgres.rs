//! PostgreSQL + pgvector record store.
//!
//! Ranking is delegated entirely to pgvector's cosine distance operator
//! (`<=>`); this module only assembles the predicate and maps rows.

use async_trait::async_trait;
use pgvector::Vector;
use serde_json::Value;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::{Postgres, QueryBuilder, Row};
use tracing::debug;

use super::types::{Metadata, MetadataFilter, Record, SearchQuery, SearchResult, TimeRange, MAX_LIMIT};
use super::RecordStore;
use crate::error::FaqError;

/// Table names are interpolated into SQL, so only plain identifiers pass.
pub fn validate_identifier(name: &str) -> Result<(), FaqError> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .map_or(false, |c| c.is_ascii_alphabetic() || c == '_');
    let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid_start && valid_rest && name.len() <= 63 {
        Ok(())
    } else {
        Err(FaqError::Configuration(format!(
            "`{}` is not a valid table name",
            name
        )))
    }
}

pub struct PgVectorStore {
    pool: PgPool,
    table: String,
    dimensions: usize,
}

impl PgVectorStore {
    pub async fn connect(url: &str, table: &str, dimensions: usize) -> Result<Self, FaqError> {
        validate_identifier(table)?;
        let pool = PgPoolOptions::new()
            .min_connections(1)
            .max_connections(5)
            .connect(url)
            .await
            .map_err(|e| FaqError::Retrieval(format!("Failed to connect to Postgres: {}", e)))?;

        let store = Self {
            pool,
            table: table.to_string(),
            dimensions,
        };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), FaqError> {
        for statement in schema_statements(&self.table, self.dimensions) {
            sqlx::query(&statement)
                .execute(&self.pool)
                .await
                .map_err(FaqError::retrieval)?;
        }
        Ok(())
    }

    fn check_dimensions(&self, embedding: &[f32]) -> Result<(), FaqError> {
        if embedding.len() != self.dimensions {
            return Err(FaqError::Embedding(format!(
                "table {} stores {}-dimension vectors, got {}",
                self.table,
                self.dimensions,
                embedding.len()
            )));
        }
        Ok(())
    }
}

pub(crate) fn schema_statements(table: &str, dimensions: usize) -> Vec<String> {
    vec![
        "CREATE EXTENSION IF NOT EXISTS vector".to_string(),
        format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                id TEXT PRIMARY KEY,
                contents TEXT NOT NULL,
                metadata JSONB NOT NULL DEFAULT '{{}}'::jsonb,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                embedding VECTOR({dimensions}) NOT NULL
            )"
        ),
        format!(
            "CREATE INDEX IF NOT EXISTS {table}_embedding_idx
             ON {table} USING hnsw (embedding vector_cosine_ops)"
        ),
        format!("CREATE INDEX IF NOT EXISTS {table}_created_at_idx ON {table} (created_at)"),
        format!(
            "CREATE INDEX IF NOT EXISTS {table}_metadata_idx
             ON {table} USING gin (metadata jsonb_path_ops)"
        ),
    ]
}

/// Push ` WHERE ...` for the query's filters, ANDed together.
fn push_predicate(
    builder: &mut QueryBuilder<'static, Postgres>,
    filter: Option<&MetadataFilter>,
    range: Option<&TimeRange>,
) {
    let mut separator = " WHERE ";
    if let Some(filter) = filter {
        builder.push(separator);
        builder.push("metadata @> ");
        builder.push_bind(Json(filter.as_json()));
        separator = " AND ";
    }
    if let Some(range) = range {
        builder.push(separator);
        builder.push("created_at BETWEEN ");
        builder.push_bind(range.start);
        builder.push(" AND ");
        builder.push_bind(range.end);
    }
}

/// `LIMIT` bind value. Validated queries never exceed `MAX_LIMIT`, so the
/// clamp only keeps the cast lossless.
fn sql_limit(limit: usize) -> i64 {
    limit.min(MAX_LIMIT) as i64
}

pub(crate) fn build_search(
    table: &str,
    embedding: &[f32],
    query: &SearchQuery,
) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new("SELECT id, metadata, contents, created_at, ");
    if query.include_embeddings {
        builder.push("embedding, ");
    }
    builder.push("embedding <=> ");
    builder.push_bind(Vector::from(embedding.to_vec()));
    builder.push(" AS distance FROM ");
    builder.push(table);
    push_predicate(
        &mut builder,
        query.metadata_filter.as_ref(),
        query.time_range.as_ref(),
    );
    builder.push(" ORDER BY embedding <=> ");
    builder.push_bind(Vector::from(embedding.to_vec()));
    builder.push(" LIMIT ");
    builder.push_bind(sql_limit(query.limit));
    builder
}

pub(crate) fn build_count(table: &str, filter: Option<&MetadataFilter>) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM ");
    builder.push(table);
    push_predicate(&mut builder, filter, None);
    builder
}

/// Stored metadata must be a JSON object; anything else is a decode error.
fn metadata_object(value: Value) -> Result<Metadata, sqlx::Error> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(sqlx::Error::ColumnDecode {
            index: "metadata".to_string(),
            source: format!("expected a JSON object, found `{}`", other).into(),
        }),
    }
}

fn row_to_result(row: &PgRow, include_embeddings: bool) -> Result<SearchResult, sqlx::Error> {
    let metadata: Json<Value> = row.try_get("metadata")?;
    let metadata = metadata_object(metadata.0)?;
    let embedding = if include_embeddings {
        Some(row.try_get::<Vector, _>("embedding")?.to_vec())
    } else {
        None
    };

    Ok(SearchResult {
        id: row.try_get("id")?,
        metadata,
        content: row.try_get("contents")?,
        created_at: row.try_get("created_at")?,
        embedding,
        distance: row.try_get("distance")?,
    })
}

#[async_trait]
impl RecordStore for PgVectorStore {
    async fn upsert(&self, record: &Record) -> Result<(), FaqError> {
        self.check_dimensions(&record.embedding)?;
        let sql = format!(
            "INSERT INTO {} (id, contents, metadata, created_at, embedding)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (id) DO UPDATE SET
                contents = EXCLUDED.contents,
                metadata = EXCLUDED.metadata,
                created_at = EXCLUDED.created_at,
                embedding = EXCLUDED.embedding",
            self.table
        );
        sqlx::query(&sql)
            .bind(&record.id)
            .bind(&record.content)
            .bind(Json(Value::Object(record.metadata.clone())))
            .bind(record.created_at)
            .bind(Vector::from(record.embedding.clone()))
            .execute(&self.pool)
            .await
            .map_err(FaqError::retrieval)?;
        Ok(())
    }

    async fn nearest(
        &self,
        embedding: &[f32],
        query: &SearchQuery,
    ) -> Result<Vec<SearchResult>, FaqError> {
        query.validate()?;
        self.check_dimensions(embedding)?;
        let mut builder = build_search(&self.table, embedding, query);
        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(FaqError::retrieval)?;

        let results = rows
            .iter()
            .map(|row| row_to_result(row, query.include_embeddings))
            .collect::<Result<Vec<_>, _>>()
            .map_err(FaqError::retrieval)?;
        debug!(table = %self.table, rows = results.len(), "nearest-neighbor query");
        Ok(results)
    }

    async fn count(&self, filter: Option<&MetadataFilter>) -> Result<usize, FaqError> {
        let mut builder = build_count(&self.table, filter);
        let count: i64 = builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(FaqError::retrieval)?;
        Ok(count as usize)
    }
}
