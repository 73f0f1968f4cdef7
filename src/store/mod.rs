pub mod ingest;
pub mod local;
pub mod postgres;
pub mod types;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::config::{Settings, StoreBackend};
use crate::embedding::{validate_embedding, Embedder, OpenAiEmbedder};
use crate::error::FaqError;
use types::{rank_results, record_id, Metadata, MetadataFilter, Record, SearchQuery, SearchResult};

/// A vector-capable table of records.
///
/// Backends own the nearest-neighbor operator; callers hand them an
/// already-computed query embedding.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert or replace a record by ID.
    async fn upsert(&self, record: &Record) -> Result<(), FaqError>;

    /// The `query.limit` records closest to `embedding` among those matching
    /// the query's filters, ascending by cosine distance.
    async fn nearest(
        &self,
        embedding: &[f32],
        query: &SearchQuery,
    ) -> Result<Vec<SearchResult>, FaqError>;

    /// Number of records, optionally restricted to a metadata match.
    async fn count(&self, filter: Option<&MetadataFilter>) -> Result<usize, FaqError>;
}

/// Open the configured backend.
pub async fn open_backend(
    backend: &StoreBackend,
    dimensions: usize,
) -> Result<Arc<dyn RecordStore>, FaqError> {
    match backend {
        StoreBackend::Postgres { url, table } => {
            let store = postgres::PgVectorStore::connect(url, table, dimensions).await?;
            info!(table = %table, dimensions, "pgvector store ready");
            Ok(Arc::new(store))
        }
        StoreBackend::Local { data_dir } => {
            let store = local::LocalStore::new(data_dir).await?;
            info!("Local record store initialized at {:?}", data_dir);
            Ok(Arc::new(store))
        }
    }
}

/// Text-in, ranked-rows-out facade over an embedder and a record backend.
pub struct VectorStore {
    embedder: Arc<dyn Embedder>,
    records: Arc<dyn RecordStore>,
}

impl VectorStore {
    pub fn new(embedder: Arc<dyn Embedder>, records: Arc<dyn RecordStore>) -> Self {
        Self { embedder, records }
    }

    /// OpenAI-compatible embedder over the configured backend.
    pub async fn from_settings(settings: &Settings, client: reqwest::Client) -> Result<Self, FaqError> {
        let embedder = OpenAiEmbedder::new(client, &settings.provider);
        let records = open_backend(&settings.store, settings.provider.embedding_dimensions).await?;
        Ok(Self::new(Arc::new(embedder), records))
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, FaqError> {
        let embedding = self.embedder.embed(text).await?;
        validate_embedding(&embedding, self.embedder.dimensions())?;
        Ok(embedding)
    }

    /// Embed the query text and return the closest matching records.
    pub async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchResult>, FaqError> {
        query.validate()?;
        let embedding = self.embed(&query.text).await?;

        let mut results = self.records.nearest(&embedding, query).await?;
        // Backends promise this already; keep the invariant regardless of backend.
        rank_results(&mut results, query.limit);

        debug!(
            query = %query.text,
            limit = query.limit,
            filter = ?query.metadata_filter,
            time_range = ?query.time_range,
            results = results.len(),
            "vector search complete"
        );
        Ok(results)
    }

    /// Embed `content` and upsert it as a record. Idempotent: same content = same ID.
    pub async fn insert(
        &self,
        content: &str,
        metadata: Metadata,
        created_at: DateTime<Utc>,
    ) -> Result<Record, FaqError> {
        let embedding = self.embed(content).await?;
        let record = Record {
            id: record_id(content),
            content: content.to_string(),
            metadata,
            created_at,
            embedding,
        };
        self.records.upsert(&record).await?;
        debug!(record_id = %record.id, "record stored");
        Ok(record)
    }

    pub async fn count(&self, filter: Option<&MetadataFilter>) -> Result<usize, FaqError> {
        self.records.count(filter).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{metadata, FailingStore, HashEmbedder};
    use chrono::TimeZone;

    async fn local_vector_store(dir: &tempfile::TempDir) -> VectorStore {
        let records = local::LocalStore::new(dir.path()).await.unwrap();
        VectorStore::new(Arc::new(HashEmbedder::new(32)), Arc::new(records))
    }

    #[tokio::test]
    async fn wrong_dimension_from_embedder_is_an_embedding_error() {
        struct Short;
        #[async_trait]
        impl Embedder for Short {
            fn dimensions(&self) -> usize {
                8
            }
            async fn embed(&self, _text: &str) -> Result<Vec<f32>, FaqError> {
                Ok(vec![1.0; 4])
            }
        }

        let store = VectorStore::new(Arc::new(Short), Arc::new(FailingStore));
        let err = store.search(&SearchQuery::new("hello")).await.unwrap_err();
        assert!(matches!(err, FaqError::Embedding(_)));
    }

    #[tokio::test]
    async fn zero_limit_never_reaches_the_embedder() {
        let store = VectorStore::new(Arc::new(HashEmbedder::new(8)), Arc::new(FailingStore));
        let err = store
            .search(&SearchQuery::new("hello").with_limit(0))
            .await
            .unwrap_err();
        assert!(matches!(err, FaqError::InvalidQuery(_)));
    }

    #[tokio::test]
    async fn backend_failure_surfaces_as_retrieval_error() {
        let store = VectorStore::new(Arc::new(HashEmbedder::new(8)), Arc::new(FailingStore));
        let err = store.search(&SearchQuery::new("hello")).await.unwrap_err();
        assert!(matches!(err, FaqError::Retrieval(_)));
    }

    #[tokio::test]
    async fn own_content_is_the_top_result() {
        let dir = tempfile::tempdir().unwrap();
        let store = local_vector_store(&dir).await;
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();

        let target = "Question: What is a dividend?\nAnswer: A share of profits paid to shareholders.";
        store
            .insert("Question: What is a bond?\nAnswer: A debt security.", metadata("Investment Types", at), at)
            .await
            .unwrap();
        let inserted = store.insert(target, metadata("Dividend Types", at), at).await.unwrap();
        store
            .insert("Question: What is a stop order?\nAnswer: An order triggered at a price.", metadata("Order Types", at), at)
            .await
            .unwrap();

        let results = store.search(&SearchQuery::new(target).with_limit(3)).await.unwrap();
        assert_eq!(results[0].id, inserted.id);
        assert!(results[0].distance.abs() < 1e-6);
        assert_eq!(store.count(None).await.unwrap(), 3);
    }
}
