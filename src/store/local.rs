use std::path::Path;

use async_trait::async_trait;
use cnidarium::{StateDelta, StateRead, StateWrite, Storage};
use futures::StreamExt;
use tracing::debug;

use super::types::{rank_results, MetadataFilter, Record, SearchQuery, SearchResult};
use super::RecordStore;
use crate::error::FaqError;

// Key prefix (no trailing slash, cnidarium convention)
const RECORD_PREFIX: &str = "faq/record";

fn record_key(id: &str) -> String {
    format!("{}/{}", RECORD_PREFIX, id)
}

/// Cosine distance in `[0, 2]`; degenerate vectors are maximally far.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f64 {
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b.iter()) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom <= f64::EPSILON {
        1.0
    } else {
        1.0 - dot / denom
    }
}

/// Embedded record store on cnidarium. Nearest-neighbor search is a
/// brute-force cosine scan over the record prefix.
pub struct LocalStore {
    storage: Storage,
}

impl LocalStore {
    pub async fn new(data_dir: &Path) -> Result<Self, FaqError> {
        std::fs::create_dir_all(data_dir).map_err(FaqError::retrieval)?;
        let storage = Storage::load(data_dir.to_path_buf(), vec![RECORD_PREFIX.to_string()])
            .await
            .map_err(|e| FaqError::Retrieval(format!("Failed to init cnidarium storage: {}", e)))?;
        Ok(Self { storage })
    }

    /// Every stored record. An undecodable entry fails the whole scan.
    async fn scan(&self) -> Result<Vec<Record>, FaqError> {
        let snapshot = self.storage.latest_snapshot();
        let mut stream = snapshot.prefix_raw(RECORD_PREFIX);
        let mut records = Vec::new();

        while let Some(entry) = stream.next().await {
            let (key, value) = entry.map_err(FaqError::retrieval)?;
            let record = serde_json::from_slice::<Record>(&value).map_err(|e| {
                FaqError::Retrieval(format!("record `{}` is unreadable: {}", key, e))
            })?;
            records.push(record);
        }

        Ok(records)
    }

    pub async fn get(&self, id: &str) -> Result<Option<Record>, FaqError> {
        let snapshot = self.storage.latest_snapshot();
        let bytes = snapshot
            .get_raw(&record_key(id))
            .await
            .map_err(FaqError::retrieval)?;
        bytes
            .map(|b| serde_json::from_slice(&b).map_err(FaqError::retrieval))
            .transpose()
    }
}

#[async_trait]
impl RecordStore for LocalStore {
    async fn upsert(&self, record: &Record) -> Result<(), FaqError> {
        let snapshot = self.storage.latest_snapshot();
        let mut delta = StateDelta::new(snapshot);
        delta.put_raw(
            record_key(&record.id),
            serde_json::to_vec(record).map_err(FaqError::retrieval)?,
        );
        self.storage
            .commit(delta)
            .await
            .map_err(FaqError::retrieval)?;
        debug!(record_id = %record.id, "record committed");
        Ok(())
    }

    async fn nearest(
        &self,
        embedding: &[f32],
        query: &SearchQuery,
    ) -> Result<Vec<SearchResult>, FaqError> {
        let mut scored = Vec::new();
        for record in self.scan().await? {
            if !query.matches(&record.metadata, &record.created_at) {
                continue;
            }
            if record.embedding.len() != embedding.len() {
                return Err(FaqError::Retrieval(format!(
                    "record {} has {} dimensions, query has {}",
                    record.id,
                    record.embedding.len(),
                    embedding.len()
                )));
            }
            let distance = cosine_distance(embedding, &record.embedding);
            scored.push(SearchResult {
                id: record.id,
                metadata: record.metadata,
                content: record.content,
                created_at: record.created_at,
                embedding: query.include_embeddings.then_some(record.embedding),
                distance,
            });
        }

        rank_results(&mut scored, query.limit);
        Ok(scored)
    }

    async fn count(&self, filter: Option<&MetadataFilter>) -> Result<usize, FaqError> {
        let records = self.scan().await?;
        Ok(records
            .iter()
            .filter(|r| filter.map_or(true, |f| f.matches(&r.metadata)))
            .count())
    }
}
