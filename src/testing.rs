//! Deterministic fakes for the provider and storage seams.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use crate::embedding::Embedder;
use crate::error::FaqError;
use crate::llm::{ChatModel, Message};
use crate::store::types::{Metadata, MetadataFilter, Record, SearchQuery, SearchResult};
use crate::store::RecordStore;

pub fn metadata(category: &str, at: DateTime<Utc>) -> Metadata {
    let mut m = Metadata::new();
    m.insert("category".into(), json!(category));
    m.insert("created_at".into(), json!(at.to_rfc3339()));
    m
}

/// Bag-of-words hashed into `dims` buckets, L2-normalized.
/// Identical text always maps to the identical vector.
pub struct HashEmbedder {
    dims: usize,
    pub calls: AtomicUsize,
}

impl HashEmbedder {
    pub fn new(dims: usize) -> Self {
        Self {
            dims,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    fn dimensions(&self) -> usize {
        self.dims
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, FaqError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut v = vec![0.0f32; self.dims];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let hash = blake3::hash(word.to_lowercase().as_bytes());
            let bytes = hash.as_bytes();
            let bucket = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize % self.dims;
            v[bucket] += 1.0;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm == 0.0 {
            v[0] = 1.0;
        } else {
            v.iter_mut().for_each(|x| *x /= norm);
        }
        Ok(v)
    }
}

/// Backend whose every call fails like an unreachable database.
pub struct FailingStore;

#[async_trait]
impl RecordStore for FailingStore {
    async fn upsert(&self, _record: &Record) -> Result<(), FaqError> {
        Err(FaqError::Retrieval("connection refused".into()))
    }

    async fn nearest(
        &self,
        _embedding: &[f32],
        _query: &SearchQuery,
    ) -> Result<Vec<SearchResult>, FaqError> {
        Err(FaqError::Retrieval("connection refused".into()))
    }

    async fn count(&self, _filter: Option<&MetadataFilter>) -> Result<usize, FaqError> {
        Err(FaqError::Retrieval("connection refused".into()))
    }
}

/// Chat model returning a fixed reply and recording every prompt it sees.
pub struct ScriptedModel {
    reply: Result<String, String>,
    pub prompts: Mutex<Vec<Vec<Message>>>,
    pub formats: Mutex<Vec<Option<Value>>>,
}

impl ScriptedModel {
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: Ok(reply.into()),
            prompts: Mutex::new(Vec::new()),
            formats: Mutex::new(Vec::new()),
        }
    }

    pub fn answering(answer: &str, steps: &[&str], enough_context: bool) -> Self {
        Self::replying(
            json!({
                "thought_process": steps,
                "answer": answer,
                "enough_context": enough_context,
            })
            .to_string(),
        )
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            prompts: Mutex::new(Vec::new()),
            formats: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn complete(
        &self,
        messages: &[Message],
        response_format: Option<&Value>,
    ) -> Result<String, FaqError> {
        self.prompts.lock().unwrap().push(messages.to_vec());
        self.formats.lock().unwrap().push(response_format.cloned());
        self.reply.clone().map_err(FaqError::Synthesis)
    }
}
