use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::types::Metadata;
use super::VectorStore;
use crate::catalog::CATEGORY_KEY;

/// One FAQ row as found in a dataset file.
#[derive(Debug, Clone, Deserialize)]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
    pub category: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl FaqEntry {
    /// Stored content: the question/answer pair as a single text.
    pub fn content(&self) -> String {
        format!("Question: {}\nAnswer: {}", self.question.trim(), self.answer.trim())
    }

    pub fn metadata(&self, created_at: DateTime<Utc>) -> Metadata {
        let mut metadata = Metadata::new();
        metadata.insert(CATEGORY_KEY.to_string(), json!(self.category.trim()));
        metadata.insert("created_at".to_string(), json!(created_at.to_rfc3339()));
        metadata
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct IngestReport {
    pub inserted: usize,
    pub by_category: BTreeMap<String, usize>,
}

/// Parse a JSON array of entries, rejecting blank fields.
pub fn parse_entries(bytes: &[u8]) -> Result<Vec<FaqEntry>> {
    let entries: Vec<FaqEntry> =
        serde_json::from_slice(bytes).context("FAQ dataset must be a JSON array of entries")?;

    for (i, entry) in entries.iter().enumerate() {
        if entry.question.trim().is_empty()
            || entry.answer.trim().is_empty()
            || entry.category.trim().is_empty()
        {
            bail!("entry {} has a blank question, answer or category", i);
        }
    }
    Ok(entries)
}

/// Embed and store every entry. Entries without a timestamp get "now".
pub async fn ingest_entries(store: &VectorStore, entries: &[FaqEntry]) -> Result<IngestReport> {
    let mut report = IngestReport::default();
    let now = Utc::now();

    for entry in entries {
        let created_at = entry.created_at.unwrap_or(now);
        store
            .insert(&entry.content(), entry.metadata(created_at), created_at)
            .await
            .with_context(|| format!("Failed to ingest `{}`", entry.question.trim()))?;

        report.inserted += 1;
        *report
            .by_category
            .entry(entry.category.trim().to_string())
            .or_default() += 1;
    }

    info!(
        inserted = report.inserted,
        categories = report.by_category.len(),
        "FAQ entries ingested"
    );
    Ok(report)
}

/// Ingest a dataset file from disk.
pub async fn ingest_path(store: &VectorStore, path: &Path) -> Result<IngestReport> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let entries = parse_entries(&bytes)?;
    ingest_entries(store, &entries).await
}

/// Ingest a dataset by fetching it over HTTP.
pub async fn ingest_url(store: &VectorStore, url: &str) -> Result<IngestReport> {
    let resp = reqwest::get(url)
        .await
        .context("Failed to fetch URL")?
        .error_for_status()
        .context("Dataset URL returned an error status")?;

    let body = resp.bytes().await.context("Failed to read response body")?;
    let entries = parse_entries(&body)?;
    info!(url, entries = entries.len(), "Dataset fetched");
    ingest_entries(store, &entries).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::local::LocalStore;
    use crate::store::types::{MetadataFilter, SearchQuery};
    use crate::testing::HashEmbedder;
    use std::sync::Arc;

    const DATASET: &str = r#"[
        {"question": "How long does shipping take?", "answer": "3-5 business days.", "category": "Shipping",
         "created_at": "2024-02-01T12:00:00Z"},
        {"question": "Do you ship abroad?", "answer": "Yes, to 40 countries.", "category": "Shipping"},
        {"question": "How do I return an item?", "answer": "Use the returns portal.", "category": "Returns"}
    ]"#;

    #[test]
    fn parses_and_formats_entries() {
        let entries = parse_entries(DATASET.as_bytes()).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(
            entries[0].content(),
            "Question: How long does shipping take?\nAnswer: 3-5 business days."
        );
        assert!(entries[0].created_at.is_some());
        assert!(entries[1].created_at.is_none());
    }

    #[test]
    fn blank_fields_and_non_arrays_are_rejected() {
        assert!(parse_entries(br#"[{"question": " ", "answer": "a", "category": "c"}]"#).is_err());
        assert!(parse_entries(br#"{"question": "q"}"#).is_err());
    }

    #[tokio::test]
    async fn ingest_reports_and_stores_by_category() {
        let dir = tempfile::tempdir().unwrap();
        let records = LocalStore::new(dir.path()).await.unwrap();
        let store = VectorStore::new(Arc::new(HashEmbedder::new(16)), Arc::new(records));

        let entries = parse_entries(DATASET.as_bytes()).unwrap();
        let report = ingest_entries(&store, &entries).await.unwrap();

        assert_eq!(report.inserted, 3);
        assert_eq!(report.by_category.get("Shipping"), Some(&2));
        let shipping = MetadataFilter::new(CATEGORY_KEY, json!("Shipping"));
        assert_eq!(store.count(Some(&shipping)).await.unwrap(), 2);

        let top = store
            .search(&SearchQuery::new(entries[2].content()).with_limit(1))
            .await
            .unwrap();
        assert_eq!(top[0].category(), Some("Returns"));
        assert!(top[0].metadata.get("created_at").and_then(|v| v.as_str()).is_some());
    }

    #[tokio::test]
    async fn reingesting_the_same_dataset_does_not_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        let records = LocalStore::new(dir.path()).await.unwrap();
        let store = VectorStore::new(Arc::new(HashEmbedder::new(16)), Arc::new(records));
        let entries = parse_entries(DATASET.as_bytes()).unwrap();

        ingest_entries(&store, &entries).await.unwrap();
        ingest_entries(&store, &entries).await.unwrap();
        assert_eq!(store.count(None).await.unwrap(), 3);
    }
}
