use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::FaqError;

/// Content-addressed record ID (blake3 hex hash of the content).
pub type RecordId = String;

/// Scalar metadata attached to a record (category, created_at, ...).
pub type Metadata = Map<String, Value>;

pub fn record_id(content: &str) -> RecordId {
    blake3::hash(content.as_bytes()).to_hex().to_string()
}

/// A stored question/answer pair with its embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub content: String,
    pub metadata: Metadata,
    pub created_at: DateTime<Utc>,
    pub embedding: Vec<f32>,
}

/// Single key/value equality constraint on record metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataFilter {
    pub key: String,
    pub value: Value,
}

impl MetadataFilter {
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    pub fn matches(&self, metadata: &Metadata) -> bool {
        metadata.get(&self.key) == Some(&self.value)
    }

    /// `{key: value}` document, the right-hand side of a JSONB containment test.
    pub fn as_json(&self) -> Value {
        let mut doc = Map::new();
        doc.insert(self.key.clone(), self.value.clone());
        Value::Object(doc)
    }
}

/// Inclusive `[start, end]` window on a record's creation timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, FaqError> {
        if start > end {
            return Err(FaqError::InvalidQuery(format!(
                "time range start {} is after end {}",
                start.to_rfc3339(),
                end.to_rfc3339()
            )));
        }
        Ok(Self { start, end })
    }

    /// Whole calendar days: start at midnight, end through its last instant.
    pub fn from_dates(start: NaiveDate, end: NaiveDate) -> Result<Self, FaqError> {
        let last_instant = end
            .and_hms_micro_opt(23, 59, 59, 999_999)
            .ok_or_else(|| FaqError::InvalidQuery(format!("invalid end date {}", end)))?;
        Self::new(
            Utc.from_utc_datetime(&start.and_time(NaiveTime::default())),
            Utc.from_utc_datetime(&last_instant),
        )
    }

    pub fn contains(&self, at: &DateTime<Utc>) -> bool {
        *at >= self.start && *at <= self.end
    }
}

/// Parse a `YYYY-MM-DD` date coming from a form or command option.
pub fn parse_date(raw: &str) -> Result<NaiveDate, FaqError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| FaqError::InvalidQuery(format!("`{}` is not a YYYY-MM-DD date", raw.trim())))
}

/// One similarity search request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    pub text: String,
    pub limit: usize,
    #[serde(default)]
    pub metadata_filter: Option<MetadataFilter>,
    #[serde(default)]
    pub time_range: Option<TimeRange>,
    /// Return stored embeddings alongside each row.
    #[serde(default)]
    pub include_embeddings: bool,
}

pub const DEFAULT_LIMIT: usize = 3;
/// Upper bound on results per query.
pub const MAX_LIMIT: usize = 100;

impl SearchQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            limit: DEFAULT_LIMIT,
            metadata_filter: None,
            time_range: None,
            include_embeddings: false,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_filter(mut self, filter: Option<MetadataFilter>) -> Self {
        self.metadata_filter = filter;
        self
    }

    pub fn with_time_range(mut self, range: Option<TimeRange>) -> Self {
        self.time_range = range;
        self
    }

    pub fn with_embeddings(mut self) -> Self {
        self.include_embeddings = true;
        self
    }

    pub fn validate(&self) -> Result<(), FaqError> {
        if self.limit == 0 || self.limit > MAX_LIMIT {
            return Err(FaqError::InvalidQuery(format!(
                "limit must be between 1 and {}, got {}",
                MAX_LIMIT, self.limit
            )));
        }
        if self.text.trim().is_empty() {
            return Err(FaqError::InvalidQuery("query text is empty".into()));
        }
        Ok(())
    }

    /// The AND of the optional equality and range predicates.
    pub fn matches(&self, metadata: &Metadata, created_at: &DateTime<Utc>) -> bool {
        let metadata_ok = self
            .metadata_filter
            .as_ref()
            .map_or(true, |f| f.matches(metadata));
        let time_ok = self.time_range.as_ref().map_or(true, |r| r.contains(created_at));
        metadata_ok && time_ok
    }
}

/// One ranked row from a nearest-neighbor query.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResult {
    pub id: RecordId,
    pub metadata: Metadata,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
    /// Cosine distance to the query (lower is closer).
    pub distance: f64,
}

impl SearchResult {
    /// `1 - distance`, clamped into `[0, 1]`.
    pub fn similarity(&self) -> f64 {
        (1.0 - self.distance).clamp(0.0, 1.0)
    }

    pub fn category(&self) -> Option<&str> {
        self.metadata.get(crate::catalog::CATEGORY_KEY).and_then(Value::as_str)
    }
}

// Serialized with the derived similarity so JSON clients see the same score as the UIs.
impl Serialize for SearchResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let fields = if self.embedding.is_some() { 7 } else { 6 };
        let mut state = serializer.serialize_struct("SearchResult", fields)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("metadata", &self.metadata)?;
        state.serialize_field("content", &self.content)?;
        state.serialize_field("created_at", &self.created_at)?;
        if let Some(embedding) = &self.embedding {
            state.serialize_field("embedding", embedding)?;
        }
        state.serialize_field("distance", &self.distance)?;
        state.serialize_field("similarity", &self.similarity())?;
        state.end()
    }
}

/// Sort ascending by distance and cap at `limit`.
pub fn rank_results(results: &mut Vec<SearchResult>, limit: usize) {
    results.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    results.truncate(limit);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn metadata(category: &str) -> Metadata {
        let mut m = Metadata::new();
        m.insert("category".into(), json!(category));
        m
    }

    fn result(id: &str, distance: f64) -> SearchResult {
        SearchResult {
            id: id.into(),
            metadata: metadata("Shipping"),
            content: String::new(),
            created_at: Utc::now(),
            embedding: None,
            distance,
        }
    }

    #[test]
    fn end_date_is_inclusive_through_last_instant() {
        let day = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        let range = TimeRange::from_dates(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), day).unwrap();

        let late = Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap();
        let next = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let first = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        assert!(range.contains(&late));
        assert!(range.contains(&first));
        assert!(!range.contains(&next));
    }

    #[test]
    fn inverted_range_is_rejected() {
        let a = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let b = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert!(matches!(TimeRange::from_dates(a, b), Err(FaqError::InvalidQuery(_))));
    }

    #[test]
    fn single_day_range_is_valid() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let range = TimeRange::from_dates(day, day).unwrap();
        assert!(range.contains(&Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()));
    }

    #[test]
    fn query_matches_combines_filters_with_and() {
        let at = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
        let range = TimeRange::from_dates(
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
        )
        .unwrap();
        let query = SearchQuery::new("q")
            .with_filter(Some(MetadataFilter::new("category", json!("Shipping"))))
            .with_time_range(Some(range));

        assert!(query.matches(&metadata("Shipping"), &at));
        assert!(!query.matches(&metadata("Returns"), &at));
        assert!(!query.matches(&metadata("Shipping"), &(at + chrono::Duration::days(30))));
    }

    #[test]
    fn zero_limit_and_blank_text_are_invalid() {
        assert!(SearchQuery::new("q").with_limit(0).validate().is_err());
        assert!(SearchQuery::new("q").with_limit(MAX_LIMIT).validate().is_ok());
        assert!(matches!(
            SearchQuery::new("q").with_limit(usize::MAX).validate(),
            Err(FaqError::InvalidQuery(_))
        ));
        assert!(SearchQuery::new("   ").validate().is_err());
        assert!(SearchQuery::new("q").validate().is_ok());
    }

    #[test]
    fn serialized_result_carries_similarity() {
        let value = serde_json::to_value(result("a", 0.25)).unwrap();
        assert_eq!(value["distance"], 0.25);
        assert_eq!(value["similarity"], 0.75);
        assert!(value.get("embedding").is_none());

        let back: SearchResult = serde_json::from_value(value).unwrap();
        assert_eq!(back.distance, 0.25);
    }

    #[test]
    fn similarity_is_clamped() {
        assert_eq!(result("a", 0.25).similarity(), 0.75);
        assert_eq!(result("b", 1.6).similarity(), 0.0);
        assert_eq!(result("c", -0.0001).similarity(), 1.0);
    }

    #[test]
    fn rank_sorts_and_truncates() {
        let mut rows = vec![result("a", 0.5), result("b", 0.1), result("c", 0.3)];
        rank_results(&mut rows, 2);
        let ids: Vec<_> = rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c"]);
    }

    #[test]
    fn parse_date_rejects_garbage() {
        assert!(parse_date("2024-02-30").is_err());
        assert_eq!(parse_date(" 2024-02-29 ").unwrap(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[test]
    fn record_id_is_content_addressed() {
        assert_eq!(record_id("same"), record_id("same"));
        assert_ne!(record_id("same"), record_id("other"));
    }
}
