use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::catalog::Catalog;
use crate::config::Settings;
use crate::error::FaqError;
use crate::llm::{http_client, LlmClient};
use crate::store::types::{SearchQuery, SearchResult, TimeRange};
use crate::store::VectorStore;
use crate::synth::{SynthesizedAnswer, Synthesizer};

/// What the user asked, before validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AskRequest {
    pub question: String,
    /// Category selector value; `None`, blank, or "All" mean unfiltered.
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Answer plus the raw rows it was built from.
#[derive(Debug, Clone, Serialize)]
pub struct AskOutcome {
    pub question: String,
    pub answer: SynthesizedAnswer,
    pub results: Vec<SearchResult>,
}

/// The search-then-synthesize pipeline shared by every front end.
pub struct FaqAssistant {
    vector_store: Arc<VectorStore>,
    synthesizer: Synthesizer,
    catalog: Catalog,
    default_limit: usize,
}

impl FaqAssistant {
    pub fn new(
        vector_store: Arc<VectorStore>,
        synthesizer: Synthesizer,
        catalog: Catalog,
        default_limit: usize,
    ) -> Self {
        Self {
            vector_store,
            synthesizer,
            catalog,
            default_limit,
        }
    }

    /// Wire the production pipeline: one HTTP client shared by both providers.
    pub async fn from_settings(settings: &Settings) -> Result<Self, FaqError> {
        let client = http_client(&settings.provider)?;
        let vector_store = VectorStore::from_settings(settings, client.clone()).await?;
        let llm = LlmClient::new(client, &settings.provider);
        info!(
            domain = ?settings.domain,
            model = %settings.provider.llm_model,
            "FAQ assistant initialized"
        );
        Ok(Self::new(
            Arc::new(vector_store),
            Synthesizer::new(Arc::new(llm)),
            Catalog::for_domain(settings.domain),
            settings.search_limit,
        ))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn vector_store(&self) -> &Arc<VectorStore> {
        &self.vector_store
    }

    pub fn default_limit(&self) -> usize {
        self.default_limit
    }

    /// Assemble a validated query from the raw selections.
    /// Both dates are needed for a range; a lone date is rejected.
    pub fn build_query(&self, request: &AskRequest) -> Result<SearchQuery, FaqError> {
        let question = request.question.trim();
        if question.is_empty() {
            return Err(FaqError::InvalidQuery("please enter a question".into()));
        }

        let filter = self.catalog.category_filter(request.category.as_deref())?;
        let time_range = match (request.start_date, request.end_date) {
            (Some(start), Some(end)) => Some(TimeRange::from_dates(start, end)?),
            (None, None) => None,
            _ => {
                return Err(FaqError::InvalidQuery(
                    "a date range needs both a start and an end date".into(),
                ))
            }
        };

        let query = SearchQuery::new(question)
            .with_limit(request.limit.unwrap_or(self.default_limit))
            .with_filter(filter)
            .with_time_range(time_range);
        query.validate()?;
        Ok(query)
    }

    /// Search, then synthesize. A retrieval failure means synthesis never runs.
    pub async fn ask(&self, request: &AskRequest) -> Result<AskOutcome, FaqError> {
        let query = self.build_query(request)?;
        info!(
            question = %query.text,
            category = ?request.category,
            limit = query.limit,
            "FAQ query started"
        );

        let results = self.vector_store.search(&query).await?;
        let answer = self
            .synthesizer
            .generate_response(&query.text, &results)
            .await?;

        info!(
            results = results.len(),
            enough_context = answer.enough_context,
            "FAQ query complete"
        );
        Ok(AskOutcome {
            question: query.text,
            answer,
            results,
        })
    }
}
