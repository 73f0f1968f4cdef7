use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use super::page::FormView;
use super::WebState;
use crate::assistant::{AskOutcome, AskRequest};
use crate::catalog::ALL_CATEGORIES;
use crate::error::FaqError;
use crate::store::types::parse_date;

const DEFAULT_START_DATE: &str = "2024-01-01";
const DEFAULT_END_DATE: &str = "2024-12-31";

/// Raw query string of the search form. Every field is optional text.
#[derive(Debug, Default, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub use_date_filter: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl SearchForm {
    fn date_filter_on(&self) -> bool {
        non_blank(&self.use_date_filter).is_some_and(|v| v != "off" && v != "false")
    }

    fn view(&self) -> FormView {
        FormView {
            question: self.question.clone(),
            category: non_blank(&self.category).unwrap_or(ALL_CATEGORIES).to_string(),
            use_date_filter: self.date_filter_on(),
            start_date: non_blank(&self.start_date).unwrap_or(DEFAULT_START_DATE).to_string(),
            end_date: non_blank(&self.end_date).unwrap_or(DEFAULT_END_DATE).to_string(),
        }
    }

    /// Dates only count when the checkbox is ticked.
    fn to_request(&self) -> Result<AskRequest, FaqError> {
        let (start_date, end_date) = if self.date_filter_on() {
            let view = self.view();
            (
                Some(parse_date(&view.start_date)?),
                Some(parse_date(&view.end_date)?),
            )
        } else {
            (None, None)
        };
        Ok(AskRequest {
            question: self.question.clone(),
            category: non_blank(&self.category).map(str::to_string),
            start_date,
            end_date,
            limit: None,
        })
    }
}

fn page(
    state: &WebState,
    status: StatusCode,
    form: &SearchForm,
    outcome: Option<&AskOutcome>,
    error: Option<&FaqError>,
) -> Response {
    let catalog = state.assistant.catalog();
    match state.pages.render(catalog, &form.view(), outcome, error) {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn index(State(state): State<WebState>) -> Response {
    page(&state, StatusCode::OK, &SearchForm::default(), None, None)
}

pub async fn search(State(state): State<WebState>, Query(form): Query<SearchForm>) -> Response {
    let result = match form.to_request() {
        Ok(request) => state.assistant.ask(&request).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(outcome) => page(&state, StatusCode::OK, &form, Some(&outcome), None),
        Err(e) => {
            warn!(stage = e.stage(), error = %e, "search failed");
            page(&state, e.status_code(), &form, None, Some(&e))
        }
    }
}

pub async fn api_ask(
    State(state): State<WebState>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskOutcome>, FaqError> {
    let outcome = state.assistant.ask(&request).await?;
    Ok(Json(outcome))
}

pub async fn api_categories(State(state): State<WebState>) -> Json<Value> {
    let catalog = state.assistant.catalog();
    Json(json!({
        "domain": catalog.domain,
        "categories": catalog.selector_options(),
        "examples": catalog.examples,
    }))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
