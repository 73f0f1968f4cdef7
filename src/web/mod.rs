mod handlers;
pub mod page;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::assistant::FaqAssistant;
use crate::error::FaqError;
use page::Pages;

/// Shared handles for the web handlers.
#[derive(Clone)]
pub struct WebState {
    pub assistant: Arc<FaqAssistant>,
    pub pages: Arc<Pages>,
}

impl WebState {
    pub fn new(assistant: Arc<FaqAssistant>) -> Result<Self, FaqError> {
        Ok(Self {
            assistant,
            pages: Arc::new(Pages::new()?),
        })
    }
}

pub fn router(state: WebState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/search", get(handlers::search))
        .route("/api/ask", post(handlers::api_ask))
        .route("/api/categories", get(handlers::api_categories))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(addr: &str, state: WebState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("FAQ web UI listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

impl FaqError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            FaqError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            FaqError::Embedding(_) | FaqError::Retrieval(_) | FaqError::Synthesis(_) => {
                StatusCode::BAD_GATEWAY
            }
            FaqError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for FaqError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.to_string(),
            "stage": self.stage(),
        }));
        (self.status_code(), body).into_response()
    }
}
