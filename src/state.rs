use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::assistant::FaqAssistant;

/// Search parameters admins can change at runtime.
pub struct SearchConfig {
    pub limit: usize,
    pub show_results: bool,
}

impl SearchConfig {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            show_results: true,
        }
    }
}

pub struct AppState {
    pub assistant: Arc<FaqAssistant>,
    pub admin_ids: HashSet<u64>,
    pub search_config: Arc<RwLock<SearchConfig>>,
}

impl AppState {
    pub fn new(assistant: Arc<FaqAssistant>, admin_ids: HashSet<u64>) -> Self {
        let limit = assistant.default_limit();
        Self {
            assistant,
            admin_ids,
            search_config: Arc::new(RwLock::new(SearchConfig::new(limit))),
        }
    }

    pub fn is_admin(&self, user_id: u64) -> bool {
        self.admin_ids.contains(&user_id)
    }
}

pub type Context<'a> = poise::Context<'a, AppState, anyhow::Error>;
