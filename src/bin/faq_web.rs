use std::sync::Arc;

use clap::Parser;

use faq_assistant::config::Settings;
use faq_assistant::logging;
use faq_assistant::web::{self, WebState};
use faq_assistant::FaqAssistant;

/// Serve the FAQ search page and JSON API.
#[derive(Debug, Parser)]
#[command(name = "faq-web", version)]
struct Args {
    /// Bind address; overrides FAQ_WEB_ADDR.
    #[arg(long)]
    addr: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();
    let args = Args::parse();

    let settings = Settings::from_env()?;
    let assistant = Arc::new(FaqAssistant::from_settings(&settings).await?);
    let state = WebState::new(assistant)?;

    let addr = args.addr.unwrap_or_else(|| settings.web_addr.clone());
    web::serve(&addr, state).await
}
