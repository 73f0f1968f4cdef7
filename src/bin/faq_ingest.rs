use std::path::PathBuf;

use clap::{ArgGroup, Parser};
use tracing::info;

use faq_assistant::config::Settings;
use faq_assistant::llm::http_client;
use faq_assistant::logging;
use faq_assistant::store::ingest::{ingest_path, ingest_url};
use faq_assistant::store::VectorStore;

/// Load an FAQ dataset (JSON array of {question, answer, category, created_at?})
/// into the configured store.
#[derive(Debug, Parser)]
#[command(name = "faq-ingest", version)]
#[command(group(ArgGroup::new("source").required(true).args(["file", "url"])))]
struct Args {
    /// Dataset file on disk.
    #[arg(long)]
    file: Option<PathBuf>,
    /// Dataset URL.
    #[arg(long)]
    url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();
    let args = Args::parse();

    let settings = Settings::from_env()?;
    let client = http_client(&settings.provider)?;
    let store = VectorStore::from_settings(&settings, client).await?;

    let report = match (&args.file, &args.url) {
        (Some(path), _) => ingest_path(&store, path).await?,
        (None, Some(url)) => ingest_url(&store, url).await?,
        (None, None) => anyhow::bail!("one of --file or --url is required"),
    };

    for (category, count) in &report.by_category {
        info!(category = %category, count, "ingested");
    }
    println!("Ingested {} entries", report.inserted);
    Ok(())
}
