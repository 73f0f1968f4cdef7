use super::require_admin;
use crate::state::Context;
use crate::store::ingest::ingest_url;
use tracing::info;

/// Ingest an FAQ dataset (JSON array of entries) from a URL (admin only)
#[poise::command(slash_command, guild_only)]
pub async fn ingest(
    ctx: Context<'_>,
    #[description = "URL of a JSON FAQ dataset"] url: String,
) -> Result<(), anyhow::Error> {
    if !require_admin(&ctx).await? {
        return Ok(());
    }
    ctx.defer().await?;

    info!(user = ctx.author().name, url, "Ingestion started");

    let store = ctx.data().assistant.vector_store();
    let report = ingest_url(store, &url).await?;

    let mut output = format!("Ingested **{}** entries from <{}>\n", report.inserted, url);
    for (category, count) in &report.by_category {
        output.push_str(&format!("- {}: {}\n", category, count));
    }
    ctx.say(output).await?;

    Ok(())
}
