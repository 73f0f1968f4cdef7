mod ask;
mod catalog;
mod config;
mod ingest;

use crate::render::chunk_message;
use crate::state::Context;

/// Discord messages are capped at 2000 characters.
const DISCORD_CHUNK: usize = 1990;

/// FAQ Assistant - answers from the FAQ knowledge base
#[poise::command(
    slash_command,
    subcommands(
        "ask::ask",
        "catalog::examples",
        "catalog::categories",
        "ingest::ingest",
        "config::config"
    )
)]
pub async fn faq(_ctx: Context<'_>) -> Result<(), anyhow::Error> {
    Ok(())
}

/// Send a message in Discord-safe chunks.
/// Uses ctx.say() for all chunks: poise routes follow-ups through the
/// interaction webhook, which doesn't require Send Messages channel permission.
async fn send_chunked(ctx: &Context<'_>, text: &str) -> Result<(), anyhow::Error> {
    for chunk in chunk_message(text, DISCORD_CHUNK) {
        ctx.say(chunk).await?;
    }
    Ok(())
}

/// Replies with a refusal and returns false when the caller is not an admin.
async fn require_admin(ctx: &Context<'_>) -> Result<bool, anyhow::Error> {
    if ctx.data().is_admin(ctx.author().id.get()) {
        return Ok(true);
    }
    ctx.say("This command is admin-only.").await?;
    Ok(false)
}
