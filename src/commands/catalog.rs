use super::send_chunked;
use crate::state::Context;

/// Show example questions for this FAQ
#[poise::command(slash_command, guild_only)]
pub async fn examples(ctx: Context<'_>) -> Result<(), anyhow::Error> {
    let catalog = ctx.data().assistant.catalog();

    let mut output = format!("**{}**\n{}\n\n**Try asking:**\n", catalog.title, catalog.description);
    for example in catalog.examples {
        output.push_str(&format!("- `/faq ask question:{}`\n", example));
    }
    send_chunked(&ctx, &output).await
}

/// List FAQ categories with the number of stored entries in each
#[poise::command(slash_command, guild_only)]
pub async fn categories(ctx: Context<'_>) -> Result<(), anyhow::Error> {
    ctx.defer().await?;

    let assistant = &ctx.data().assistant;
    let catalog = assistant.catalog();
    let store = assistant.vector_store();

    let total = store.count(None).await?;
    if total == 0 {
        ctx.say("No FAQ entries stored yet. Use `/faq ingest` to add some.")
            .await?;
        return Ok(());
    }

    let mut output = format!("**{}** ({} entries)\n\n", catalog.title, total);
    for category in catalog.categories {
        let filter = catalog.category_filter(Some(category))?;
        let count = store.count(filter.as_ref()).await?;
        output.push_str(&format!("- {}: {}\n", category, count));
    }

    send_chunked(&ctx, &output).await
}
