use tracing::{info, warn};

use super::send_chunked;
use crate::assistant::AskRequest;
use crate::render::render_markdown;
use crate::state::Context;
use crate::store::types::parse_date;

/// Ask a question of the FAQ knowledge base
#[poise::command(slash_command, guild_only)]
pub async fn ask(
    ctx: Context<'_>,
    #[description = "Your question"] question: String,
    #[description = "Category filter (default: All)"]
    #[autocomplete = "autocomplete_category"]
    category: Option<String>,
    #[description = "Start date, YYYY-MM-DD (needs end_date)"] start_date: Option<String>,
    #[description = "End date, YYYY-MM-DD, inclusive"] end_date: Option<String>,
) -> Result<(), anyhow::Error> {
    ctx.defer().await?;

    let config = ctx.data().search_config.read().await;
    let limit = config.limit;
    let show_results = config.show_results;
    drop(config);

    info!(
        user = ctx.author().name,
        question,
        category = ?category,
        "FAQ ask received"
    );

    let request = match parse_dates(start_date.as_deref(), end_date.as_deref()) {
        Ok((start_date, end_date)) => AskRequest {
            question,
            category,
            start_date,
            end_date,
            limit: Some(limit),
        },
        Err(e) => {
            ctx.say(format!("**Error ({}):** {}", e.stage(), e)).await?;
            return Ok(());
        }
    };

    match ctx.data().assistant.ask(&request).await {
        Ok(outcome) => {
            let text = format!(
                "<@{}> here's what I found:\n\n{}",
                ctx.author().id,
                render_markdown(&outcome, show_results)
            );
            send_chunked(&ctx, &text).await
        }
        Err(e) => {
            warn!(stage = e.stage(), error = %e, "FAQ ask failed");
            ctx.say(format!("**Error ({}):** {}", e.stage(), e)).await?;
            Ok(())
        }
    }
}

type DatePair = (Option<chrono::NaiveDate>, Option<chrono::NaiveDate>);

fn parse_dates(start: Option<&str>, end: Option<&str>) -> Result<DatePair, crate::error::FaqError> {
    let parse = |raw: Option<&str>| {
        raw.map(str::trim)
            .filter(|s| !s.is_empty())
            .map(parse_date)
            .transpose()
    };
    Ok((parse(start)?, parse(end)?))
}

/// Autocomplete for category names from the configured catalog.
async fn autocomplete_category(ctx: Context<'_>, partial: &str) -> Vec<String> {
    let partial = partial.to_lowercase();
    ctx.data()
        .assistant
        .catalog()
        .selector_options()
        .into_iter()
        .filter(|c| c.to_lowercase().contains(&partial))
        .take(25)
        .map(str::to_string)
        .collect()
}
