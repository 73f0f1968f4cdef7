use super::require_admin;
use crate::state::Context;
use crate::store::types::MAX_LIMIT;

/// Configure search parameters (admin only)
#[poise::command(slash_command, guild_only)]
pub async fn config(
    ctx: Context<'_>,
    #[description = "limit | show_results"] param: Option<String>,
    #[description = "New value"] value: Option<String>,
) -> Result<(), anyhow::Error> {
    if !require_admin(&ctx).await? {
        return Ok(());
    }

    match (param.as_deref(), value.as_deref()) {
        // Show current config
        (None, _) => {
            let config = ctx.data().search_config.read().await;
            ctx.say(format!(
                "**Search Configuration:**\n\
                 `limit`: {}\n\
                 `show_results`: {}",
                config.limit, config.show_results
            ))
            .await?;
        }
        (Some(key), Some(raw)) => {
            let reply = apply(&mut *ctx.data().search_config.write().await, key, raw);
            ctx.say(reply).await?;
        }
        (Some(_), None) => {
            ctx.say("Provide both `param` and `value`. Example: `/faq config limit 5`")
                .await?;
        }
    }

    Ok(())
}

fn apply(config: &mut crate::state::SearchConfig, key: &str, raw: &str) -> String {
    match key {
        "limit" => match raw.trim().parse::<usize>() {
            Ok(limit) if (1..=MAX_LIMIT).contains(&limit) => {
                config.limit = limit;
                format!("`limit` set to {}", limit)
            }
            _ => format!("`limit` must be between 1 and {}, got `{}`", MAX_LIMIT, raw),
        },
        "show_results" => match raw.trim().parse::<bool>() {
            Ok(show) => {
                config.show_results = show;
                format!("`show_results` set to {}", show)
            }
            Err(_) => format!("`show_results` must be `true` or `false`, got `{}`", raw),
        },
        _ => format!("Unknown param `{}`. Valid: `limit`, `show_results`", key),
    }
}
