use crate::state::Context;

/// Show or change backend models (admin only)
#[poise::command(slash_command, guild_only)]
pub async fn config(
    ctx: Context<'_>,
    #[description = "large_model | small_model"] param: Option<String>,
    #[description = "New model name"] value: Option<String>,
) -> Result<(), anyhow::Error> {
    let user_id = ctx.author().id.get();
    if !ctx.data().is_admin(user_id) {
        ctx.say("This command is admin-only.").await?;
        return Ok(());
    }

    match (param.as_deref(), value) {
        // Show current config
        (None, _) => {
            let models = ctx.data().models.read().await;
            ctx.say(format!(
                "**Model Profiles:**\n\
                 `large_model` (DEEP_REASONING, documents): {}\n\
                 `small_model` (STANDARD, FAST_RESPONSE, routing): {}",
                models.large, models.small
            ))
            .await?;
        }
        // Set a parameter
        (Some(key), Some(val)) => {
            let val = val.trim().to_string();
            if val.is_empty() {
                ctx.say("Model name cannot be empty.").await?;
                return Ok(());
            }
            let mut models = ctx.data().models.write().await;
            match key {
                "large_model" => {
                    models.large = val.clone();
                    ctx.say(format!("`large_model` set to {}", val)).await?;
                }
                "small_model" => {
                    models.small = val.clone();
                    ctx.say(format!("`small_model` set to {}", val)).await?;
                }
                _ => {
                    ctx.say(format!(
                        "Unknown param `{}`. Valid: `large_model`, `small_model`",
                        key
                    ))
                    .await?;
                }
            }
        }
        (Some(_), None) => {
            ctx.say("Provide both `param` and `value`. Example: `/assistant config small_model mistral-small-latest`")
                .await?;
        }
    }

    Ok(())
}
