use crate::session::Role;
use crate::state::Context;

/// Forget this channel's conversation and document context
#[poise::command(slash_command, guild_only)]
pub async fn clear(ctx: Context<'_>) -> Result<(), anyhow::Error> {
    if ctx.data().end_session(ctx.channel_id().get()).await {
        ctx.say("Session cleared.").await?;
    } else {
        ctx.say("No active session in this channel.").await?;
    }
    Ok(())
}

/// Show recent turns in this channel
#[poise::command(slash_command, guild_only)]
pub async fn history(
    ctx: Context<'_>,
    #[description = "Number of turns to show"] limit: Option<u32>,
) -> Result<(), anyhow::Error> {
    let limit = limit.unwrap_or(10) as usize;
    let session = ctx.data().session(ctx.channel_id().get()).await;
    let session = session.lock().await;
    let turns = session.history();

    if turns.is_empty() {
        ctx.say("No conversation yet.").await?;
        return Ok(());
    }

    let mut output = String::from("**Conversation**\n\n");
    for turn in &turns[turns.len().saturating_sub(limit)..] {
        let speaker = match turn.role {
            Role::User => "You",
            Role::Assistant => "Assistant",
        };
        output.push_str(&format!("**{}:** {}\n", speaker, turn.content));
        if let Some(path) = &turn.file_path {
            output.push_str(&format!("  File: `{}`\n", path));
        }
    }
    drop(session);

    super::send_chunked(&ctx, &output).await
}
