use std::path::Path;

use poise::serenity_prelude as serenity;
use tracing::{error, info, warn};

use super::send_chunked;
use crate::state::Context;
use crate::strategy::mode::UserOverride;
use crate::strategy::reply::{parse_reply, ParsedReply};
use crate::strategy::{Route, TurnPlan};

#[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
pub enum ModeChoice {
    #[name = "Auto (Network)"]
    Auto,
    #[name = "Deep Reasoning"]
    Deep,
    #[name = "Standard"]
    Standard,
    #[name = "Fast Response"]
    Fast,
}

impl From<ModeChoice> for UserOverride {
    fn from(choice: ModeChoice) -> Self {
        match choice {
            ModeChoice::Auto => UserOverride::Auto,
            ModeChoice::Deep => UserOverride::Deep,
            ModeChoice::Standard => UserOverride::Standard,
            ModeChoice::Fast => UserOverride::Fast,
        }
    }
}

/// Ask the assistant anything
#[poise::command(slash_command, guild_only)]
pub async fn ask(
    ctx: Context<'_>,
    #[description = "Your question"] query: String,
    #[description = "Reasoning mode (defaults to network-driven)"] mode: Option<ModeChoice>,
) -> Result<(), anyhow::Error> {
    ctx.defer().await?;

    let user_override: UserOverride = mode.map(Into::into).unwrap_or_default();
    let channel_id = ctx.channel_id().get();
    info!(user = ctx.author().name, channel_id, query, ?user_override, "Query received");

    let session = ctx.data().session(channel_id).await;
    let mut session = session.lock().await;

    let turn = match ctx
        .data()
        .controller
        .execute(&session, &query, user_override)
        .await
    {
        Ok(turn) => turn,
        Err(e) => {
            error!("Turn failed: {:#}", e);
            ctx.say(format!("Generation failed: {}", e)).await?;
            return Ok(());
        }
    };

    let plan = turn.plan.clone();
    let raw = match turn.collect().await {
        Ok(raw) => raw,
        Err(e) => {
            error!("Reply stream failed: {:#}", e);
            ctx.say(format!("Generation failed mid-reply: {}", e)).await?;
            return Ok(());
        }
    };

    let reply = parse_reply(&raw);
    session.record_exchange(&query, &reply);
    drop(session);

    info!(
        route = ?plan.route,
        mode = %plan.effective_mode,
        answer_len = reply.answer.len(),
        file = ?reply.file_path,
        "Turn complete"
    );

    let mut text = render_reply(&plan, &reply);

    let attachment = match reply.file_path.as_deref() {
        Some(path) if Path::new(path).exists() => {
            match serenity::CreateAttachment::path(path).await {
                Ok(a) => Some(a),
                Err(e) => {
                    warn!(path, "Failed to attach generated file: {}", e);
                    text.push_str(&format!("\n\n_File could not be attached: `{}`_", path));
                    None
                }
            }
        }
        Some(path) => {
            text.push_str(&format!("\n\n_File unavailable: `{}`_", path));
            None
        }
        None => None,
    };

    match attachment {
        Some(file) if text.len() <= 1990 => {
            ctx.send(poise::CreateReply::default().content(text).attachment(file))
                .await?;
        }
        Some(file) => {
            send_chunked(&ctx, &text).await?;
            ctx.send(poise::CreateReply::default().attachment(file)).await?;
        }
        None => send_chunked(&ctx, &text).await?,
    }

    Ok(())
}

/// Answer first, then the strategy line and the model's reasoning behind a spoiler.
fn render_reply(plan: &TurnPlan, reply: &ParsedReply) -> String {
    let mut tools = Vec::new();
    if plan.web_engaged {
        tools.push("web");
    }
    if plan.rag_engaged {
        tools.push("documents");
    }
    if plan.route == Route::Document {
        tools.push("file generation");
    }
    let tools = if tools.is_empty() {
        "none".to_string()
    } else {
        tools.join(", ")
    };

    let answer = reply.answer.trim();
    let mut out = if answer.is_empty() {
        "_(empty reply)_".to_string()
    } else {
        answer.to_string()
    };

    let mode = if plan.social {
        format!("{} (small talk)", plan.effective_mode)
    } else {
        plan.effective_mode.to_string()
    };
    out.push_str(&format!(
        "\n\n-# Mode: {} | Model: {} | Intent: {} | Tools: {}",
        mode, plan.model, plan.intent, tools
    ));

    let thought = reply.thought.trim();
    if !thought.is_empty() {
        out.push_str(&format!("\n**Internal logic:**\n||{}||", thought.replace("||", "|")));
    }
    out
}
