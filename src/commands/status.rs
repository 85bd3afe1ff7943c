use crate::state::Context;
use crate::strategy::sentinel::{classify, NetworkProbe};

/// Measure the network and show which strategy Auto mode would pick
#[poise::command(slash_command, guild_only)]
pub async fn status(ctx: Context<'_>) -> Result<(), anyhow::Error> {
    ctx.defer().await?;

    let data = ctx.data();
    let reading = data.sentinel.measure().await;
    let mode = classify(reading);
    let models = data.models.read().await.clone();

    let session = data.session(ctx.channel_id().get()).await;
    let (has_context, chunks, turns) = {
        let session = session.lock().await;
        (
            session.has_context(),
            session.knowledge().len(),
            session.history().len(),
        )
    };

    let latency = if reading.latency_ms >= crate::config::LATENCY_FAILURE_MS {
        "unreachable".to_string()
    } else {
        format!("{:.0} ms", reading.latency_ms)
    };

    ctx.say(format!(
        "**Network:** {}\n\
         **Auto mode:** {} (model `{}`)\n\
         **Models:** large `{}` | small `{}`\n\
         **Document context:** {} ({} chunks)\n\
         **History:** {} turns",
        latency,
        mode,
        models.for_mode(mode),
        models.large,
        models.small,
        if has_context { "on" } else { "off" },
        chunks,
        turns
    ))
    .await?;

    Ok(())
}
