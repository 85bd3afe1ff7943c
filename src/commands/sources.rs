use crate::state::{session_key, Context};

/// List documents uploaded in this channel
#[poise::command(slash_command, guild_only)]
pub async fn sources(
    ctx: Context<'_>,
    #[description = "Max documents to show"] limit: Option<u32>,
) -> Result<(), anyhow::Error> {
    let limit = limit.unwrap_or(20) as usize;
    let label = session_key(ctx.channel_id().get());
    let docs = ctx.data().store.list_by_label(&label).await?;

    if docs.is_empty() {
        ctx.say("No documents uploaded here yet. Use `/assistant upload` to add one.")
            .await?;
        return Ok(());
    }

    let mut output = String::from(
        "**Uploaded Documents** (use `/assistant reload` with an ID to switch)\n\n",
    );
    for doc in docs.iter().take(limit) {
        let size_kb = doc.size / 1024;
        let uploaded = chrono::DateTime::from_timestamp(doc.ingested_at, 0)
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        output.push_str(&format!(
            "- {} ({} KB, {} chunks) `{}`\n  Source: {} | {}\n",
            doc.name,
            size_kb,
            doc.chunks,
            &doc.id[..12],
            doc.source,
            uploaded
        ));
    }

    super::send_chunked(&ctx, &output).await
}
