use poise::serenity_prelude as serenity;
use tracing::info;

use crate::docs::ingest as doc_ingest;
use crate::state::Context;

/// Load a document into this channel's knowledge base (replaces the previous one)
#[poise::command(slash_command, guild_only)]
pub async fn upload(
    ctx: Context<'_>,
    #[description = "PDF, text, Markdown, CSV or HTML file"] file: Option<serenity::Attachment>,
    #[description = "Web page URL"] url: Option<String>,
) -> Result<(), anyhow::Error> {
    let (name, source, text) = match (file, url) {
        (Some(file), None) => {
            ctx.defer().await?;
            let bytes = file.download().await?;
            let text = doc_ingest::decode_attachment(
                &file.filename,
                file.content_type.as_deref(),
                &bytes,
            )?;
            let source = format!("attachment:{}", file.filename);
            (file.filename, source, text)
        }
        (None, Some(url)) => {
            ctx.defer().await?;
            let (name, text) = doc_ingest::fetch_url(&url).await?;
            (name, format!("url:{}", url), text)
        }
        _ => {
            ctx.say("Provide exactly one of `file` or `url`.").await?;
            return Ok(());
        }
    };

    info!(user = ctx.author().name, name, source, "Upload started");

    let data = ctx.data();
    let session = data.session(ctx.channel_id().get()).await;
    let mut session = session.lock().await;

    let meta = doc_ingest::ingest_document(
        &data.store,
        data.embedder.as_ref(),
        &mut session,
        &name,
        &source,
        &text,
    )
    .await?;

    ctx.say(format!(
        "Loaded **{}** ({} chunks, {} bytes). Questions in this channel will now consult it.\nDoc ID: `{}`",
        meta.name, meta.chunks, meta.size, meta.id
    ))
    .await?;

    Ok(())
}

/// Make a previously uploaded document the active one again
#[poise::command(slash_command, guild_only)]
pub async fn reload(
    ctx: Context<'_>,
    #[description = "Doc ID (prefix shown by /assistant sources)"] doc_id: String,
) -> Result<(), anyhow::Error> {
    ctx.defer().await?;

    let data = ctx.data();
    let session = data.session(ctx.channel_id().get()).await;
    let mut session = session.lock().await;

    let meta = doc_ingest::restore_document(
        &data.store,
        data.embedder.as_ref(),
        &mut session,
        &doc_id,
    )
    .await?;

    ctx.say(format!(
        "Reloaded **{}** ({} chunks). Questions in this channel will now consult it.",
        meta.name, meta.chunks
    ))
    .await?;

    Ok(())
}
