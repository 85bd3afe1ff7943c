mod ask;
mod config;
mod manage;
mod sources;
mod status;
mod upload;

use crate::state::Context;

/// Adaptive assistant: network-aware answers, live search and document tools
#[poise::command(
    slash_command,
    subcommands(
        "ask::ask",
        "upload::upload",
        "upload::reload",
        "status::status",
        "sources::sources",
        "manage::history",
        "manage::clear",
        "config::config"
    )
)]
pub async fn assistant(_ctx: Context<'_>) -> Result<(), anyhow::Error> {
    Ok(())
}

/// Send a message in Discord-safe chunks (max 1990 chars).
/// Follow-ups go through the interaction webhook, so no Send Messages permission is needed.
pub(crate) async fn send_chunked(ctx: &Context<'_>, text: &str) -> Result<(), anyhow::Error> {
    for chunk in split_chunks(text, 1990) {
        ctx.say(chunk).await?;
    }
    Ok(())
}

/// Split on the last newline (or space) before `max` bytes, never inside a char.
fn split_chunks(text: &str, max: usize) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut remaining = text;
    while !remaining.is_empty() {
        let mut chunk_len = remaining.len().min(max);
        while !remaining.is_char_boundary(chunk_len) {
            chunk_len -= 1;
        }
        let split_at = if chunk_len < remaining.len() {
            remaining[..chunk_len]
                .rfind('\n')
                .or_else(|| remaining[..chunk_len].rfind(' '))
                .map(|i| i + 1)
                .unwrap_or(chunk_len)
        } else {
            chunk_len
        };
        chunks.push(&remaining[..split_at]);
        remaining = &remaining[split_at..];
    }
    chunks
}
