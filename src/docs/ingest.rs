use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use super::types::DocMeta;
use super::DocumentStore;
use crate::llm::Embedder;
use crate::session::Session;
use crate::tools::knowledge::KnowledgeBase;

fn html_to_text(body: &[u8]) -> String {
    html2text::from_read(body, 120).unwrap_or_else(|_| String::from_utf8_lossy(body).to_string())
}

/// Fetch a web page as plain text. Returns (name, text).
pub async fn fetch_url(url: &str) -> Result<(String, String)> {
    let resp = reqwest::get(url).await.context("Failed to fetch URL")?;
    let status = resp.status();
    if !status.is_success() {
        bail!("{} returned {}", url, status);
    }

    let content_type = resp
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let body = resp.bytes().await.context("Failed to read response body")?;

    // Convert HTML to text if applicable
    let text = if content_type.contains("html") {
        html_to_text(&body)
    } else {
        String::from_utf8_lossy(&body).to_string()
    };

    let name = url
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(url)
        .to_string();
    Ok((name, text))
}

/// Page text in page order. Pages without extractable text are skipped.
fn extract_pdf_text(bytes: &[u8]) -> Result<String> {
    let doc = lopdf::Document::load_mem(bytes).context("Not a readable PDF")?;
    let mut text = String::new();
    for page in doc.get_pages().into_keys() {
        match doc.extract_text(&[page]) {
            Ok(page_text) => text.push_str(&page_text),
            Err(e) => warn!(page, "Skipping PDF page without text: {}", e),
        }
    }
    if text.trim().is_empty() {
        bail!("PDF has no extractable text (scanned pages are not supported)");
    }
    Ok(text)
}

/// Decode a chat attachment into text: PDF, HTML, or any UTF-8 text format.
pub fn decode_attachment(filename: &str, content_type: Option<&str>, bytes: &[u8]) -> Result<String> {
    let lower = filename.to_lowercase();
    let content_type = content_type.unwrap_or("").to_lowercase();

    if content_type.contains("pdf") || lower.ends_with(".pdf") {
        return extract_pdf_text(bytes).with_context(|| format!("Failed to read {}", filename));
    }
    if content_type.contains("html") || lower.ends_with(".html") || lower.ends_with(".htm") {
        return Ok(html_to_text(bytes));
    }

    let text = std::str::from_utf8(bytes)
        .with_context(|| format!("{} is not UTF-8 text", filename))?;
    Ok(text.to_string())
}

/// Upload path: embed, archive, then swap the session corpus.
/// The session is left untouched when any step fails.
pub async fn ingest_document(
    store: &DocumentStore,
    embedder: &dyn Embedder,
    session: &mut Session,
    name: &str,
    source: &str,
    text: &str,
) -> Result<DocMeta> {
    let knowledge = KnowledgeBase::build(embedder, text)
        .await
        .with_context(|| format!("Failed to index {}", name))?;

    let meta = store
        .store(text.as_bytes(), name, source, session.key(), knowledge.len())
        .await?;

    info!(
        doc_id = %meta.id,
        chunks = knowledge.len(),
        size = meta.size,
        session = session.key(),
        "Document ingested"
    );
    session.load_knowledge(knowledge);
    Ok(meta)
}

/// Rebuild the session corpus from an archived upload of the same session.
/// `id_prefix` may be the short ID shown by the sources listing.
pub async fn restore_document(
    store: &DocumentStore,
    embedder: &dyn Embedder,
    session: &mut Session,
    id_prefix: &str,
) -> Result<DocMeta> {
    let id_prefix = id_prefix.trim();
    if id_prefix.is_empty() {
        bail!("Document ID cannot be empty");
    }
    let mut matches: Vec<DocMeta> = store
        .list_by_label(session.key())
        .await?
        .into_iter()
        .filter(|m| m.id.starts_with(id_prefix))
        .collect();
    let meta = match matches.len() {
        0 => bail!("No document `{}` was uploaded in this session", id_prefix),
        1 => matches.remove(0),
        n => bail!("`{}` matches {} documents; use a longer ID", id_prefix, n),
    };

    let bytes = store.get_content(&meta.id).await?;
    let text = String::from_utf8(bytes).context("Archived document is not UTF-8 text")?;
    let knowledge = KnowledgeBase::build(embedder, &text)
        .await
        .with_context(|| format!("Failed to index {}", meta.name))?;

    info!(doc_id = %meta.id, chunks = knowledge.len(), session = session.key(), "Document restored");
    session.load_knowledge(knowledge);
    Ok(meta)
}
