use serde::{Deserialize, Serialize};

/// Content-addressed document ID (blake3 hex hash).
pub type DocId = String;

/// Metadata archived next to each uploaded document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocMeta {
    pub id: DocId,
    pub name: String,
    /// e.g. "attachment:notes.txt" or "url:https://..."
    pub source: String,
    /// Session key the upload belongs to
    pub label: String,
    pub size: usize,
    pub chunks: usize,
    pub ingested_at: i64,
}
