use anyhow::{bail, Result};
use tracing::{debug, warn};

use crate::config::{RAG_CHUNK_CHARS, RAG_TOP_K};
use crate::llm::Embedder;

#[derive(Debug, Clone)]
struct Chunk {
    text: String,
    vector: Vec<f32>,
}

/// In-memory vector index over one uploaded document.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    chunks: Vec<Chunk>,
}

/// Fixed-size windows of `size` chars, no overlap.
pub fn chunk_text(text: &str, size: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(size.max(1))
        .map(|window| window.iter().collect())
        .collect()
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

impl KnowledgeBase {
    /// Chunk and embed `text` in a single batch.
    pub async fn build(embedder: &dyn Embedder, text: &str) -> Result<Self> {
        let texts = chunk_text(text, RAG_CHUNK_CHARS);
        if texts.is_empty() {
            bail!("document contains no text");
        }

        let vectors = embedder.embed(&texts).await?;
        if vectors.len() != texts.len() {
            bail!(
                "embedding backend returned {} vectors for {} chunks",
                vectors.len(),
                texts.len()
            );
        }

        let chunks = texts
            .into_iter()
            .zip(vectors)
            .map(|(text, vector)| Chunk { text, vector })
            .collect::<Vec<_>>();
        debug!(chunks = chunks.len(), "knowledge base built");
        Ok(Self { chunks })
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Top-k chunks joined by `\n---\n`, best first. Empty corpus yields "".
    pub async fn retrieve(&self, embedder: &dyn Embedder, query: &str) -> String {
        if self.is_empty() {
            return String::new();
        }

        let query_vector = match embedder.embed(&[query.to_string()]).await {
            Ok(mut v) if !v.is_empty() => v.swap_remove(0),
            Ok(_) => {
                warn!("Embedding backend returned no vector for query");
                return "Document retrieval unavailable: no query embedding returned.".to_string();
            }
            Err(e) => {
                warn!("Query embedding failed: {:#}", e);
                let detail: String = format!("{:#}", e).chars().take(50).collect();
                return format!("Document retrieval unavailable. (Detail: {})", detail);
            }
        };

        let mut scored: Vec<(f32, &Chunk)> = self
            .chunks
            .iter()
            .map(|c| (cosine_similarity(&query_vector, &c.vector), c))
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        scored
            .into_iter()
            .take(RAG_TOP_K)
            .map(|(_, c)| c.text.as_str())
            .collect::<Vec<_>>()
            .join("\n---\n")
    }
}
