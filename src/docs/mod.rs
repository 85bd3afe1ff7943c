pub mod ingest;
pub mod types;

use std::path::Path;

use anyhow::{Context, Result};
use cnidarium::{StateDelta, StateRead, StateWrite, Storage};
use futures::StreamExt;
use tracing::{debug, warn};

use types::{DocId, DocMeta};

// No trailing slashes on prefixes
const CONTENT_PREFIX: &str = "doc/content";
const META_PREFIX: &str = "doc/meta";
const LABEL_PREFIX: &str = "doc/label";

fn content_key(id: &str) -> String {
    format!("{}/{}", CONTENT_PREFIX, id)
}
fn meta_key(id: &str) -> String {
    format!("{}/{}", META_PREFIX, id)
}
fn label_key(label: &str, id: &str) -> String {
    format!("{}/{}:{}", LABEL_PREFIX, label, id)
}

/// Archive of uploaded document text, indexed by session label.
pub struct DocumentStore {
    storage: Storage,
}

impl DocumentStore {
    pub async fn new(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)?;
        let prefixes = vec![
            CONTENT_PREFIX.to_string(),
            META_PREFIX.to_string(),
            LABEL_PREFIX.to_string(),
        ];
        let storage = Storage::load(data_dir.to_path_buf(), prefixes)
            .await
            .context("Failed to init cnidarium storage")?;
        Ok(Self { storage })
    }

    /// Archive a document. Same content = same ID.
    pub async fn store(
        &self,
        content: &[u8],
        name: &str,
        source: &str,
        label: &str,
        chunks: usize,
    ) -> Result<DocMeta> {
        let id: DocId = blake3::hash(content).to_hex().to_string();

        let meta = DocMeta {
            id: id.clone(),
            name: name.to_string(),
            source: source.to_string(),
            label: label.to_string(),
            size: content.len(),
            chunks,
            ingested_at: chrono::Utc::now().timestamp(),
        };

        let snapshot = self.storage.latest_snapshot();
        let mut delta = StateDelta::new(snapshot);

        delta.put_raw(content_key(&id), content.to_vec());
        delta.put_raw(
            meta_key(&id),
            serde_json::to_vec(&meta).context("serialize meta")?,
        );
        // Presence is the index; value is empty
        delta.put_raw(label_key(label, &id), vec![]);

        self.storage.commit(delta).await?;
        debug!(doc_id = %id, name, label, size = content.len(), "document archived");
        Ok(meta)
    }

    pub async fn get_meta(&self, doc_id: &str) -> Result<DocMeta> {
        let snapshot = self.storage.latest_snapshot();
        let bytes = snapshot
            .get_raw(&meta_key(doc_id))
            .await?
            .ok_or_else(|| anyhow::anyhow!("document metadata not found: {}", doc_id))?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub async fn get_content(&self, doc_id: &str) -> Result<Vec<u8>> {
        let snapshot = self.storage.latest_snapshot();
        snapshot
            .get_raw(&content_key(doc_id))
            .await?
            .ok_or_else(|| anyhow::anyhow!("document not found: {}", doc_id))
    }

    /// Documents uploaded under `label`, newest first.
    pub async fn list_by_label(&self, label: &str) -> Result<Vec<DocMeta>> {
        let snapshot = self.storage.latest_snapshot();
        let prefix = format!("{}/{}:", LABEL_PREFIX, label);
        let mut stream = snapshot.prefix_raw(&prefix);
        let mut results = Vec::new();

        while let Some(entry) = stream.next().await {
            match entry {
                Ok((key, _)) => {
                    // Key format: "doc/label/{label}:{doc_id}"
                    if let Some(doc_id) = key.strip_prefix(&prefix) {
                        match self.get_meta(doc_id).await {
                            Ok(meta) => results.push(meta),
                            Err(e) => warn!("Failed to get meta for {}: {}", doc_id, e),
                        }
                    }
                }
                Err(e) => {
                    warn!("Error reading label index: {}", e);
                }
            }
        }

        results.sort_by(|a, b| b.ingested_at.cmp(&a.ingested_at));
        Ok(results)
    }
}
