use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, warn};

use crate::config::{DEEP_SEARCH_RESULTS, SHALLOW_SEARCH_RESULTS};
use crate::strategy::mode::ReasoningMode;

pub const NO_LIVE_DATA: &str = "No live data found. Search engines returned empty results.";

/// Live web lookup. Always yields text: failures come back as descriptive strings.
#[async_trait]
pub trait WebSearch: Send + Sync {
    async fn search(&self, query: &str, mode: ReasoningMode) -> String;
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Debug, Clone, Copy)]
enum SearchSource {
    General,
    News,
}

impl SearchSource {
    fn category(self) -> &'static str {
        match self {
            SearchSource::General => "general",
            SearchSource::News => "news",
        }
    }
}

pub fn result_limit(mode: ReasoningMode) -> usize {
    match mode {
        ReasoningMode::FastResponse => SHALLOW_SEARCH_RESULTS,
        ReasoningMode::Standard | ReasoningMode::DeepReasoning => DEEP_SEARCH_RESULTS,
    }
}

fn clean_query(query: &str) -> String {
    query.replace("now", "").trim().to_string()
}

pub fn format_hits(hits: &[SearchHit]) -> String {
    hits.iter()
        .map(|hit| {
            let snippet = hit
                .content
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or("No details available.");
            format!(
                "Title: {}\nSource: {}\nSnippet: {}",
                hit.title, hit.url, snippet
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// SearXNG-compatible JSON search client: general results first, news as fallback.
pub struct WebSearchTool {
    client: reqwest::Client,
    base_url: String,
}

impl WebSearchTool {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(20))
            .build()
            .context("Failed to create search HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn fetch(&self, query: &str, source: SearchSource, limit: usize) -> Result<Vec<SearchHit>> {
        let resp = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[
                ("q", query),
                ("format", "json"),
                ("categories", source.category()),
            ])
            .send()
            .await
            .context("search request failed")?;

        let status = resp.status();
        if !status.is_success() {
            bail!("search provider returned {}", status);
        }

        let mut parsed: SearchResponse =
            resp.json().await.context("Failed to parse search JSON")?;
        parsed.results.truncate(limit);
        Ok(parsed.results)
    }

    async fn lookup(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
        let hits = self.fetch(query, SearchSource::General, limit).await?;
        if !hits.is_empty() {
            return Ok(hits);
        }
        info!(query, "Text search empty, trying news");
        self.fetch(query, SearchSource::News, limit).await
    }
}

#[async_trait]
impl WebSearch for WebSearchTool {
    async fn search(&self, query: &str, mode: ReasoningMode) -> String {
        let query = clean_query(query);
        let limit = result_limit(mode);
        info!(%mode, limit, query = %query, "Adaptive web search");

        match self.lookup(&query, limit).await {
            Ok(hits) if hits.is_empty() => NO_LIVE_DATA.to_string(),
            Ok(hits) => format_hits(&hits),
            Err(e) => {
                warn!("Web search failed: {:#}", e);
                let detail: String = format!("{:#}", e).chars().take(50).collect();
                format!(
                    "Search Error: The search provider is unreachable. (Detail: {})",
                    detail
                )
            }
        }
    }
}
