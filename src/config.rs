use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

/// Below this average round trip the network is healthy enough for deep reasoning.
pub const LATENCY_THRESHOLD_FAST_MS: f64 = 300.0;
/// At or above this the network is considered poor and answers go fast.
pub const LATENCY_THRESHOLD_POOR_MS: f64 = 1000.0;
/// Reported when any ping fails.
pub const LATENCY_FAILURE_MS: f64 = 9999.0;

pub const SENTINEL_RUNS: usize = 3;
pub const SENTINEL_TIMEOUT: Duration = Duration::from_secs(2);

pub const SHALLOW_SEARCH_RESULTS: usize = 3;
pub const DEEP_SEARCH_RESULTS: usize = 8;

pub const RAG_CHUNK_CHARS: usize = 500;
pub const RAG_TOP_K: usize = 3;

fn var_or(key: &str, default: &str) -> String {
    dotenv::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Backend profile names. DEEP_REASONING runs on `large`, everything else on `small`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelProfiles {
    pub large: String,
    pub small: String,
}

impl Default for ModelProfiles {
    fn default() -> Self {
        Self {
            large: "mistral-large-latest".to_string(),
            small: "mistral-small-latest".to_string(),
        }
    }
}

pub struct AssistantConfig {
    pub discord_token: String,
    pub guild_id: Option<u64>,
    pub admin_ids: HashSet<u64>,
    pub llm_base_url: String,
    pub llm_api_key: Option<String>,
    pub models: ModelProfiles,
    pub embed_model: String,
    pub search_base_url: String,
    pub sentinel_target: String,
    pub data_dir: PathBuf,
}

impl AssistantConfig {
    pub fn from_env() -> Result<Self> {
        let _ = dotenv::dotenv();

        let discord_token = dotenv::var("DISCORD_TOKEN").context("DISCORD_TOKEN required")?;
        let guild_id = dotenv::var("DISCORD_GUILD_ID")
            .ok()
            .and_then(|s| s.parse::<u64>().ok());
        let admin_ids = parse_id_list(&dotenv::var("ADMIN_USER_IDS").unwrap_or_default());

        let defaults = ModelProfiles::default();
        let models = ModelProfiles {
            large: var_or("LLM_MODEL_LARGE", &defaults.large),
            small: var_or("LLM_MODEL_SMALL", &defaults.small),
        };

        Ok(Self {
            discord_token,
            guild_id,
            admin_ids,
            llm_base_url: var_or("LLM_BASE_URL", "https://api.mistral.ai/v1"),
            llm_api_key: dotenv::var("LLM_API_KEY").ok().filter(|k| !k.is_empty()),
            models,
            embed_model: var_or("EMBED_MODEL", "mistral-embed"),
            search_base_url: var_or("SEARCH_BASE_URL", "http://localhost:8888"),
            sentinel_target: var_or("SENTINEL_TARGET", "https://1.1.1.1"),
            data_dir: PathBuf::from(var_or("DATA_DIR", "./data")),
        })
    }
}

fn parse_id_list(raw: &str) -> HashSet<u64> {
    raw.split(',')
        .filter_map(|s| s.trim().parse::<u64>().ok())
        .collect()
}
