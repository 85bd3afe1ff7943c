use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::config::ModelProfiles;
use crate::docs::DocumentStore;
use crate::llm::Embedder;
use crate::session::Session;
use crate::strategy::sentinel::NetworkProbe;
use crate::strategy::StrategyController;

pub type SharedSession = Arc<Mutex<Session>>;

/// Archive label and session key for a channel.
pub fn session_key(channel_id: u64) -> String {
    format!("channel:{}", channel_id)
}

pub struct AppState {
    pub store: Arc<DocumentStore>,
    pub embedder: Arc<dyn Embedder>,
    pub sentinel: Arc<dyn NetworkProbe>,
    pub controller: Arc<StrategyController>,
    pub admin_ids: HashSet<u64>,
    /// Backend profiles (admins can modify at runtime).
    pub models: Arc<RwLock<ModelProfiles>>,
    /// One session per channel. The mutex serializes turns and uploads.
    pub sessions: RwLock<HashMap<u64, SharedSession>>,
}

impl AppState {
    pub fn is_admin(&self, user_id: u64) -> bool {
        self.admin_ids.contains(&user_id)
    }

    pub async fn session(&self, channel_id: u64) -> SharedSession {
        if let Some(existing) = self.sessions.read().await.get(&channel_id) {
            return existing.clone();
        }
        let mut sessions = self.sessions.write().await;
        sessions
            .entry(channel_id)
            .or_insert_with(|| Arc::new(Mutex::new(Session::new(session_key(channel_id)))))
            .clone()
    }

    /// Tear down a channel's session. Returns false if none existed.
    pub async fn end_session(&self, channel_id: u64) -> bool {
        self.sessions.write().await.remove(&channel_id).is_some()
    }
}

pub type Context<'a> = poise::Context<'a, AppState, anyhow::Error>;
