pub mod intent;
pub mod mode;
pub mod prompts;
pub mod reply;
pub mod sentinel;

#[cfg(test)]
pub mod testing;

use std::pin::Pin;
use std::sync::Arc;

use anyhow::Result;
use futures::stream::{self, Stream, StreamExt};
use tokio::sync::RwLock;
use tracing::info;

use crate::config::ModelProfiles;
use crate::llm::{Embedder, Generator};
use crate::session::Session;
use crate::tools::document::DocumentTool;
use crate::tools::web::WebSearch;

use intent::{Intent, IntentClassifier};
use mode::{effective_mode, is_social, ReasoningMode, UserOverride};
use sentinel::{classify, NetworkProbe};

/// Substrings that force a web lookup regardless of the classifier.
const LIVE_DATA_KEYWORDS: &[&str] = &["now", "today", "weather"];
/// A query containing "save" plus one of these is a file request.
const SAVE_FORMAT_KEYWORDS: &[&str] = &["pdf", "excel", "word"];

const WEB_SECTION: &str = "[LATEST WEB DATA]";
const DOCUMENT_SECTION: &str = "[DOCUMENT CONTEXT]";

/// One increment of assistant output, whether streamed or synthesized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyChunk {
    Text(String),
}

impl ReplyChunk {
    pub fn text(&self) -> &str {
        match self {
            ReplyChunk::Text(t) => t,
        }
    }
}

pub type ReplyStream = Pin<Box<dyn Stream<Item = Result<ReplyChunk>> + Send>>;

/// Which of the two exclusive paths a turn took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Answer,
    Document,
}

/// Decisions made for a single turn.
#[derive(Debug, Clone)]
pub struct TurnPlan {
    pub social: bool,
    pub resolved_mode: ReasoningMode,
    pub effective_mode: ReasoningMode,
    pub intent: Intent,
    pub model: String,
    pub route: Route,
    pub web_engaged: bool,
    pub rag_engaged: bool,
}

pub struct Turn {
    pub plan: TurnPlan,
    pub stream: ReplyStream,
}

impl Turn {
    /// Drain the stream into the full raw reply.
    pub async fn collect(mut self) -> Result<String> {
        let mut full = String::new();
        while let Some(chunk) = self.stream.next().await {
            full.push_str(chunk?.text());
        }
        Ok(full)
    }
}

/// Labelled tool output, appended in call order.
#[derive(Debug, Default)]
pub struct ContextBlock {
    text: String,
}

impl ContextBlock {
    pub fn push(&mut self, label: &str, fragment: &str) {
        self.text.push_str(&format!("\n{}:\n{}\n", label, fragment));
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

pub fn mentions_live_data(query: &str) -> bool {
    let q = query.to_lowercase();
    LIVE_DATA_KEYWORDS.iter().any(|k| q.contains(k))
}

pub fn requests_saved_file(query: &str) -> bool {
    let q = query.to_lowercase();
    q.contains("save") && SAVE_FORMAT_KEYWORDS.iter().any(|k| q.contains(k))
}

pub struct StrategyController {
    llm: Arc<dyn Generator>,
    probe: Arc<dyn NetworkProbe>,
    classifier: IntentClassifier,
    web: Arc<dyn WebSearch>,
    embedder: Arc<dyn Embedder>,
    documents: DocumentTool,
    profiles: Arc<RwLock<ModelProfiles>>,
}

impl StrategyController {
    pub fn new(
        llm: Arc<dyn Generator>,
        probe: Arc<dyn NetworkProbe>,
        web: Arc<dyn WebSearch>,
        embedder: Arc<dyn Embedder>,
        documents: DocumentTool,
        profiles: Arc<RwLock<ModelProfiles>>,
    ) -> Self {
        Self {
            classifier: IntentClassifier::new(llm.clone()),
            llm,
            probe,
            web,
            embedder,
            documents,
            profiles,
        }
    }

    /// Override wins over the sentinel; the sentinel is only asked under `Auto`.
    pub async fn resolve_mode(&self, user_override: UserOverride) -> ReasoningMode {
        match user_override.pinned() {
            Some(mode) => mode,
            None => classify(self.probe.measure().await),
        }
    }

    /// Run one turn. Only a failing generation call is returned as an error.
    pub async fn execute(
        &self,
        session: &Session,
        query: &str,
        user_override: UserOverride,
    ) -> Result<Turn> {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let profiles = self.profiles.read().await.clone();

        let resolved_mode = self.resolve_mode(user_override).await;
        let social = is_social(query);
        info!(social, mode = %resolved_mode, ?user_override, "Mode resolved");

        let intent = if social {
            Intent::None
        } else {
            self.classifier.classify(&profiles.small, query).await
        };

        let effective = effective_mode(resolved_mode, social);
        let mut plan = TurnPlan {
            social,
            resolved_mode,
            effective_mode: effective,
            intent,
            model: profiles.for_mode(effective).to_string(),
            route: Route::Answer,
            web_engaged: false,
            rag_engaged: false,
        };
        info!(effective_mode = %effective, model = %plan.model, %intent, "Strategy selected");

        if !social && intent == Intent::Doc {
            return self.document_turn(plan, &profiles, query).await;
        }

        let mut context = ContextBlock::default();
        if !social {
            if intent == Intent::Web || mentions_live_data(query) {
                plan.web_engaged = true;
                info!(intent_driven = intent == Intent::Web, "Web search engaged");
                let web_data = self.web.search(query, effective).await;
                context.push(WEB_SECTION, &web_data);
            }
            if intent == Intent::Rag || session.has_context() {
                plan.rag_engaged = true;
                info!(chunks = session.knowledge().len(), "Document retrieval engaged");
                let retrieved = session
                    .knowledge()
                    .retrieve(self.embedder.as_ref(), query)
                    .await;
                context.push(DOCUMENT_SECTION, &retrieved);
            }
        }

        if requests_saved_file(query) {
            info!("Save-as-file request detected, delegating to document tool");
            return self.document_turn(plan, &profiles, query).await;
        }

        let prompt = prompts::assemble(effective, query, context.as_str(), &timestamp);
        let deltas = self.llm.stream(&plan.model, &prompt).await?;
        let stream = deltas.map(|delta| delta.map(ReplyChunk::Text));

        Ok(Turn {
            plan,
            stream: Box::pin(stream),
        })
    }

    /// Documents always use the large profile.
    async fn document_turn(
        &self,
        mut plan: TurnPlan,
        profiles: &ModelProfiles,
        query: &str,
    ) -> Result<Turn> {
        plan.route = Route::Document;
        plan.model = profiles.large.clone();

        let doc = self.documents.generate(&profiles.large, query).await?;
        info!(
            file_type = %doc.file_type,
            path = %doc.path,
            content_len = doc.content.len(),
            "Document generated"
        );
        let chunk = ReplyChunk::Text(doc.confirmation());

        Ok(Turn {
            plan,
            stream: Box::pin(stream::iter(vec![Ok(chunk)])),
        })
    }
}
