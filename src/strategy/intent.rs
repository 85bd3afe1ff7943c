use std::fmt;
use std::sync::Arc;

use tracing::{info, warn};

use super::prompts;
use crate::llm::Generator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Web,
    Rag,
    Doc,
    None,
}

impl Intent {
    /// Parse untrusted classifier output. Substring match, priority WEB > RAG > DOC.
    pub fn from_label(raw: &str) -> Self {
        let upper = raw.to_uppercase();
        if upper.contains("WEB") {
            Intent::Web
        } else if upper.contains("RAG") {
            Intent::Rag
        } else if upper.contains("DOC") {
            Intent::Doc
        } else {
            Intent::None
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Intent::Web => "WEB",
            Intent::Rag => "RAG",
            Intent::Doc => "DOC",
            Intent::None => "NONE",
        })
    }
}

/// Routes a query to a capability label through the small backend profile.
pub struct IntentClassifier {
    llm: Arc<dyn Generator>,
}

impl IntentClassifier {
    pub fn new(llm: Arc<dyn Generator>) -> Self {
        Self { llm }
    }

    /// Backend failures degrade to `Intent::None`; routing never aborts a turn.
    pub async fn classify(&self, model: &str, query: &str) -> Intent {
        let prompt = prompts::router_prompt(query);
        match self.llm.complete(model, &prompt).await {
            Ok(raw) => {
                let intent = Intent::from_label(&raw);
                info!(raw = raw.trim(), %intent, "Intent detected");
                intent
            }
            Err(e) => {
                warn!("Intent classification failed, defaulting to NONE: {:#}", e);
                Intent::None
            }
        }
    }
}
