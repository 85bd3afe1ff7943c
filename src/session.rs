use crate::strategy::reply::ParsedReply;
use crate::tools::knowledge::KnowledgeBase;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

/// Immutable once recorded. Only assistant turns carry a file reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
    pub thought: Option<String>,
    pub file_path: Option<String>,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            thought: None,
            file_path: None,
        }
    }

    pub fn assistant(reply: &ParsedReply) -> Self {
        let thought = reply.thought.trim();
        Self {
            role: Role::Assistant,
            content: reply.answer.trim().to_string(),
            thought: (!thought.is_empty()).then(|| thought.to_string()),
            file_path: reply.file_path.clone(),
        }
    }
}

/// Per-conversation state. Mutated only by uploads and completed turns.
#[derive(Debug)]
pub struct Session {
    key: String,
    history: Vec<ConversationTurn>,
    knowledge: KnowledgeBase,
    has_context: bool,
}

impl Session {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            history: Vec::new(),
            knowledge: KnowledgeBase::default(),
            has_context: false,
        }
    }

    /// Label under which this session's uploads are archived.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn has_context(&self) -> bool {
        self.has_context
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    pub fn history(&self) -> &[ConversationTurn] {
        &self.history
    }

    /// Replace the corpus. `has_context` stays set for the rest of the session.
    pub fn load_knowledge(&mut self, knowledge: KnowledgeBase) {
        self.knowledge = knowledge;
        self.has_context = true;
    }

    pub fn record_exchange(&mut self, query: &str, reply: &ParsedReply) {
        self.history.push(ConversationTurn::user(query));
        self.history.push(ConversationTurn::assistant(reply));
    }
}
