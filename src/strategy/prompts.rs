use super::mode::ReasoningMode;
use crate::tools::document::FileType;

pub const NO_CONTEXT: &str = "None";

pub const DEEP_REASONING_FRAMEWORK: &str = r#"
    REASONING_MODE: ANALYTICAL (High Deliberation)

    INTERNAL_PROCESS:
    1. Decompose the problem into core components.
    2. Extract verifiable facts from context and cross-reference.
    3. Identify and challenge underlying assumptions.
    4. Check for logical fallacies or inconsistencies.
    5. Synthesize a comprehensive, evidence-backed conclusion.

    OUTPUT_REQUIREMENTS:
    - Provide a structured, deeply detailed answer.
    - Use bullet points for clarity where complex.
    - Do NOT expose internal reasoning steps in the final output.
    "#;

pub const STANDARD_FRAMEWORK: &str = r#"
    REASONING_MODE: STRUCTURED (Balanced)

    INTERNAL_PROCESS:
    - Identify key facts relevant to the user's intent.
    - Connect facts directly to the query.
    - Filter out tangential information.

    OUTPUT_REQUIREMENTS:
    - Clear, concise, and professional explanation.
    - Direct final answer with moderate detail.
    "#;

pub const FAST_RESPONSE_FRAMEWORK: &str = r#"
    REASONING_MODE: HEURISTIC (Low Latency)

    INTERNAL_PROCESS:
    - Identify the single most likely answer immediately.
    - Skip secondary analysis or "nice-to-know" details.
    - Focus purely on the "What" and "How".

    OUTPUT_REQUIREMENTS:
    - Extremely concise answer (TL;DR style).
    - No fluff. No extended explanation unless critical for safety.
    "#;

pub fn router_prompt(query: &str) -> String {
    format!(
        r#"
            You are an intent classification system.
            Classify the QUERY into exactly ONE category:

            WEB  -> Real-time info (news, weather, stocks).
            RAG  -> Private documents/knowledge base.
            DOC  -> Request to create/generate/download a file (PDF, Excel, Word).
            NONE -> General knowledge.

            STRICT RULES: Output ONLY one word: WEB, RAG, DOC, or NONE.

            QUERY: {query}
            "#
    )
}

fn grounding_block(query: &str, context: &str, timestamp: &str) -> String {
    let context = if context.is_empty() { NO_CONTEXT } else { context };
    format!(
        r#"
    SYSTEM_METADATA:
    - SYSTEM_TIME: {timestamp}

    GROUNDING_RULES:
    1. AVAILABLE_CONTEXT is the highest authority.
    2. If AVAILABLE_CONTEXT exists, prioritize it over prior knowledge.
    3. If context conflicts with prior knowledge, trust context.
    4. If insufficient data, explicitly state uncertainty.
    5. Do NOT fabricate missing details.

    INPUTS:
    - AVAILABLE_CONTEXT: {context}
    - USER_QUERY: {query}
    "#
    )
}

pub fn framework(mode: ReasoningMode) -> &'static str {
    match mode {
        ReasoningMode::DeepReasoning => DEEP_REASONING_FRAMEWORK,
        ReasoningMode::Standard => STANDARD_FRAMEWORK,
        ReasoningMode::FastResponse => FAST_RESPONSE_FRAMEWORK,
    }
}

/// Grounding rules followed by the mode's reasoning framework.
pub fn assemble(mode: ReasoningMode, query: &str, context: &str, timestamp: &str) -> String {
    format!(
        "{}\n{}",
        grounding_block(query, context, timestamp),
        framework(mode)
    )
}

/// Instruction prefix for document generation; the user query is appended verbatim.
pub fn document_instruction(file_type: FileType) -> &'static str {
    match file_type {
        FileType::Excel => {
            "You are a Data Generator. Output ONLY data in CSV format (comma-separated).\n\
             Do not use markdown blocks. Just the raw data.\n\
             Example:\nName, Age, Role\nAlice, 25, Engineer\n\
             Generate data for: "
        }
        FileType::Word => {
            "You are a Document Generator. Output content for a Word Document.\n\
             Use '# ' for Titles, '## ' for Headings, '* ' for bullets.\n\
             Write about: "
        }
        FileType::Pdf => {
            "You are a PDF Generator. Output content in strict format:\n\
             - Use '# ' for Main Titles.\n\
             - Use '## ' for Section Headings.\n\
             - Use '* ' for bullet points.\n\
             - Do NOT use bolding symbols like ** inside the text.\n\
             Write a comprehensive summary about: "
        }
    }
}
