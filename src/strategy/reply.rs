//! Post-processing of a fully drained assistant reply.

pub const DOWNLOAD_OPEN: &str = "[[DOWNLOAD:";
pub const DOWNLOAD_CLOSE: &str = "]]";

const THOUGHT_SEPARATOR: &str = "---";
const POLISHED_MARKER: &str = "[Polished Answer]";

/// Removed from both halves, in this order ("Final Answer:" before "Answer:").
pub const HEADERS_TO_STRIP: &[&str] = &[
    "[Logic Summary]",
    "[Polished Answer]",
    "Strategy:",
    "REASONING_MODE:",
    "---",
    "Final Answer:",
    "Answer:",
];

/// A reply ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedReply {
    pub thought: String,
    pub answer: String,
    pub file_path: Option<String>,
}

pub fn download_marker(path: &str) -> String {
    format!("{}{}{}", DOWNLOAD_OPEN, path, DOWNLOAD_CLOSE)
}

/// Split into (thought, final). Last `---` wins; else first `[Polished Answer]`.
pub fn split_thought(raw: &str) -> (String, String) {
    if let Some((thought, answer)) = raw.rsplit_once(THOUGHT_SEPARATOR) {
        return (thought.to_string(), answer.to_string());
    }
    if let Some((thought, answer)) = raw.split_once(POLISHED_MARKER) {
        return (thought.to_string(), answer.to_string());
    }
    (String::new(), raw.to_string())
}

pub fn strip_headers(text: &str) -> String {
    HEADERS_TO_STRIP
        .iter()
        .fold(text.to_string(), |acc, header| acc.replace(header, ""))
}

/// Remove every download marker; returns the cleaned text and the first path found.
/// Markers never span lines.
pub fn extract_download(text: &str) -> (String, Option<String>) {
    let mut cleaned = String::with_capacity(text.len());
    let mut path = None;
    let mut rest = text;

    while let Some(start) = rest.find(DOWNLOAD_OPEN) {
        let after = &rest[start + DOWNLOAD_OPEN.len()..];
        let line_end = after.find('\n').unwrap_or(after.len());
        let Some(end) = after[..line_end].find(DOWNLOAD_CLOSE) else {
            // Unterminated: keep as prose and move past it
            cleaned.push_str(&rest[..start + DOWNLOAD_OPEN.len()]);
            rest = after;
            continue;
        };

        cleaned.push_str(&rest[..start]);
        if path.is_none() {
            path = Some(after[..end].trim().to_string());
        }
        rest = &after[end + DOWNLOAD_CLOSE.len()..];
    }
    cleaned.push_str(rest);

    (cleaned, path)
}

/// Full display pipeline: split, strip headers, then pull the download marker out of the answer.
pub fn parse_reply(raw: &str) -> ParsedReply {
    let (thought, answer) = split_thought(raw);
    let thought = strip_headers(&thought);
    let answer = strip_headers(&answer);
    let (answer, file_path) = extract_download(&answer);

    ParsedReply {
        thought,
        answer,
        file_path,
    }
}
