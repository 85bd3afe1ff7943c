use std::fmt;

use crate::config::{ModelProfiles, LATENCY_THRESHOLD_FAST_MS, LATENCY_THRESHOLD_POOR_MS};

/// Tokens that mark a query as small talk. Matched against whole lowercase words.
pub const GREETINGS: &[&str] = &["hello", "hi", "hey", "assalam", "yo", "greeting"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReasoningMode {
    DeepReasoning,
    Standard,
    FastResponse,
}

impl ReasoningMode {
    pub fn from_latency(latency_ms: f64) -> Self {
        if latency_ms < LATENCY_THRESHOLD_FAST_MS {
            ReasoningMode::DeepReasoning
        } else if latency_ms < LATENCY_THRESHOLD_POOR_MS {
            ReasoningMode::Standard
        } else {
            ReasoningMode::FastResponse
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReasoningMode::DeepReasoning => "DEEP_REASONING",
            ReasoningMode::Standard => "STANDARD",
            ReasoningMode::FastResponse => "FAST_RESPONSE",
        }
    }
}

impl fmt::Display for ReasoningMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-supplied mode choice. `Auto` defers to the latency sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UserOverride {
    #[default]
    Auto,
    Deep,
    Standard,
    Fast,
}

impl UserOverride {
    /// The pinned mode, or `None` when the sentinel should decide.
    pub fn pinned(self) -> Option<ReasoningMode> {
        match self {
            UserOverride::Auto => None,
            UserOverride::Deep => Some(ReasoningMode::DeepReasoning),
            UserOverride::Standard => Some(ReasoningMode::Standard),
            UserOverride::Fast => Some(ReasoningMode::FastResponse),
        }
    }
}

/// Pure local check; never touches a backend.
pub fn is_social(query: &str) -> bool {
    query
        .to_lowercase()
        .split_whitespace()
        .any(|token| GREETINGS.contains(&token))
}

/// Social queries are pinned to STANDARD regardless of how the mode was resolved.
pub fn effective_mode(resolved: ReasoningMode, social: bool) -> ReasoningMode {
    if social {
        ReasoningMode::Standard
    } else {
        resolved
    }
}

impl ModelProfiles {
    pub fn for_mode(&self, mode: ReasoningMode) -> &str {
        match mode {
            ReasoningMode::DeepReasoning => &self.large,
            ReasoningMode::Standard | ReasoningMode::FastResponse => &self.small,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latency_boundaries() {
        assert_eq!(ReasoningMode::from_latency(0.0), ReasoningMode::DeepReasoning);
        assert_eq!(ReasoningMode::from_latency(299.999), ReasoningMode::DeepReasoning);
        assert_eq!(ReasoningMode::from_latency(300.0), ReasoningMode::Standard);
        assert_eq!(ReasoningMode::from_latency(999.999), ReasoningMode::Standard);
        assert_eq!(ReasoningMode::from_latency(1000.0), ReasoningMode::FastResponse);
        assert_eq!(ReasoningMode::from_latency(9999.0), ReasoningMode::FastResponse);
    }

    #[test]
    fn test_social_detection_is_whole_word() {
        assert!(is_social("hey there"));
        assert!(is_social("Hello"));
        assert!(is_social("assalam alaikum"));
        assert!(!is_social("which highway is fastest"));
        assert!(!is_social("say hi!"));
        assert!(!is_social(""));
    }

    #[test]
    fn test_social_pins_standard() {
        for resolved in [
            ReasoningMode::DeepReasoning,
            ReasoningMode::Standard,
            ReasoningMode::FastResponse,
        ] {
            assert_eq!(effective_mode(resolved, true), ReasoningMode::Standard);
            assert_eq!(effective_mode(resolved, false), resolved);
        }
    }

    #[test]
    fn test_override_pinning() {
        assert_eq!(UserOverride::Auto.pinned(), None);
        assert_eq!(UserOverride::Standard.pinned(), Some(ReasoningMode::Standard));
    }

    #[test]
    fn test_profile_selection() {
        let profiles = ModelProfiles::default();
        assert_eq!(profiles.for_mode(ReasoningMode::DeepReasoning), "mistral-large-latest");
        assert_eq!(profiles.for_mode(ReasoningMode::Standard), "mistral-small-latest");
        assert_eq!(profiles.for_mode(ReasoningMode::FastResponse), "mistral-small-latest");
    }
}
