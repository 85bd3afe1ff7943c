//! In-memory collaborators for controller and adapter tests.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use futures::stream;

use super::mode::ReasoningMode;
use super::sentinel::{NetworkProbe, NetworkReading};
use crate::llm::{Embedder, Generator, TextStream};
use crate::tools::document::{DocumentRenderer, FileType};
use crate::tools::web::WebSearch;

const ROUTER_MARKER: &str = "intent classification system";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Complete,
    Stream,
}

/// Replies with a fixed label to router prompts, a fixed body to other
/// completions, and streams `stream_text` in two increments.
pub struct ScriptedGenerator {
    label: Option<String>,
    completion: Option<String>,
    stream_text: Option<String>,
    calls: Mutex<Vec<(CallKind, String, String)>>,
}

impl ScriptedGenerator {
    pub fn new(reply: &str, stream_text: &str) -> Self {
        Self {
            label: Some(reply.to_string()),
            completion: Some(reply.to_string()),
            stream_text: Some(stream_text.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            label: None,
            completion: None,
            stream_text: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Router prompts fail; everything else still answers.
    pub fn without_label(mut self) -> Self {
        self.label = None;
        self
    }

    pub fn with_document(mut self, content: &str) -> Self {
        self.completion = Some(content.to_string());
        self
    }

    fn record(&self, kind: CallKind, model: &str, prompt: &str) {
        self.calls
            .lock()
            .unwrap()
            .push((kind, model.to_string(), prompt.to_string()));
    }

    fn calls_of(&self, kind: CallKind) -> Vec<(String, String)> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(k, _, _)| *k == kind)
            .map(|(_, m, p)| (m.clone(), p.clone()))
            .collect()
    }

    /// (model, prompt) of every completion call.
    pub fn prompts(&self) -> Vec<(String, String)> {
        self.calls_of(CallKind::Complete)
    }

    pub fn completions(&self) -> usize {
        self.calls_of(CallKind::Complete).len()
    }

    pub fn router_calls(&self) -> usize {
        self.prompts()
            .iter()
            .filter(|(_, p)| p.contains(ROUTER_MARKER))
            .count()
    }

    pub fn streams(&self) -> Vec<(String, String)> {
        self.calls_of(CallKind::Stream)
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn complete(&self, model: &str, prompt: &str) -> Result<String> {
        self.record(CallKind::Complete, model, prompt);
        let reply = if prompt.contains(ROUTER_MARKER) {
            &self.label
        } else {
            &self.completion
        };
        reply.clone().ok_or_else(|| anyhow!("backend unreachable"))
    }

    async fn stream(&self, model: &str, prompt: &str) -> Result<TextStream> {
        self.record(CallKind::Stream, model, prompt);
        let Some(text) = self.stream_text.clone() else {
            bail!("backend unreachable");
        };
        let mid = text
            .char_indices()
            .map(|(i, _)| i)
            .nth(text.chars().count() / 2)
            .unwrap_or(text.len());
        let (a, b) = text.split_at(mid);
        let parts = vec![Ok(a.to_string()), Ok(b.to_string())];
        Ok(Box::pin(stream::iter(parts)))
    }
}

/// Two-dimensional bag-of-words: ("kiwi", "pear") counts.
pub struct KeywordEmbedder;

#[async_trait]
impl Embedder for KeywordEmbedder {
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(inputs
            .iter()
            .map(|t| {
                vec![
                    t.matches("kiwi").count() as f32,
                    t.matches("pear").count() as f32,
                ]
            })
            .collect())
    }
}

pub struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    async fn embed(&self, _inputs: &[String]) -> Result<Vec<Vec<f32>>> {
        bail!("embedding backend down")
    }
}

pub struct FixedProbe {
    latency_ms: f64,
    calls: AtomicUsize,
}

impl FixedProbe {
    pub fn new(latency_ms: f64) -> Self {
        Self {
            latency_ms,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NetworkProbe for FixedProbe {
    async fn measure(&self) -> NetworkReading {
        self.calls.fetch_add(1, Ordering::SeqCst);
        NetworkReading {
            latency_ms: self.latency_ms,
        }
    }
}

#[derive(Default)]
pub struct RecordingSearch {
    calls: Mutex<Vec<(String, ReasoningMode)>>,
}

impl RecordingSearch {
    pub fn calls(&self) -> Vec<(String, ReasoningMode)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl WebSearch for RecordingSearch {
    async fn search(&self, query: &str, mode: ReasoningMode) -> String {
        self.calls.lock().unwrap().push((query.to_string(), mode));
        "Title: Lahore forecast\nSource: https://weather.example\nSnippet: 31C, clear".to_string()
    }
}

pub struct FailingRenderer;

impl DocumentRenderer for FailingRenderer {
    fn render(&self, _file_type: FileType, _content: &str) -> Result<PathBuf> {
        bail!("disk full")
    }
}
