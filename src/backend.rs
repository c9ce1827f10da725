//! Translation backends.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use serde_json::Value;

use crate::error::TranslateError;
use crate::gateway::Translate;

pub const DEFAULT_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";
pub const DEFAULT_TARGET: &str = "vi";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Debug)]
pub struct TranslatorConfig {
    /// Source language code, `auto` to let the service detect it.
    pub source: String,
    pub target: String,
    pub endpoint: String,
    /// Bound on a single call, connect included.
    pub timeout: Duration,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        TranslatorConfig {
            source: "auto".to_string(),
            target: DEFAULT_TARGET.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Google's public `translate_a/single` endpoint. One request per string.
pub struct GoogleTranslate {
    config: TranslatorConfig,
    agent: ureq::Agent,
}

impl GoogleTranslate {
    pub fn new(config: TranslatorConfig) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(config.timeout).build();
        GoogleTranslate { config, agent }
    }

    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }
}

impl Translate for GoogleTranslate {
    fn translate(&self, text: &str) -> Result<String, TranslateError> {
        let response = self
            .agent
            .get(&self.config.endpoint)
            .query("client", "gtx")
            .query("sl", &self.config.source)
            .query("tl", &self.config.target)
            .query("dt", "t")
            .query("q", text)
            .call()?;
        let body: Value = response.into_json()?;
        parse_response(&body)
    }
}

/// Joins the translated segments of a `translate_a/single` response:
/// `[[["Xin chào", "Hello", ...], ...], null, "en", ...]`.
pub fn parse_response(body: &Value) -> Result<String, TranslateError> {
    let segments = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| TranslateError::Response("no segment list".into()))?;
    let text: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();
    if text.is_empty() {
        return Err(TranslateError::Response("no translated text".into()));
    }
    Ok(text)
}

/// Offline backend backed by a fixed source → target table.
#[derive(Clone, Debug, Default)]
pub struct Glossary {
    entries: HashMap<String, String>,
}

impl Glossary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads `source<TAB>target` lines; blank lines and `#` comments are skipped.
    pub fn load(path: &Path) -> Result<Self, TranslateError> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_tsv(&content))
    }

    pub fn from_tsv(content: &str) -> Self {
        content
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.trim().is_empty() && !line.starts_with('#'))
            .filter_map(|line| line.split_once('\t'))
            .collect()
    }

    pub fn insert(&mut self, source: impl Into<String>, target: impl Into<String>) {
        self.entries.insert(source.into(), target.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Glossary {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Glossary {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl Translate for Glossary {
    fn translate(&self, text: &str) -> Result<String, TranslateError> {
        if let Some(target) = self.entries.get(text) {
            return Ok(target.clone());
        }
        // Fall back to the trimmed text, keeping the surrounding whitespace.
        let trimmed = text.trim();
        let target = self
            .entries
            .get(trimmed)
            .ok_or_else(|| TranslateError::Untranslatable(text.to_string()))?;
        let start = text.len() - text.trim_start().len();
        let end = start + trimmed.len();
        Ok(format!("{}{target}{}", &text[..start], &text[end..]))
    }
}
