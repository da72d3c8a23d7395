//! Location autocomplete backed by the upstream model.
//!
//! Suggestions are a convenience: every failure (missing key, upstream error,
//! unparseable answer) ends up as an empty list for the caller. `try_suggest`
//! keeps the error for callers that want to know why.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde_json::Value;

use crate::cache::{ResponseCache, SUGGESTION_TTL};
use crate::config::EndpointConfig;
use crate::prompts::{self, MAX_SUGGESTIONS};
use crate::upstream::{UpstreamClient, UpstreamError};

/// Queries shorter than this never reach the upstream API.
pub const MIN_QUERY_CHARS: usize = 2;

static SUGGESTION_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^.+,\s*[A-Z]{2}(\s+[0-9]{5})?$").expect("valid suggestion pattern")
});

#[derive(Debug, thiserror::Error)]
pub enum SuggestError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("could not parse suggestions: {0}")]
    Parse(String),
}

/// Whether `entry` looks like `City, ST` or `City, ST ZIP`.
pub fn is_suggestion_shape(entry: &str) -> bool {
    SUGGESTION_SHAPE.is_match(entry)
}

/// Remove a surrounding Markdown code fence, with or without a language tag.
pub fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the info string ("json") on the opening fence line
    let rest = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
    };
    let rest = rest.trim();
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Turn the model's answer into at most [`MAX_SUGGESTIONS`] well-formed entries.
///
/// Accepts a JSON array of strings, or an object with a `suggestions` array.
/// Non-string items and entries of the wrong shape are dropped.
pub fn parse_suggestions(text: &str) -> Result<Vec<String>, SuggestError> {
    let body = strip_code_fence(text);
    let value: Value =
        serde_json::from_str(body).map_err(|e| SuggestError::Parse(e.to_string()))?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("suggestions") {
            Some(Value::Array(items)) => items,
            _ => return Err(SuggestError::Parse("expected a suggestions array".to_string())),
        },
        other => {
            return Err(SuggestError::Parse(format!(
                "expected a JSON array, got {}",
                other
            )));
        }
    };

    let mut suggestions: Vec<String> = Vec::with_capacity(MAX_SUGGESTIONS);
    for entry in items.iter().filter_map(Value::as_str).map(str::trim) {
        if suggestions.len() == MAX_SUGGESTIONS {
            break;
        }
        if is_suggestion_shape(entry) && !suggestions.iter().any(|s| s == entry) {
            suggestions.push(entry.to_string());
        }
    }
    Ok(suggestions)
}

/// Autocomplete service with a 24-hour cache keyed by the lower-cased query.
#[derive(Clone)]
pub struct SuggestService {
    client: Arc<UpstreamClient>,
    cache: ResponseCache<Vec<String>>,
    settings: EndpointConfig,
}

impl SuggestService {
    pub fn new(client: Arc<UpstreamClient>, settings: EndpointConfig) -> Self {
        Self::with_cache(client, ResponseCache::new(SUGGESTION_TTL), settings)
    }

    pub fn with_cache(
        client: Arc<UpstreamClient>,
        cache: ResponseCache<Vec<String>>,
        settings: EndpointConfig,
    ) -> Self {
        Self {
            client,
            cache,
            settings,
        }
    }

    pub fn cache(&self) -> &ResponseCache<Vec<String>> {
        &self.cache
    }

    /// Fetch suggestions, reporting why when nothing could be produced.
    pub async fn try_suggest(&self, query: &str) -> Result<Vec<String>, SuggestError> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_CHARS {
            return Ok(Vec::new());
        }

        let key = query.to_lowercase();
        if let Some(hit) = self.cache.get(&key).await {
            tracing::debug!("Suggestion cache hit for '{}'", key);
            return Ok(hit);
        }

        let answer = self
            .client
            .complete(
                &self.settings,
                prompts::SUGGEST_SYSTEM_PROMPT,
                &prompts::suggest_user_message(query),
            )
            .await?;

        let suggestions = parse_suggestions(&answer)?;
        tracing::debug!("{} suggestion(s) for '{}'", suggestions.len(), key);
        self.cache.put(key, suggestions.clone()).await;
        Ok(suggestions)
    }

    /// Best-effort suggestions: any failure becomes an empty list.
    pub async fn suggest(&self, query: &str) -> Vec<String> {
        match self.try_suggest(query).await {
            Ok(suggestions) => suggestions,
            Err(e) => {
                tracing::warn!("Suggestions unavailable for '{}': {}", query.trim(), e);
                Vec::new()
            }
        }
    }
}
