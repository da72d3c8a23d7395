//! Environment-driven configuration shared by the server and the CLI.

use std::env;
use std::time::Duration;

use crate::upstream::is_placeholder_key;

/// OpenRouter's chat completion endpoint.
pub const DEFAULT_UPSTREAM_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Model used for both reports and suggestions unless overridden.
pub const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";

/// Name sent in the `X-Title` header.
pub const APP_TITLE: &str = "LLM Weather";

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_WEATHER_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_SUGGEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Settings for talking to the upstream completion API.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Bearer credential; `None` when unset
    pub api_key: Option<String>,
    /// Full URL of the chat completion endpoint
    pub endpoint: String,
    /// Public URL of this deployment, sent as the referer
    pub public_base_url: Option<String>,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_UPSTREAM_URL.to_string(),
            public_base_url: None,
        }
    }
}

impl UpstreamConfig {
    /// The API key, unless it is unset or still a sample placeholder.
    pub fn usable_api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !is_placeholder_key(key))
    }
}

/// Per-endpoint completion settings.
#[derive(Debug, Clone)]
pub struct EndpointConfig {
    pub model: String,
    pub timeout: Duration,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl EndpointConfig {
    pub fn weather() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            timeout: DEFAULT_WEATHER_TIMEOUT,
            max_tokens: 1200,
            temperature: 0.7,
        }
    }

    pub fn suggest() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            timeout: DEFAULT_SUGGEST_TIMEOUT,
            max_tokens: 200,
            temperature: 0.2,
        }
    }
}

/// Full application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub upstream: UpstreamConfig,
    pub weather: EndpointConfig,
    pub suggest: EndpointConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            upstream: UpstreamConfig::default(),
            weather: EndpointConfig::weather(),
            suggest: EndpointConfig::suggest(),
        }
    }
}

impl Config {
    /// Read configuration from the process environment.
    ///
    /// A missing API key is not an error here; it surfaces per request so the
    /// server can still start and report the problem to callers.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let secs = |key: &str, default: Duration| {
            get(key)
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(default)
        };

        let mut weather = EndpointConfig::weather();
        if let Some(model) = get("WEATHER_MODEL") {
            weather.model = model;
        }
        weather.timeout = secs("WEATHER_TIMEOUT_SECS", weather.timeout);

        let mut suggest = EndpointConfig::suggest();
        if let Some(model) = get("SUGGEST_MODEL") {
            suggest.model = model;
        }
        suggest.timeout = secs("SUGGEST_TIMEOUT_SECS", suggest.timeout);

        Self {
            port: get("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            upstream: UpstreamConfig {
                api_key: get("OPENROUTER_API_KEY"),
                endpoint: get("UPSTREAM_URL").unwrap_or_else(|| DEFAULT_UPSTREAM_URL.to_string()),
                public_base_url: get("PUBLIC_BASE_URL"),
            },
            weather,
            suggest,
        }
    }
}
