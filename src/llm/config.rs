//! Vision model client configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the Gemini vision client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    /// API endpoint (without the `/v1beta/...` path)
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// API key; analysis runs in fallback mode when unset
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    /// Model to use for report analysis
    #[serde(default = "default_model")]
    pub model: String,
    /// Maximum tokens in response
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
    /// Temperature for generation (0.0 - 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Request timeout in seconds (no timeout when unset)
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_model() -> String {
    "gemini-flash-latest".to_string()
}

fn default_max_output_tokens() -> u32 {
    8192
}

fn default_temperature() -> f32 {
    0.2
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key: None,
            model: default_model(),
            max_output_tokens: default_max_output_tokens(),
            temperature: default_temperature(),
            timeout_secs: None,
        }
    }
}

impl LlmConfig {
    /// Apply overrides from a variable lookup (the process environment in
    /// [`Settings::with_env_overrides`](crate::config::Settings::with_env_overrides)).
    ///
    /// Supported variables:
    /// - `GEMINI_API_KEY`: API key (empty values are ignored)
    /// - `GEMINI_MODEL`: Model name
    /// - `GEMINI_ENDPOINT`: API endpoint
    /// - `GEMINI_MAX_OUTPUT_TOKENS`: Maximum tokens in response
    /// - `GEMINI_TEMPERATURE`: Generation temperature (0.0-1.0)
    /// - `GEMINI_TIMEOUT_SECS`: Request timeout in seconds
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("GEMINI_API_KEY") {
            let key = key.trim().to_string();
            if !key.is_empty() {
                self.api_key = Some(key);
            }
        }
        if let Some(val) = lookup("GEMINI_MODEL") {
            self.model = val;
        }
        if let Some(val) = lookup("GEMINI_ENDPOINT") {
            self.endpoint = val.trim_end_matches('/').to_string();
        }
        if let Some(val) = lookup("GEMINI_MAX_OUTPUT_TOKENS") {
            if let Ok(n) = val.parse() {
                self.max_output_tokens = n;
            }
        }
        if let Some(val) = lookup("GEMINI_TEMPERATURE") {
            if let Ok(t) = val.parse() {
                self.temperature = t;
            }
        }
        if let Some(val) = lookup("GEMINI_TIMEOUT_SECS") {
            if let Ok(n) = val.parse() {
                self.timeout_secs = Some(n);
            }
        }
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    /// Whether a credential is configured.
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }
}
