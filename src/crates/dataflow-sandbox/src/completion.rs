//! `CompletionProvider`: the pluggable text-completion collaborator an
//! `Llm` block's prompt gets dispatched to, plus two offline, deterministic
//! stand-ins for a real HTTP-backed provider.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, SandboxError};

/// Submits an already-formatted prompt and returns completion text.
///
/// A real deployment implements this against a hosted model the way an
/// `llm` crate remote provider client wraps an HTTP API; this crate ships
/// only offline reference implementations so the rest of the workspace has
/// no network dependency.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Complete `prompt`, which has already had `{name}`-style substitutions
    /// resolved against the block's other inputs.
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Returns the prompt unchanged. Useful for exercising the `Llm` block's
/// wiring without pulling in any notion of "completion" at all.
#[derive(Debug, Default, Clone, Copy)]
pub struct EchoCompletionProvider;

#[async_trait]
impl CompletionProvider for EchoCompletionProvider {
    async fn complete(&self, prompt: &str) -> Result<String> {
        Ok(prompt.to_string())
    }
}

/// Wraps the prompt in a fixed template, e.g. `"echo: {prompt}"`, so tests
/// can assert on a provider that is visibly distinct from
/// [`EchoCompletionProvider`] without being any less deterministic.
#[derive(Debug, Clone)]
pub struct TemplateCompletionProvider {
    template: String,
}

impl TemplateCompletionProvider {
    /// Build a provider that substitutes `{prompt}` into `template`.
    pub fn new(template: impl Into<String>) -> Self {
        Self { template: template.into() }
    }
}

impl Default for TemplateCompletionProvider {
    fn default() -> Self {
        Self::new("{prompt}")
    }
}

#[async_trait]
impl CompletionProvider for TemplateCompletionProvider {
    async fn complete(&self, prompt: &str) -> Result<String> {
        Ok(self.template.replace("{prompt}", prompt))
    }
}

/// Configuration for a [`HttpCompletionProvider`]: where to POST a prompt
/// and how long to wait, the same two knobs `RemoteLlmConfig` exposes for a
/// hosted chat model before any provider-specific request shape is layered
/// on top.
#[derive(Debug, Clone)]
pub struct HttpCompletionConfig {
    /// Endpoint that accepts `{"prompt": "..."}` and returns
    /// `{"completion": "..."}`.
    pub url: String,
    /// Bearer token sent as `Authorization: Bearer {token}`, if set.
    pub api_key: Option<String>,
    pub timeout: Duration,
    /// Retry policy for transient failures (timeouts, 5xx, rate limits).
    pub retry: tooling::async_utils::retry::RetryPolicy,
}

impl HttpCompletionConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: None,
            timeout: Duration::from_secs(30),
            retry: tooling::async_utils::retry::RetryPolicy::default(),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry_policy(mut self, retry: tooling::async_utils::retry::RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

#[derive(Serialize)]
struct HttpCompletionRequest<'a> {
    prompt: &'a str,
}

#[derive(Deserialize)]
struct HttpCompletionResponse {
    completion: String,
}

/// A [`CompletionProvider`] that POSTs the prompt to an HTTP endpoint and
/// reads the completion back out of a JSON body, the way `OpenAiClient`
/// wraps a `reqwest::Client` built once with a fixed timeout and reused
/// across requests — generalized past any single vendor's request/response
/// shape since this crate has no business depending on one.
pub struct HttpCompletionProvider {
    config: HttpCompletionConfig,
    client: reqwest::Client,
}

impl HttpCompletionProvider {
    pub fn new(config: HttpCompletionConfig) -> Self {
        let client = reqwest::Client::builder().timeout(config.timeout).build().unwrap_or_else(|_| reqwest::Client::new());
        Self { config, client }
    }
}

#[async_trait]
impl CompletionProvider for HttpCompletionProvider {
    async fn complete(&self, prompt: &str) -> Result<String> {
        use tooling::async_utils::retry::with_retry;

        with_retry(&self.config.retry, || async {
            let mut request = self.client.post(&self.config.url).json(&HttpCompletionRequest { prompt });
            if let Some(api_key) = &self.config.api_key {
                request = request.bearer_auth(api_key);
            }

            let response = request.send().await.map_err(|e| e.to_string())?;
            let response = response.error_for_status().map_err(|e| e.to_string())?;
            let body: HttpCompletionResponse = response.json().await.map_err(|e| e.to_string())?;
            Ok(body.completion)
        })
        .await
        .map_err(SandboxError::Completion)
    }
}

/// Substitute `{name}`-style placeholders in `template` against `inputs`,
/// the way `llm_service.py`'s prompt formatter did, leaving any name with no
/// matching input untouched.
pub fn format_prompt(template: &str, inputs: &HashMap<String, Value>) -> String {
    let mut prompt = template.to_string();
    for (name, value) in inputs {
        let placeholder = format!("{{{name}}}");
        let text = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        prompt = prompt.replace(&placeholder, &text);
    }
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn echo_provider_returns_prompt_verbatim() {
        let out = EchoCompletionProvider.complete("hello world").await.unwrap();
        assert_eq!(out, "hello world");
    }

    #[tokio::test]
    async fn template_provider_wraps_prompt() {
        let provider = TemplateCompletionProvider::new("[{prompt}]");
        let out = provider.complete("hi").await.unwrap();
        assert_eq!(out, "[hi]");
    }

    #[test]
    fn http_completion_config_defaults_to_no_api_key() {
        let config = HttpCompletionConfig::new("https://example.invalid/complete");
        assert!(config.api_key.is_none());
        assert_eq!(config.timeout, std::time::Duration::from_secs(30));

        let config = config.with_api_key("secret").with_timeout(std::time::Duration::from_secs(5));
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.timeout, std::time::Duration::from_secs(5));
    }

    #[test]
    fn format_prompt_substitutes_known_names_and_leaves_rest() {
        let mut inputs = HashMap::new();
        inputs.insert("name".to_string(), json!("Ada"));
        let prompt = format_prompt("hello {name}, also {unknown}", &inputs);
        assert_eq!(prompt, "hello Ada, also {unknown}");
    }
}
