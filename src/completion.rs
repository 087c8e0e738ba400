//! Text generation through the Hugging Face inference API
//!
//! The primary model is tried first; any failure there falls through to a
//! smaller fallback model. Like the weather client, [`CompletionClient::complete`]
//! always yields something to say.

use std::sync::Arc;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::http::{HttpResponse, HttpTransport};
use crate::{Error, Result};

/// Primary generation endpoint
pub const DEFAULT_PRIMARY_URL: &str =
    "https://api-inference.huggingface.co/models/mistralai/Mistral-7B-Instruct-v0.2";

/// Endpoint tried after the primary fails
pub const DEFAULT_FALLBACK_URL: &str =
    "https://api-inference.huggingface.co/models/google/flan-t5-base";

/// Spoken when no API key is configured
pub const MISSING_KEY_MESSAGE: &str =
    "AI API key not configured. Please add your Hugging Face API key to the .env file.";

/// Per-request deadline for both endpoints
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Sampling parameters sent with every prompt
#[derive(Debug, Clone, Serialize)]
pub struct GenerationParameters {
    pub max_new_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
    pub do_sample: bool,
}

impl Default for GenerationParameters {
    fn default() -> Self {
        Self {
            max_new_tokens: 250,
            temperature: 0.7,
            top_p: 0.95,
            do_sample: true,
        }
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    inputs: &'a str,
    parameters: &'a GenerationParameters,
}

#[derive(Deserialize)]
struct Generation {
    generated_text: String,
}

/// Pull `generated_text` out of the first element of a 200 response
fn generated_text(response: &HttpResponse) -> Result<String> {
    let generations: Vec<Generation> = response.json()?;
    generations
        .into_iter()
        .next()
        .map(|g| g.generated_text)
        .ok_or_else(|| Error::Completion("empty generation list".to_string()))
}

/// Generates free-form answers for unrecognized commands
pub struct CompletionClient {
    transport: Arc<dyn HttpTransport>,
    api_key: Option<SecretString>,
    primary_url: String,
    fallback_url: String,
    parameters: GenerationParameters,
    timeout: Duration,
}

impl CompletionClient {
    /// Create a client for the given endpoints
    ///
    /// A `None` key is allowed; each call then answers with
    /// [`MISSING_KEY_MESSAGE`] instead of contacting the service.
    #[must_use]
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        api_key: Option<SecretString>,
        primary_url: impl Into<String>,
        fallback_url: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            api_key,
            primary_url: primary_url.into(),
            fallback_url: fallback_url.into(),
            parameters: GenerationParameters::default(),
            timeout: REQUEST_TIMEOUT,
        }
    }

    /// Generate a reply to `prompt`
    pub async fn complete(&self, prompt: &str) -> String {
        let Some(key) = &self.api_key else {
            tracing::warn!("completion requested without an API key");
            return MISSING_KEY_MESSAGE.to_string();
        };

        let body = match serde_json::to_value(CompletionRequest {
            inputs: prompt,
            parameters: &self.parameters,
        }) {
            Ok(body) => body,
            Err(e) => return format!("Error with AI service: {e}"),
        };
        let key = key.expose_secret();

        match self.try_primary(key, &body).await {
            Ok(text) => return text,
            Err(e) => tracing::warn!(error = %e, "primary model failed, trying fallback"),
        }

        match self
            .transport
            .post_json(&self.fallback_url, key, &body, self.timeout)
            .await
        {
            Ok(response) if response.is_ok() => generated_text(&response)
                .unwrap_or_else(|e| format!("Error with AI service: {e}")),
            Ok(response) => {
                tracing::error!(status = response.status, "fallback model failed");
                format!("Error getting AI response: {}", response.status)
            }
            Err(e) => {
                tracing::error!(error = %e, "fallback model request failed");
                format!("Error with AI service: {e}")
            }
        }
    }

    async fn try_primary(&self, key: &str, body: &serde_json::Value) -> Result<String> {
        let response = self
            .transport
            .post_json(&self.primary_url, key, body, self.timeout)
            .await?;

        if !response.is_ok() {
            return Err(Error::Completion(format!(
                "primary model returned {}",
                response.status
            )));
        }

        let text = generated_text(&response)?;
        tracing::debug!(chars = text.len(), "primary model answered");
        Ok(text)
    }
}
