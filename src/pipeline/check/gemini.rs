use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::types::TextGenerate;
use super::CheckError;
use crate::config::Config;

/// Sampling temperature for rule checks. Low, because the task is
/// verification against the document text, not creative generation.
const TEMPERATURE: f32 = 0.1;

/// HTTP client for the Gemini `generateContent` API.
///
/// Constructed once from configuration and shared for the process
/// lifetime; the underlying `reqwest::Client` pools connections.
pub struct GeminiClient {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
    timeout_secs: u64,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Self {
        Self::with_endpoint(
            &config.base_url,
            &config.api_key,
            &config.model,
            config.timeout_secs,
        )
    }

    /// Build a client against an explicit endpoint. Tests point this at a
    /// local mock server.
    pub fn with_endpoint(base_url: &str, api_key: &str, model: &str, timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            client,
            timeout_secs,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Request body for `models/{model}:generateContent`
#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
}

/// Response body — only the path down to the reply text is modeled.
#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ReplyPart>,
}

#[derive(Deserialize)]
struct ReplyPart {
    text: Option<String>,
}

#[async_trait]
impl TextGenerate for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, CheckError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
            },
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    CheckError::Connection(self.base_url.clone())
                } else if e.is_timeout() {
                    CheckError::Timeout(self.timeout_secs)
                } else {
                    CheckError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CheckError::ServiceStatus {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| CheckError::ResponseParsing(e.to_string()))?;

        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .ok_or_else(|| {
                CheckError::ResponseParsing("reply contained no candidate text".to_string())
            })
    }
}

/// Mock text-generation client for tests — returns a configurable reply
/// or a configurable failure, and counts calls.
pub struct MockTextClient {
    reply: Option<String>,
    calls: std::sync::atomic::AtomicUsize,
}

impl MockTextClient {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// A client whose every call fails with a service error.
    pub fn failing() -> Self {
        Self {
            reply: None,
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// Number of generate calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerate for MockTextClient {
    async fn generate(&self, _prompt: &str) -> Result<String, CheckError> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        match &self.reply {
            Some(reply) => Ok(reply.clone()),
            None => Err(CheckError::ServiceStatus {
                status: 503,
                body: "mock outage".to_string(),
            }),
        }
    }
}
