//! HTTP client for the safety judge (Anthropic Messages API).

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::parse::{Verdict, parse_verdict};
use crate::{Error, Result};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";

/// One call, one short timeout, no retries. An overrun call surfaces as a
/// plain transport error; the pipeline treats it as "cannot decide".
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// The verdict is one small JSON object; anything longer is drift.
const MAX_VERDICT_TOKENS: u32 = 150;

#[derive(Debug, Serialize)]
struct MessageRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// Client for the external natural-language judge.
pub struct SafetyJudge {
    http: reqwest::Client,
    base_url: String,
    api_key: SecretString,
    model: String,
}

impl SafetyJudge {
    pub fn new(api_key: SecretString, model: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key,
            model: model.into(),
        })
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(self)
    }

    fn request(&self, body: &MessageRequest<'_>) -> reqwest::RequestBuilder {
        self.http
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(body)
    }

    /// Ask the judge whether one operation should be auto-approved.
    ///
    /// The request embeds the profile's policy prompt, the tool name, and a
    /// pretty-printed serialization of the input, and instructs the model
    /// to answer with a single strict JSON object.
    pub async fn evaluate(&self, prompt: &str, tool_name: &str, input: &Value) -> Result<Verdict> {
        let pretty = serde_json::to_string_pretty(input)?;
        let content = format!(
            "{prompt}\n\nTool: {tool_name}\nInput: {pretty}\n\n\
             Respond with ONLY valid JSON: {{\"approve\": true/false, \"reason\": \"one sentence\"}}"
        );

        let body = MessageRequest {
            model: &self.model,
            max_tokens: MAX_VERDICT_TOKENS,
            messages: vec![Message {
                role: "user",
                content,
            }],
        };

        debug!(tool = %tool_name, model = %self.model, "asking safety judge");
        let response = self.request(&body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        let payload: MessageResponse = match serde_json::from_str(&text) {
            Ok(payload) => payload,
            Err(_) if !status.is_success() => {
                return Err(Error::Api {
                    status: status.as_u16(),
                    message: text.chars().take(100).collect(),
                });
            }
            Err(err) => return Err(err.into()),
        };

        if let Some(api_error) = payload.error {
            return Err(Error::Api {
                status: status.as_u16(),
                message: api_error.message,
            });
        }
        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                message: "request failed".to_string(),
            });
        }

        let Some(block) = payload.content.first() else {
            return Err(Error::Protocol {
                excerpt: "empty response".to_string(),
            });
        };

        parse_verdict(&block.text)
    }

    /// Check the configured credential with one minimal, low-cost request.
    pub async fn validate_credential(&self) -> Result<()> {
        let body = MessageRequest {
            model: &self.model,
            max_tokens: 1,
            messages: vec![Message {
                role: "user",
                content: "hi".to_string(),
            }],
        };

        let response = self.request(&body).send().await?;
        let status = response.status().as_u16();

        match status {
            401 => Err(Error::Auth {
                message: "invalid API key".to_string(),
            }),
            403 => Err(Error::Auth {
                message: "API key does not have permission".to_string(),
            }),
            s if s >= 400 => {
                let message = response
                    .json::<MessageResponse>()
                    .await
                    .ok()
                    .and_then(|payload| payload.error)
                    .map(|api_error| api_error.message)
                    .unwrap_or_else(|| format!("API error (status {s})"));
                Err(Error::Api { status: s, message })
            }
            _ => Ok(()),
        }
    }
}
