//! Rewrite client — the single point of entry for all completion-service
//! calls. No other module talks to the provider directly, and the credential
//! never leaves this side of the trust boundary.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

/// The model used for all rewrite calls.
pub const MODEL: &str = "gpt-4o";
const MAX_TOKENS: u32 = 4000;
const TEMPERATURE: f32 = 0.7;

#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("OPENAI_API_KEY is missing or empty")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

/// The rewrite seam. `AppState` carries an `Arc<dyn ResumeRewriter>` so the
/// handler and controller code never depend on a concrete provider, and
/// tests can stub the completion service.
#[async_trait]
pub trait ResumeRewriter: Send + Sync {
    /// Both arguments are non-empty — enforced by the caller before a
    /// request is ever issued.
    async fn rewrite(
        &self,
        resume_text: &str,
        job_description: &str,
    ) -> Result<String, RewriteError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types (OpenAI chat completions)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// Rewrite client backed by the OpenAI chat completions API.
///
/// Explicitly constructed with a validated credential — construction fails
/// fast on a missing key instead of deferring the error to the first call.
/// No automatic retries: a failed optimization requires user re-submission.
#[derive(Clone)]
pub struct OpenAiRewriteClient {
    client: Client,
    api_url: String,
    api_key: String,
}

impl OpenAiRewriteClient {
    pub fn new(api_url: String, api_key: String) -> Result<Self, RewriteError> {
        if api_key.trim().is_empty() {
            return Err(RewriteError::MissingApiKey);
        }
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .map_err(RewriteError::Http)?,
            api_url,
            api_key,
        })
    }
}

#[async_trait]
impl ResumeRewriter for OpenAiRewriteClient {
    async fn rewrite(
        &self,
        resume_text: &str,
        job_description: &str,
    ) -> Result<String, RewriteError> {
        let user_payload = prompts::user_payload(resume_text, job_description);
        let request_body = ChatRequest {
            model: MODEL,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: prompts::REWRITE_SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &user_payload,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // Surface the provider's message when the body parses; the raw
            // body otherwise.
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(RewriteError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let chat: ChatResponse = response.json().await?;
        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        if content.is_empty() {
            // Observed provider behavior: an empty completion is passed
            // through as success rather than reclassified as a failure.
            warn!("completion service returned no content");
        } else {
            debug!(chars = content.len(), "rewrite completed");
        }

        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_rejects_empty_api_key() {
        let result = OpenAiRewriteClient::new("https://example.invalid".into(), "  ".into());
        assert!(matches!(result, Err(RewriteError::MissingApiKey)));
    }

    #[test]
    fn test_construction_accepts_nonempty_api_key() {
        let result = OpenAiRewriteClient::new("https://example.invalid".into(), "sk-test".into());
        assert!(result.is_ok());
    }

    #[test]
    fn test_request_serializes_with_expected_shape() {
        let request = ChatRequest {
            model: MODEL,
            messages: vec![
                ChatMessage { role: "system", content: "policy" },
                ChatMessage { role: "user", content: "payload" },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4o");
        assert_eq!(json["max_tokens"], 4000);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
    }

    #[test]
    fn test_response_with_content_deserializes() {
        let json = r##"{"choices": [{"message": {"role": "assistant", "content": "# Jane"}}]}"##;
        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            response.choices[0].message.content.as_deref(),
            Some("# Jane")
        );
    }

    #[test]
    fn test_response_with_null_content_deserializes_to_none() {
        let json = r#"{"choices": [{"message": {"role": "assistant", "content": null}}]}"#;
        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert!(response.choices[0].message.content.is_none());
    }

    #[test]
    fn test_provider_error_body_parses() {
        let json = r#"{"error": {"message": "Rate limit reached", "type": "rate_limit"}}"#;
        let parsed: ApiError = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.error.message, "Rate limit reached");
    }
}
