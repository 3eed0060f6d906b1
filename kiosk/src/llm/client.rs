use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use crate::config::TextApiConfig;
use crate::error::{KioskError, Result};

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct CompletionRequest {
    messages: Vec<ChatMessage>,
    model: String,
    private: bool,
}

/// Client for the remote text-completion endpoint.
///
/// Cheap to clone; the underlying `reqwest::Client` is an Arc internally
/// and the config is shared.
#[derive(Clone)]
pub struct TextApiClient {
    client: Client,
    config: Arc<TextApiConfig>,
}

impl TextApiClient {
    pub fn new(config: &TextApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| KioskError::Internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            config: Arc::new(config.clone()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Single-attempt completion. Used by refinement and classification,
    /// where the caller degrades to a fallback value on any error.
    pub async fn complete_json(&self, prompt: &str) -> Result<Value> {
        let response = self
            .send(prompt)
            .await
            .map_err(|e| KioskError::Upstream(format!("Text API request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(KioskError::Upstream(format!(
                "Text API returned {status}: {body}"
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| KioskError::Upstream(format!("Failed to read Text API reply: {e}")))?;
        parse_reply(&body)
    }

    /// Completion with bounded retries, exponential backoff, and jitter.
    /// Used by the pincode lookup path. Transport errors, 429, and 5xx
    /// responses are retried; any other failure is terminal.
    pub async fn complete_json_with_retry(&self, prompt: &str) -> Result<Value> {
        let mut attempt = 0;

        loop {
            attempt += 1;
            match self.send(prompt).await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let body = response.text().await.map_err(|e| {
                            KioskError::Upstream(format!("Failed to read Text API reply: {e}"))
                        })?;
                        return parse_reply(&body);
                    }

                    let transient = status.as_u16() == 429 || status.is_server_error();
                    if !transient || attempt > self.config.max_retries {
                        let body = response.text().await.unwrap_or_default();
                        return Err(KioskError::Upstream(format!(
                            "Text API returned {status} after {attempt} attempts: {body}"
                        )));
                    }
                    tracing::warn!(attempt, %status, "Text API returned transient status, retrying");
                }
                Err(e) => {
                    if attempt > self.config.max_retries {
                        return Err(KioskError::Upstream(format!(
                            "Text API request failed after {attempt} attempts: {e}"
                        )));
                    }
                    tracing::warn!(attempt, error = %e, "Text API request failed, retrying");
                }
            }

            let delay_ms = retry_delay_ms(
                attempt,
                self.config.base_retry_delay_ms,
                self.config.max_retry_delay_ms,
            );
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }
    }

    async fn send(&self, prompt: &str) -> std::result::Result<reqwest::Response, reqwest::Error> {
        let request = CompletionRequest {
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            model: self.config.model.clone(),
            private: self.config.private,
        };

        self.client
            .post(&self.config.base_url)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
    }
}

/// Parse a reply body that is either a JSON object, a JSON-encoded string
/// wrapping fenced JSON, or raw text with a markdown code fence around the
/// actual JSON payload.
fn parse_reply(body: &str) -> Result<Value> {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::String(inner)) => parse_unfenced(&inner),
        Ok(value @ Value::Object(_)) => Ok(value),
        Ok(other) => Err(KioskError::Upstream(format!(
            "Unexpected Text API reply shape: {other}"
        ))),
        Err(_) => parse_unfenced(body),
    }
}

fn parse_unfenced(text: &str) -> Result<Value> {
    let cleaned = unfence(text);
    serde_json::from_str::<Value>(&cleaned)
        .map_err(|_| KioskError::Upstream(format!("Text API reply is not valid JSON: {cleaned}")))
}

/// Strip a markdown code fence (```json ... ```) from a reply, leaving the
/// payload intact when no fence is present.
pub fn unfence(text: &str) -> String {
    let trimmed = text.trim();
    let without_open = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    let without_close = without_open.strip_suffix("```").unwrap_or(without_open);
    without_close.trim().to_string()
}

/// Exponential backoff with jitter: `min(base * 2^(attempt-1), max)` plus a
/// random component up to a quarter of the delay, so synchronized clients
/// do not retry in lockstep.
fn retry_delay_ms(attempt: u32, base_ms: u64, max_ms: u64) -> u64 {
    let exponential = base_ms.saturating_mul(1u64 << attempt.min(16).saturating_sub(1));
    let delay = exponential.min(max_ms);
    let jitter = rand::random::<u64>() % (delay / 4 + 1);
    delay + jitter
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unfence_strips_json_fence() {
        let fenced = "```json\n{\"city\": \"Delhi\"}\n```";
        assert_eq!(unfence(fenced), "{\"city\": \"Delhi\"}");
    }

    #[test]
    fn unfence_strips_bare_fence() {
        let fenced = "```\n{\"a\": 1}\n```";
        assert_eq!(unfence(fenced), "{\"a\": 1}");
    }

    #[test]
    fn unfence_leaves_plain_text_alone() {
        assert_eq!(unfence("{\"a\": 1}"), "{\"a\": 1}");
    }

    #[test]
    fn parse_reply_accepts_direct_object() {
        let value = parse_reply(r#"{"city": "Delhi", "state": "Delhi"}"#).unwrap();
        assert_eq!(value, json!({"city": "Delhi", "state": "Delhi"}));
    }

    #[test]
    fn parse_reply_accepts_json_string_with_fence() {
        let body = serde_json::to_string("```json\n{\"city\": \"Delhi\"}\n```").unwrap();
        let value = parse_reply(&body).unwrap();
        assert_eq!(value, json!({"city": "Delhi"}));
    }

    #[test]
    fn parse_reply_accepts_raw_fenced_text() {
        let value = parse_reply("```json\n{\"document_type\": \"Invoice\"}\n```").unwrap();
        assert_eq!(value, json!({"document_type": "Invoice"}));
    }

    #[test]
    fn parse_reply_rejects_garbage() {
        assert!(parse_reply("not json at all").is_err());
    }

    #[test]
    fn retry_delay_grows_and_caps() {
        let d1 = retry_delay_ms(1, 250, 4000);
        let d2 = retry_delay_ms(2, 250, 4000);
        let d3 = retry_delay_ms(3, 250, 4000);
        assert!((250..=313).contains(&d1));
        assert!((500..=625).contains(&d2));
        assert!((1000..=1250).contains(&d3));

        let capped = retry_delay_ms(10, 250, 4000);
        assert!(capped <= 5000);
    }
}
