//! LLM inference collaborator.
//!
//! [`TextGenerator`] is the dependency-injection seam: the production
//! implementation speaks an OpenAI-compatible chat-completions API, and
//! tests substitute canned generators. Replies are treated as untrusted —
//! [`extract_first_json`] digs the first balanced JSON object out of
//! whatever prose or markdown surrounds it.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde_json::{json, Value};

use crate::error::ClassifyError;

/// Generation knobs for one request.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub temperature: f64,
    pub max_tokens: u32,
    /// Ask the service to constrain output to a JSON object.
    pub json_format: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            temperature: 0.1,
            max_tokens: 512,
            json_format: true,
        }
    }
}

/// Abstract text-generation collaborator.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generates a completion for `prompt`.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifyError`] on transport or service failure; callers
    /// fall back to rule-based classification.
    async fn generate(&self, prompt: &str, options: &GenerateOptions)
        -> Result<String, ClassifyError>;
}

/// OpenAI-compatible chat-completions client.
pub struct LlmClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl LlmClient {
    /// Creates a client for the configured inference endpoint.
    ///
    /// `base_url` is the API root, e.g. `http://localhost:11434/v1`.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifyError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        base_url: &str,
        api_key: Option<&str>,
        model: &str,
        timeout_secs: u64,
    ) -> Result<Self, ClassifyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(5))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            api_key: api_key.map(ToOwned::to_owned),
            model: model.to_owned(),
        })
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    async fn generate(
        &self,
        prompt: &str,
        options: &GenerateOptions,
    ) -> Result<String, ClassifyError> {
        let url = format!("{}/chat/completions", self.base_url);
        let mut body = json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": options.temperature,
            "max_tokens": options.max_tokens,
        });
        if options.json_format {
            body["response_format"] = json!({ "type": "json_object" });
        }

        let mut request = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.header(AUTHORIZATION, format!("Bearer {key}"));
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClassifyError::ApiError(format!(
                "inference returned {status}: {}",
                body.chars().take(200).collect::<String>()
            )));
        }

        let value: Value = response.json().await?;
        let content = value
            .get("choices")
            .and_then(Value::as_array)
            .and_then(|choices| choices.first())
            .and_then(|choice| choice.pointer("/message/content"))
            .and_then(Value::as_str);

        match content {
            Some(text) if !text.trim().is_empty() => Ok(text.to_owned()),
            _ => Err(ClassifyError::UnusableReply(
                "completion carried no message content".to_string(),
            )),
        }
    }
}

/// Finds the first balanced JSON object in `text` and parses it.
///
/// Tolerates markdown fences, leading prose, and trailing junk. Brace
/// matching respects string literals and escapes; candidates that fail to
/// parse are skipped in favor of later ones.
#[must_use]
pub fn extract_first_json(text: &str) -> Option<Value> {
    let bytes = text.as_bytes();
    let mut search_from = 0;
    while let Some(rel) = text[search_from..].find('{') {
        let start = search_from + rel;
        let mut depth = 0usize;
        let mut in_string = false;
        let mut escaped = false;
        for (offset, &b) in bytes[start..].iter().enumerate() {
            if in_string {
                if escaped {
                    escaped = false;
                } else if b == b'\\' {
                    escaped = true;
                } else if b == b'"' {
                    in_string = false;
                }
                continue;
            }
            match b {
                b'"' => in_string = true,
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        let candidate = &text[start..=start + offset];
                        if let Ok(value) = serde_json::from_str::<Value>(candidate) {
                            return Some(value);
                        }
                        break;
                    }
                }
                _ => {}
            }
        }
        search_from = start + 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_bare_object() {
        let value = extract_first_json(r#"{"intent": "find-nearest"}"#).unwrap();
        assert_eq!(value["intent"], "find-nearest");
    }

    #[test]
    fn extracts_object_from_markdown_fence() {
        let reply = "Here is the classification:\n```json\n{\"intent\": \"find-enroute\", \"confidence\": 0.8}\n```\nDone.";
        let value = extract_first_json(reply).unwrap();
        assert_eq!(value["intent"], "find-enroute");
    }

    #[test]
    fn handles_braces_inside_strings() {
        let reply = r#"{"reasoning": "user wrote {weird} text", "confidence": 0.7}"#;
        let value = extract_first_json(reply).unwrap();
        assert_eq!(value["confidence"], 0.7);
    }

    #[test]
    fn skips_unparsable_prefix_object() {
        let reply = r#"{not json} but then {"intent": "clarification"}"#;
        let value = extract_first_json(reply).unwrap();
        assert_eq!(value["intent"], "clarification");
    }

    #[test]
    fn no_object_is_none() {
        assert!(extract_first_json("sorry, I can't help with that").is_none());
        assert!(extract_first_json("").is_none());
    }

    #[test]
    fn unterminated_object_is_none() {
        assert!(extract_first_json(r#"{"intent": "find-nearest""#).is_none());
    }
}
