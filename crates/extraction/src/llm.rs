//! Structured-extraction LLM client. Generalizes the project's existing
//! chat-completion wrapper: same request/response shape, same
//! `from_env`/`new` pair, now parameterized on model name and exposing a
//! single `complete` call the extraction adapter drives with its own
//! prompt.

use claim_auditor_core::{Error, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

pub struct LlmClient {
    client: Client,
    api_key: String,
    model: String,
}

impl LlmClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model,
        }
    }

    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("EXTRACTION_API_KEY")
            .map_err(|_| Error::MissingApiKey("extraction service".to_string()))?;
        let model = std::env::var("EXTRACTION_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());
        Ok(Self::new(api_key, model))
    }

    pub async fn complete(&self, system_prompt: &str, user_content: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_content,
                },
            ],
            max_tokens: 4096,
            temperature: 0.0,
        };

        let response = self
            .client
            .post("https://api.openai.com/v1/chat/completions")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::ApiError(
                "extraction-service".to_string(),
                format!("request failed with status {status}: {body}"),
            ));
        }

        let parsed: ChatResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| {
                Error::InvalidResponseFormat("extraction-service".to_string(), "no choices in response".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_service_holds_configured_model() {
        let client = LlmClient::new("key".to_string(), "gpt-4o-mini".to_string());
        assert_eq!(client.model, "gpt-4o-mini");
    }
}
