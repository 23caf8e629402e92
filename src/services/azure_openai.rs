use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::error::CompletionError;
use crate::services::{ChatMessage, CompletionClient};

pub const TEMPERATURE: f64 = 0.7;
pub const MAX_TOKENS: u32 = 1500;

#[derive(Debug, Serialize)]
struct ChatRequest {
    messages: Vec<ChatMessage>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

pub struct AzureOpenAIService {
    api_key: String,
    endpoint: String,
    api_version: String,
    deployment: String,
    client: reqwest::Client,
}

impl AzureOpenAIService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_version: config.api_version.clone(),
            deployment: config.deployment.clone(),
            client: reqwest::Client::new(),
        }
    }

    pub fn deployment(&self) -> &str {
        &self.deployment
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint, self.deployment, self.api_version
        )
    }

    fn parse_response(response_text: &str) -> Result<String, CompletionError> {
        let chat_response: ChatResponse = serde_json::from_str(response_text)
            .map_err(|e| CompletionError::MalformedResponse(e.to_string()))?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(CompletionError::EmptyResponse)
    }
}

#[async_trait::async_trait]
impl CompletionClient for AzureOpenAIService {
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String, CompletionError> {
        let request = ChatRequest {
            messages,
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        log::info!("🤖 Sending request to Azure OpenAI deployment: {}", self.deployment);
        if let Ok(payload) = serde_json::to_string(&request) {
            log::debug!("📤 Request payload size: {} bytes", payload.len());
        }
        for url in request.messages.iter().flat_map(|message| message.image_urls()) {
            let prefix: String = url.chars().take(40).collect();
            log::debug!("🖼️ Image data URL: {}... ({} chars)", prefix, url.len());
        }

        let response = self
            .client
            .post(self.completions_url())
            .header("api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        log::info!("📥 Azure OpenAI response status: {}", status);

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            log::error!("❌ Azure OpenAI API error ({}): {}", status, error_text);
            return Err(CompletionError::Api {
                status: status.as_u16(),
                body: error_text,
            });
        }

        let response_text = response.text().await?;
        log::debug!("📄 Raw response size: {} bytes", response_text.len());

        let content = Self::parse_response(&response_text)?;
        log::info!("✅ Received completion ({} chars)", content.len());
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(endpoint: &str) -> AzureOpenAIService {
        AzureOpenAIService::new(&AppConfig {
            api_key: "test_key".to_string(),
            endpoint: endpoint.to_string(),
            api_version: "2024-02-15-preview".to_string(),
            deployment: "gpt-4o".to_string(),
            bind_addr: "127.0.0.1:0".to_string(),
        })
    }

    #[test]
    fn test_completions_url() {
        let service = service("https://example.openai.azure.com/");
        assert_eq!(
            service.completions_url(),
            "https://example.openai.azure.com/openai/deployments/gpt-4o/chat/completions?api-version=2024-02-15-preview"
        );
    }

    #[test]
    fn test_request_carries_fixed_sampling_settings() {
        let request = ChatRequest {
            messages: vec![ChatMessage::user("hi")],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["max_tokens"], 1500);
        assert!((json["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
        assert_eq!(json["messages"][0]["content"], "hi");
    }

    #[test]
    fn test_parse_response_takes_first_choice() {
        let body = r#"{
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "1. Oatmeal"}},
                {"index": 1, "message": {"role": "assistant", "content": "ignored"}}
            ]
        }"#;

        assert_eq!(AzureOpenAIService::parse_response(body).unwrap(), "1. Oatmeal");
    }

    #[test]
    fn test_parse_response_without_choices() {
        let err = AzureOpenAIService::parse_response(r#"{"choices": []}"#).unwrap_err();
        assert!(matches!(err, CompletionError::EmptyResponse));

        let err = AzureOpenAIService::parse_response(
            r#"{"choices": [{"message": {"role": "assistant", "content": null}}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, CompletionError::EmptyResponse));
    }

    #[test]
    fn test_parse_response_malformed() {
        let err = AzureOpenAIService::parse_response("<html>bad gateway</html>").unwrap_err();
        assert!(matches!(err, CompletionError::MalformedResponse(_)));
    }
}
