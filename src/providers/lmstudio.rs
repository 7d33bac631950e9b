use anyhow::Result;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use log::{debug, error};

use crate::errors::ProviderError;
use crate::providers::Provider;

/// LM Studio client, speaking the OpenAI-compatible chat-completions API
#[derive(Debug)]
pub struct LmStudio {
    /// Base URL of the server, including the /v1 prefix
    base_url: String,
    /// HTTP client for making requests
    client: Client,
    /// Request timeout
    timeout: Duration,
    /// Maximum number of retry attempts
    max_retries: u32,
    /// Base backoff time in milliseconds for exponential backoff
    backoff_base_ms: u64,
}

/// Chat message object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender (system, user or assistant)
    pub role: String,
    /// Content of the message
    pub content: String,
}

impl ChatMessage {
    /// Build a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    /// Build a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Chat completion request
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    /// Model identifier as loaded in the server
    model: String,
    /// Messages of the conversation
    messages: Vec<ChatMessage>,
    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    /// Maximum number of tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    /// Whether to stream the response
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

/// Builder methods for ChatCompletionRequest
impl ChatCompletionRequest {
    /// Create a new chat completion request
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature: None,
            max_tokens: None,
            stream: Some(false),
        }
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the maximum number of generated tokens
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// One completion choice in the response
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatCompletionChoice {
    /// Position of this choice
    pub index: u32,
    /// Response message
    pub message: ChatMessage,
    /// Why generation stopped
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// Token accounting reported by the server
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatCompletionUsage {
    /// Number of prompt tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_tokens: Option<u64>,
    /// Number of generated tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_tokens: Option<u64>,
    /// Total tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_tokens: Option<u64>,
}

/// Chat completion response
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    /// Model that produced the response
    #[serde(default)]
    pub model: String,
    /// Generated choices
    pub choices: Vec<ChatCompletionChoice>,
    /// Token accounting
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<ChatCompletionUsage>,
}

impl LmStudio {
    /// Create a new client from a complete base URL
    pub fn from_url(url: impl Into<String>, timeout_secs: u64) -> Self {
        let timeout = Duration::from_secs(timeout_secs);
        Self {
            base_url: url.into().trim_end_matches('/').to_string(),
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            timeout,
            max_retries: 3,
            backoff_base_ms: 1000,
        }
    }

    /// Create a new client with retry configuration
    pub fn with_retries(
        url: impl Into<String>,
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Self {
        let mut client = Self::from_url(url, timeout_secs);
        client.max_retries = max_retries;
        client.backoff_base_ms = backoff_base_ms;
        client
    }

    /// Classify a reqwest error into a provider error
    fn classify_error(e: reqwest::Error, timeout: Duration) -> ProviderError {
        if e.is_timeout() {
            ProviderError::Timeout(format!("no response within {:?}", timeout))
        } else if e.is_connect() {
            ProviderError::ConnectionError(e.to_string())
        } else {
            ProviderError::RequestFailed(e.to_string())
        }
    }

    /// Send a chat completion request with retry and exponential backoff
    async fn chat_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);

        let mut attempt = 0;
        let mut last_error: Option<ProviderError> = None;

        while attempt <= self.max_retries {
            if attempt > 0 {
                let backoff = self.backoff_base_ms * (1u64 << (attempt - 1));
                debug!("Retry {} after {} ms backoff", attempt, backoff);
                tokio::time::sleep(Duration::from_millis(backoff)).await;
            }

            let response_result = self.client.post(&url).json(request).send().await;

            match response_result {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let response_text = response.text().await.map_err(|e| {
                            ProviderError::ParseError(format!(
                                "failed to read response body: {}",
                                e
                            ))
                        })?;

                        return serde_json::from_str::<ChatCompletionResponse>(&response_text)
                            .map_err(|e| {
                                error!(
                                    "Failed to parse chat completion response: {}. Raw response (first 500 chars): {}",
                                    e,
                                    response_text.chars().take(500).collect::<String>()
                                );
                                ProviderError::ParseError(e.to_string())
                            });
                    }

                    let message = response.text().await.unwrap_or_default();
                    let api_error = ProviderError::ApiError {
                        status_code: status.as_u16(),
                        message,
                    };

                    // Client errors won't improve on retry
                    if status.is_client_error() {
                        return Err(api_error);
                    }
                    last_error = Some(api_error);
                }
                Err(e) => {
                    last_error = Some(Self::classify_error(e, self.timeout));
                }
            }

            attempt += 1;
        }

        Err(last_error
            .unwrap_or_else(|| ProviderError::RequestFailed("retries exhausted".to_string())))
    }
}

#[async_trait::async_trait]
impl Provider for LmStudio {
    type Request = ChatCompletionRequest;
    type Response = ChatCompletionResponse;

    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError> {
        self.chat_completion(&request).await
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Self::classify_error(e, self.timeout))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(ProviderError::ApiError {
                status_code: response.status().as_u16(),
                message: "connection test failed".to_string(),
            })
        }
    }

    fn extract_text(response: &Self::Response) -> String {
        response
            .choices
            .first()
            .map(|choice| choice.message.content.clone())
            .unwrap_or_default()
    }
}
