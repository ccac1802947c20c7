use super::types::{ChatRequest, ChatResponse, MessagesRequest, MessagesResponse};
use super::{AnalyzerError, Conversation, TextGenerator};
use crate::config::{ModelBackend, ModelConfig};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Pick the client for `config.backend`.
pub fn build_generator(config: &ModelConfig) -> Result<Arc<dyn TextGenerator>, AnalyzerError> {
    let generator: Arc<dyn TextGenerator> = match config.backend {
        ModelBackend::Anthropic => Arc::new(AnthropicClient::new(config)?),
        ModelBackend::OpenAi => Arc::new(OpenAiClient::new(config)?),
    };
    info!(backend = %config.backend, model = %config.model, "model client ready");
    Ok(generator)
}

/// Client for the Anthropic Messages API
pub struct AnthropicClient {
    http: Client,
    endpoint: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl AnthropicClient {
    pub fn new(config: &ModelConfig) -> Result<Self, AnalyzerError> {
        Ok(Self {
            http: http_client(config.timeout)?,
            endpoint: config.endpoint.clone(),
            api_key: require_key(config)?,
            model: config.model.clone(),
            max_tokens: config.max_output_tokens,
            temperature: config.temperature,
        })
    }
}

#[async_trait]
impl TextGenerator for AnthropicClient {
    async fn generate(&self, conversation: &Conversation) -> Result<String, AnalyzerError> {
        let req = MessagesRequest::new(
            &self.model,
            self.max_tokens,
            self.temperature,
            conversation,
        );
        debug!(model = %self.model, turns = conversation.len(), "sending messages request");

        let response = self
            .http
            .post(format!("{}/v1/messages", self.endpoint))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&req)
            .send()
            .await?;

        let res: MessagesResponse = read_json(response).await?;
        res.into_text().ok_or(AnalyzerError::EmptyResponse)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Client for the OpenAI Chat Completions API
pub struct OpenAiClient {
    http: Client,
    endpoint: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl OpenAiClient {
    pub fn new(config: &ModelConfig) -> Result<Self, AnalyzerError> {
        Ok(Self {
            http: http_client(config.timeout)?,
            endpoint: config.endpoint.clone(),
            api_key: require_key(config)?,
            model: config.model.clone(),
            max_tokens: config.max_output_tokens,
            temperature: config.temperature,
        })
    }
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    async fn generate(&self, conversation: &Conversation) -> Result<String, AnalyzerError> {
        let req = ChatRequest::new(
            &self.model,
            self.max_tokens,
            self.temperature,
            conversation,
        );
        debug!(model = %self.model, turns = conversation.len(), "sending chat request");

        let response = self
            .http
            .post(format!("{}/v1/chat/completions", self.endpoint))
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await?;

        let res: ChatResponse = read_json(response).await?;
        res.into_text().ok_or(AnalyzerError::EmptyResponse)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

fn http_client(timeout: Duration) -> Result<Client, AnalyzerError> {
    Ok(Client::builder().timeout(timeout).build()?)
}

fn require_key(config: &ModelConfig) -> Result<String, AnalyzerError> {
    config
        .api_key
        .clone()
        .ok_or(AnalyzerError::MissingApiKey {
            var: config.backend.api_key_var(),
        })
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, AnalyzerError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(AnalyzerError::ServerError {
            status: status.as_u16(),
            body,
        });
    }

    Ok(response.json().await?)
}
