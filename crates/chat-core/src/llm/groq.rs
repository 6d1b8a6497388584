use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::provider::{
    ChatMessage, CompletionFuture, CompletionProvider, CompletionRequest, CompletionResponse,
    ProviderError, TokenUsage,
};
use crate::config::ConfigError;
use crate::config_env::{optional_trimmed_env, parse_u64_env, require_env};

const DEFAULT_CHAT_COMPLETIONS_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const DEFAULT_MODEL: &str = "llama3-70b-8192";
const DEFAULT_TIMEOUT_MS: u64 = 30_000;

#[derive(Debug, Clone)]
pub struct GroqProviderConfig {
    pub chat_completions_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout_ms: u64,
}

impl GroqProviderConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = require_env("GROQ_API_KEY")?;
        let chat_completions_url = optional_trimmed_env("GROQ_CHAT_COMPLETIONS_URL")
            .unwrap_or_else(|| DEFAULT_CHAT_COMPLETIONS_URL.to_string());
        if !chat_completions_url.starts_with("http://")
            && !chat_completions_url.starts_with("https://")
        {
            return Err(ConfigError::InvalidConfiguration(
                "GROQ_CHAT_COMPLETIONS_URL must start with http:// or https://".to_string(),
            ));
        }

        let timeout_ms = parse_u64_env("GROQ_TIMEOUT_MS", DEFAULT_TIMEOUT_MS)?;
        if timeout_ms == 0 {
            return Err(ConfigError::InvalidConfiguration(
                "GROQ_TIMEOUT_MS must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            chat_completions_url,
            api_key,
            model: optional_trimmed_env("GROQ_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            timeout_ms,
        })
    }
}

#[derive(Clone)]
pub struct GroqProvider {
    client: reqwest::Client,
    config: GroqProviderConfig,
}

impl GroqProvider {
    pub fn new(config: GroqProviderConfig) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|err| {
                ConfigError::InvalidConfiguration(format!("failed to build http client: {err}"))
            })?;

        Ok(Self { client, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    async fn send(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError> {
        let request_body = GroqChatRequest {
            model: &self.config.model,
            messages: &request.messages,
            temperature: request.sampling.temperature,
            max_tokens: request.sampling.max_tokens,
            top_p: request.sampling.top_p,
        };

        let response = self
            .client
            .post(&self.config.chat_completions_url)
            .bearer_auth(&self.config.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let header_request_id = header_request_id(response.headers());
        let body = response.text().await.map_err(map_transport_error)?;

        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                code: parse_provider_error_code(&body),
            });
        }

        let parsed: GroqSuccessResponse = serde_json::from_str(&body)
            .map_err(|_| ProviderError::InvalidPayload("response_json_parse_failed".to_string()))?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::InvalidPayload("missing_choice".to_string()))?;

        let content = match choice.message.content {
            Some(Value::String(content)) => content,
            _ => {
                return Err(ProviderError::InvalidPayload(
                    "unsupported_content_shape".to_string(),
                ));
            }
        };

        let model = parsed.model.unwrap_or_else(|| self.config.model.clone());
        debug!(model = %model, "groq completion received");

        Ok(CompletionResponse {
            model,
            provider_request_id: header_request_id.or(parsed.id),
            content,
            usage: parsed.usage.map(|usage| TokenUsage {
                prompt_tokens: clamp_u64_to_u32(usage.prompt_tokens.unwrap_or(0)),
                completion_tokens: clamp_u64_to_u32(usage.completion_tokens.unwrap_or(0)),
                total_tokens: clamp_u64_to_u32(usage.total_tokens.unwrap_or(0)),
            }),
        })
    }
}

impl CompletionProvider for GroqProvider {
    fn complete<'a>(&'a self, request: CompletionRequest) -> CompletionFuture<'a> {
        Box::pin(self.send(request))
    }
}

#[derive(Debug, Serialize)]
struct GroqChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f64,
    max_tokens: u32,
    top_p: f64,
}

#[derive(Debug, Deserialize)]
struct GroqSuccessResponse {
    id: Option<String>,
    model: Option<String>,
    #[serde(default)]
    choices: Vec<GroqChoice>,
    usage: Option<GroqUsage>,
}

#[derive(Debug, Deserialize)]
struct GroqChoice {
    message: GroqMessage,
}

#[derive(Debug, Deserialize)]
struct GroqMessage {
    content: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct GroqUsage {
    prompt_tokens: Option<u64>,
    completion_tokens: Option<u64>,
    total_tokens: Option<u64>,
}

fn map_transport_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout
    } else if err.is_connect() {
        ProviderError::RequestFailed("connect_failed".to_string())
    } else {
        ProviderError::RequestFailed("request_unavailable".to_string())
    }
}

fn header_request_id(headers: &reqwest::header::HeaderMap) -> Option<String> {
    headers
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .map(ToString::to_string)
}

fn parse_provider_error_code(body: &str) -> String {
    #[derive(Deserialize)]
    struct ProviderErrorEnvelope {
        error: Option<ProviderErrorDetails>,
    }

    #[derive(Deserialize)]
    struct ProviderErrorDetails {
        code: Option<Value>,
        #[serde(rename = "type")]
        kind: Option<String>,
    }

    let Some(details) = serde_json::from_str::<ProviderErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error)
    else {
        return "unknown".to_string();
    };

    match details.code {
        Some(Value::String(code)) => code,
        Some(Value::Number(code)) => code.to_string(),
        _ => details.kind.unwrap_or_else(|| "unknown".to_string()),
    }
}

fn clamp_u64_to_u32(value: u64) -> u32 {
    value.min(u32::MAX as u64) as u32
}
