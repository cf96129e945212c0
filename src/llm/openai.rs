//! src/llm/openai.rs
use super::{CompletionOptions, LLMClient};
use crate::config::Config;
use crate::errors::CompletionError;
use crate::prompt::Prompt;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

// --- Wire types ---
#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: MessageContent,
}

#[derive(Deserialize)]
struct MessageContent {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

// --- Client ---
pub struct OpenClient {
    api_key: String,
    api_base: String,
    client: Client,
}

impl OpenClient {
    /// `api_base` is the API root, e.g. `https://api.openai.com/v1`.
    pub fn new(api_key: &str, api_base: &str) -> Result<Self, CompletionError> {
        // Proxies come from HTTPS_PROXY / ALL_PROXY through reqwest's system proxy support.
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("gitai/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(CompletionError::Transport)?;

        Ok(Self {
            api_key: api_key.to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, CompletionError> {
        let api_key = config.api_key().ok_or(CompletionError::MissingApiKey)?;
        Self::new(api_key, &config.openai.api_base)
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.api_base)
    }
}

#[async_trait::async_trait]
impl LLMClient for OpenClient {
    fn name(&self) -> &str {
        "OpenAI"
    }

    async fn call(
        &self,
        prompt: &Prompt,
        options: &CompletionOptions,
    ) -> Result<String, CompletionError> {
        let request_payload = ChatRequest {
            model: &options.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            max_tokens: options.max_tokens,
        };

        let url = self.endpoint();
        log::debug!("POST {}", url);
        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request_payload)
            .send()
            .await
            .map_err(map_transport_error)?;

        let res_status = res.status();
        log::debug!("OpenAI responded with {}", res_status);

        if res_status.is_success() {
            let response = res
                .json::<ChatResponse>()
                .await
                .map_err(map_transport_error)?;
            response
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.message.content)
                .map(|content| content.trim().to_string())
                .filter(|content| !content.is_empty())
                .ok_or(CompletionError::EmptyResponse)
        } else {
            let error_body = res.text().await.unwrap_or_default();
            log::debug!("Error body: {}", error_body);
            Err(error_for_status(res_status, &error_body))
        }
    }
}

fn map_transport_error(err: reqwest::Error) -> CompletionError {
    if err.is_connect() || err.is_timeout() {
        CompletionError::Connection(err)
    } else {
        CompletionError::Transport(err)
    }
}

fn api_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .map(|b| b.error.message)
        .filter(|m| !m.trim().is_empty())
}

fn error_for_status(status: StatusCode, body: &str) -> CompletionError {
    match status {
        StatusCode::UNAUTHORIZED => CompletionError::Authentication,
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => CompletionError::BadRequest(
            api_error_message(body).unwrap_or_else(|| status.to_string()),
        ),
        _ => CompletionError::Api {
            status: status.as_u16(),
            message: api_error_message(body).unwrap_or_else(|| {
                let body = body.trim();
                if body.is_empty() {
                    status.canonical_reason().unwrap_or("").to_string()
                } else {
                    body.to_string()
                }
            }),
        },
    }
}
