//! src/llm/mod.rs

use crate::errors::CompletionError;
use crate::prompt::{extended_description_prompt, Prompt};
use crate::ui::Spinner;
use async_trait::async_trait;

pub mod openai;

pub use openai::OpenClient;

/// Per-call model settings.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionOptions {
    pub model: String,
    pub max_tokens: u32,
}

/// The `LLMClient` trait defines the interface for a chat-completion backend.
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Returns the name of the LLM client.
    fn name(&self) -> &str;
    /// Sends the prompt and returns the trimmed text of the reply.
    async fn call(
        &self,
        prompt: &Prompt,
        options: &CompletionOptions,
    ) -> Result<String, CompletionError>;
}

fn failure_label(err: &CompletionError) -> &'static str {
    match err {
        CompletionError::MissingApiKey => "Missing API key",
        CompletionError::Connection(_) => "Connection error",
        CompletionError::Authentication => "Authentication error",
        CompletionError::BadRequest(_) => "Invalid request",
        CompletionError::Api { .. } | CompletionError::EmptyResponse => "API error",
        CompletionError::Transport(_) => "An unexpected error occurred",
    }
}

async fn call_with_spinner(
    client: &dyn LLMClient,
    prompt: &Prompt,
    options: &CompletionOptions,
    working: &str,
    done: &str,
) -> Result<String, CompletionError> {
    log::debug!(
        "Calling {} with model {} (max_tokens {})",
        client.name(),
        options.model,
        options.max_tokens
    );
    let spinner = Spinner::start(working);
    match client.call(prompt, options).await {
        Ok(text) => {
            spinner.success(done);
            Ok(text)
        }
        Err(e) => {
            spinner.fail(failure_label(&e));
            Err(e)
        }
    }
}

/// Asks the model for a commit message describing the prompt's diff.
pub async fn summarize_diff(
    client: &dyn LLMClient,
    prompt: &Prompt,
    options: &CompletionOptions,
) -> Result<String, CompletionError> {
    call_with_spinner(
        client,
        prompt,
        options,
        "Generating commit message with AI",
        "Commit message generated",
    )
    .await
}

/// Asks the model for a longer commit body explaining `diff`.
pub async fn generate_extended_description(
    client: &dyn LLMClient,
    diff: &str,
    max_diff_tokens: usize,
    options: &CompletionOptions,
) -> Result<String, CompletionError> {
    let prompt = extended_description_prompt(diff, max_diff_tokens);
    call_with_spinner(
        client,
        &prompt,
        options,
        "Generating extended description with AI",
        "Extended description generated",
    )
    .await
}
