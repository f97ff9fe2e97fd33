//! LLM client abstraction.
//!
//! The orchestrator and the evaluation pipeline only see [`LlmClient`]; the concrete client
//! is injected by the caller (`ChatOpenAI` in the binary, `MockLlm` in tests). There is no
//! process-wide client instance.
//!
//! [`request_completion`] is the single-prompt entry point used by the rest of the crate:
//! optional system prompt plus one user prompt in, trimmed assistant text out.

mod mock;
mod openai;

pub use mock::MockLlm;
pub use openai::ChatOpenAI;

use async_trait::async_trait;
use tracing::{debug, error};

use crate::error::EvalError;
use crate::message::Message;

/// Token usage for one LLM call (prompt + completion).
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LlmUsage {
    /// Tokens in the prompt (input).
    pub prompt_tokens: u32,
    /// Tokens in the completion (output).
    pub completion_tokens: u32,
    /// Total tokens (prompt + completion).
    pub total_tokens: u32,
}

/// Response from an LLM completion.
#[derive(Clone, Debug, Default)]
pub struct LlmResponse {
    /// Assistant message content (plain text).
    pub content: String,
    /// Token usage for this call, when the backend reports it.
    pub usage: Option<LlmUsage>,
}

/// LLM client: given messages, returns the assistant reply.
///
/// Implementations map every transport failure to [`EvalError::Backend`]. Timeouts and
/// cancellation belong to the implementation; callers never retry.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Invoke one completion over the given messages.
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, EvalError>;
}

/// Builds the message list for one request: optional system prompt, then the user prompt.
pub fn completion_messages(prompt: &str, system_prompt: Option<&str>) -> Vec<Message> {
    let mut messages = Vec::with_capacity(2);
    if let Some(system) = system_prompt.filter(|s| !s.trim().is_empty()) {
        messages.push(Message::system(system));
    }
    messages.push(Message::user(prompt));
    messages
}

/// Sends one prompt and returns the trimmed reply text.
///
/// A failed call or an empty reply is an [`EvalError::Backend`]; the failing prompt is logged.
pub async fn request_completion(
    llm: &dyn LlmClient,
    prompt: &str,
    system_prompt: Option<&str>,
) -> Result<String, EvalError> {
    let messages = completion_messages(prompt, system_prompt);
    debug!(
        message_count = messages.len(),
        prompt_chars = prompt.chars().count(),
        "requesting completion"
    );
    let response = match llm.invoke(&messages).await {
        Ok(r) => r,
        Err(e) => {
            error!(error = %e, prompt = %prompt, "completion request failed");
            return Err(e);
        }
    };
    if let Some(ref usage) = response.usage {
        debug!(
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            "completion usage"
        );
    }
    let content = response.content.trim();
    if content.is_empty() {
        error!(prompt = %prompt, "completion returned no content");
        return Err(EvalError::Backend("model returned no content".to_string()));
    }
    Ok(content.to_string())
}
