//! Mock LLM for tests and offline runs.
//!
//! Returns a fixed reply, a scripted sequence of replies (one per call, the last one repeats),
//! or always fails. Every request is recorded so tests can assert on the prompts that were sent.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::EvalError;
use crate::llm::{LlmClient, LlmResponse};
use crate::message::Message;

/// Mock LLM: scripted assistant replies and a log of received requests.
pub struct MockLlm {
    /// Replies in call order; `Err` entries simulate backend failures.
    script: Vec<Result<String, String>>,
    /// Number of invoke() calls so far.
    call_count: AtomicUsize,
    /// Messages received by each call, in order.
    requests: Mutex<Vec<Vec<Message>>>,
}

impl MockLlm {
    /// Creates a mock that always returns `content`.
    pub fn new(content: impl Into<String>) -> Self {
        Self::scripted(vec![content.into()])
    }

    /// Creates a mock that returns `replies` in order; the last reply repeats once exhausted.
    pub fn scripted(replies: Vec<String>) -> Self {
        Self {
            script: replies.into_iter().map(Ok).collect(),
            call_count: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Creates a mock whose every call fails with a backend error carrying `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            script: vec![Err(message.into())],
            call_count: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Appends a failing step to the script (builder).
    pub fn then_fail(mut self, message: impl Into<String>) -> Self {
        self.script.push(Err(message.into()));
        self
    }

    /// Appends a reply to the script (builder).
    pub fn then_reply(mut self, content: impl Into<String>) -> Self {
        self.script.push(Ok(content.into()));
        self
    }

    /// Number of completed invoke() calls.
    pub fn calls(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Messages received by every call so far.
    pub fn requests(&self) -> Vec<Vec<Message>> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// Messages of the most recent call.
    pub fn last_request(&self) -> Option<Vec<Message>> {
        self.requests().pop()
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, EvalError> {
        if let Ok(mut log) = self.requests.lock() {
            log.push(messages.to_vec());
        }
        let n = self.call_count.fetch_add(1, Ordering::SeqCst);
        let step = self
            .script
            .get(n)
            .or_else(|| self.script.last())
            .cloned()
            .unwrap_or_else(|| Ok(String::new()));
        match step {
            Ok(content) => Ok(LlmResponse {
                content,
                usage: None,
            }),
            Err(message) => Err(EvalError::Backend(message)),
        }
    }
}
