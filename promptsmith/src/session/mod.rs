//! Per-user conversation state: the last drafted prompt and its last evaluation.
//!
//! A session is created on a user's first interaction, replaced after each successful
//! pipeline stage and removed on restart. Only the owning user's turn reads or writes it.
//! Expiry is left to the store implementation.

mod sqlite_store;

pub use sqlite_store::SqliteSessionStore;

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::evaluation::EvaluationReport;

/// Error from [`SessionStore`] operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SessionStoreError {
    #[error("session store error: {0}")]
    Other(String),
}

/// Typed per-user session record.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    /// Most recent drafted (or refined) prompt.
    pub last_draft_prompt: Option<String>,
    /// Evaluation of `last_draft_prompt`, until it is refined or re-drafted.
    pub last_evaluation_report: Option<EvaluationReport>,
}

impl SessionState {
    /// State after a new draft: the previous evaluation no longer applies.
    pub fn with_draft(draft: impl Into<String>) -> Self {
        Self {
            last_draft_prompt: Some(draft.into()),
            last_evaluation_report: None,
        }
    }
}

/// Session map keyed by user identifier.
///
/// `get` on an unknown user returns a default (empty) state.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, user_id: &str) -> Result<SessionState, SessionStoreError>;

    async fn put(&self, user_id: &str, state: SessionState) -> Result<(), SessionStoreError>;

    /// Drops the user's session; removing an unknown user is not an error.
    async fn remove(&self, user_id: &str) -> Result<(), SessionStoreError>;
}

/// In-process session map. Sessions live until removed or the process exits.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: DashMap<String, SessionState>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of users with a stored session.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, user_id: &str) -> Result<SessionState, SessionStoreError> {
        Ok(self
            .sessions
            .get(user_id)
            .map(|s| s.value().clone())
            .unwrap_or_default())
    }

    async fn put(&self, user_id: &str, state: SessionState) -> Result<(), SessionStoreError> {
        self.sessions.insert(user_id.to_string(), state);
        Ok(())
    }

    async fn remove(&self, user_id: &str) -> Result<(), SessionStoreError> {
        self.sessions.remove(user_id);
        Ok(())
    }
}
