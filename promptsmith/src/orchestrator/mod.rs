//! Conversation orchestrator: draft → evaluate → improve, one backend call per turn.
//!
//! The LLM client and the session store are injected; the orchestrator owns no global
//! state. Session state is written only after a stage succeeds, so a failed turn leaves
//! the previous draft and evaluation in place.

mod refine;

pub use refine::{build_instruction, improvement_targets, ImprovementFilter, RefinementPolicy};

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::EvalError;
use crate::evaluation::{rendered_text, run_evaluation, EvaluationReport};
use crate::llm::{request_completion, LlmClient};
use crate::prompts::{
    fill, PromptTemplates, DRAFT_SYSTEM, DRAFT_USER, EVALUATION_RUBRIC, GREETING,
    REFINE_GENERIC, REFINE_SYSTEM, REFINE_TARGETED_HEADER, REFINE_USER,
};
use crate::session::{SessionState, SessionStore};

/// Tunables of the orchestrator.
#[derive(Clone, Debug, Default)]
pub struct OrchestratorOptions {
    pub refinement: RefinementPolicy,
}

/// Result of a successful evaluation turn.
#[derive(Clone, Debug)]
pub struct EvaluationTurn {
    pub report: EvaluationReport,
    /// `report` rendered for display.
    pub text: String,
}

/// Sequences draft, evaluation and refinement for many users.
pub struct ConversationOrchestrator {
    llm: Arc<dyn LlmClient>,
    sessions: Arc<dyn SessionStore>,
    templates: PromptTemplates,
    options: OrchestratorOptions,
}

impl ConversationOrchestrator {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        sessions: Arc<dyn SessionStore>,
        templates: PromptTemplates,
    ) -> Self {
        Self {
            llm,
            sessions,
            templates,
            options: OrchestratorOptions::default(),
        }
    }

    pub fn with_options(mut self, options: OrchestratorOptions) -> Self {
        self.options = options;
        self
    }

    /// Greeting text; the session is left untouched.
    pub fn greeting(&self) -> Result<String, EvalError> {
        Ok(self.templates.require(GREETING)?.to_string())
    }

    /// Resets the user's session and returns the greeting.
    pub async fn start(&self, user_id: &str) -> Result<String, EvalError> {
        let greeting = self.greeting()?;
        self.sessions.remove(user_id).await?;
        info!(user_id = %user_id, "session started");
        Ok(greeting)
    }

    /// Drafts a prompt for `task`; the draft replaces the user's previous one and clears
    /// their last evaluation.
    pub async fn draft(&self, user_id: &str, task: &str) -> Result<String, EvalError> {
        let system = self.templates.require(DRAFT_SYSTEM)?;
        let prompt = fill(self.templates.require(DRAFT_USER)?, &[("task", task)]);
        debug!(user_id = %user_id, "drafting prompt");
        let draft = request_completion(self.llm.as_ref(), &prompt, Some(system)).await?;
        self.sessions
            .put(user_id, SessionState::with_draft(draft.clone()))
            .await?;
        info!(user_id = %user_id, draft_chars = draft.chars().count(), "prompt drafted");
        Ok(draft)
    }

    /// Evaluates the user's last draft and stores the report.
    pub async fn evaluate(&self, user_id: &str) -> Result<EvaluationTurn, EvalError> {
        let rubric = self.templates.require(EVALUATION_RUBRIC)?;
        let mut session = self.sessions.get(user_id).await?;
        let draft = session.last_draft_prompt.clone().ok_or(EvalError::NoDraft)?;

        let report = run_evaluation(self.llm.as_ref(), &draft, rubric).await?;
        let text = rendered_text(&report);
        info!(
            user_id = %user_id,
            criteria = report.criteria().len(),
            total = ?report.total_score(),
            "prompt evaluated"
        );
        session.last_evaluation_report = Some(report.clone());
        self.sessions.put(user_id, session).await?;
        Ok(EvaluationTurn { report, text })
    }

    /// Refines the user's last draft using their last evaluation (or a generic instruction
    /// when there is none). The refined prompt becomes the new draft.
    pub async fn improve(&self, user_id: &str) -> Result<String, EvalError> {
        let system = self.templates.require(REFINE_SYSTEM)?;
        let user_template = self.templates.require(REFINE_USER)?;
        let header = self.templates.require(REFINE_TARGETED_HEADER)?;
        let generic = self.templates.require(REFINE_GENERIC)?;

        let session = self.sessions.get(user_id).await?;
        let draft = session.last_draft_prompt.as_deref().ok_or(EvalError::NoDraft)?;
        let instruction = build_instruction(
            session.last_evaluation_report.as_ref(),
            &self.options.refinement,
            header,
            generic,
        );
        let prompt = fill(
            user_template,
            &[("instruction", instruction.as_str()), ("prompt", draft)],
        );
        debug!(user_id = %user_id, instruction = %instruction, "refining prompt");

        let refined = request_completion(self.llm.as_ref(), &prompt, Some(system)).await?;
        self.sessions
            .put(user_id, SessionState::with_draft(refined.clone()))
            .await?;
        info!(user_id = %user_id, "prompt refined");
        Ok(refined)
    }

    /// Current session of `user_id`.
    pub async fn session(&self, user_id: &str) -> Result<SessionState, EvalError> {
        Ok(self.sessions.get(user_id).await?)
    }
}

/// User-facing text for a failed turn; logs the failure.
pub fn handle_failure(user_id: &str, err: &EvalError) -> String {
    warn!(user_id = %user_id, error = %err, "turn failed");
    err.user_message().to_string()
}
