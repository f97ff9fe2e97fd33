//! # Promptsmith
//!
//! Drafts a task-specific prompt with an LLM, has the same LLM score that prompt against a
//! 15-criterion rubric, and refines it from the evaluation.
//!
//! The core is the evaluation pipeline in [`evaluation`]: model output is not a trustworthy
//! wire format (it arrives fenced, truncated by token limits, with inconsistent key casing or
//! missing fields), so it goes through fence stripping ([`strip_fences`]), truncation-tolerant
//! parsing ([`parse_truncated`]), alias-table normalization ([`normalize`]) and deterministic
//! rendering ([`render`]).
//!
//! ## Main modules
//!
//! - [`evaluation`]: [`EvaluationReport`], [`CriterionRecord`], [`run_evaluation`], [`evaluate_raw`], [`rendered_text`].
//! - [`orchestrator`]: [`ConversationOrchestrator`] (start / draft / evaluate / improve), [`RefinementPolicy`], [`ImprovementFilter`].
//! - [`llm`]: [`LlmClient`] trait, [`ChatOpenAI`], [`MockLlm`], [`request_completion`].
//! - [`prompts`]: [`PromptTemplates`] loaded from YAML ([`prompts::load`], [`prompts::load_or_default`]).
//! - [`session`]: [`SessionState`], [`SessionStore`], [`InMemorySessionStore`], [`SqliteSessionStore`].
//! - [`error`]: [`EvalError`].
//!
//! ## Quick start
//!
//! ```rust
//! use promptsmith::{evaluate_raw, rendered_text};
//!
//! let raw = "```json\n{\"1. Clarity\": {\"Score\": 4, \"Strength\": \"Clear\", \"Improvement\": \"Add examples\"}, \"Total Score\": 60}\n```";
//! let report = evaluate_raw(raw).unwrap();
//! assert_eq!(report.criteria()[0].score(), Some(4.0));
//! println!("{}", rendered_text(&report));
//! ```

pub mod error;
pub mod evaluation;
pub mod llm;
pub mod message;
pub mod orchestrator;
pub mod prompts;
pub mod session;

pub use error::EvalError;
pub use evaluation::{
    evaluate_raw, normalize, parse_truncated, render, rendered_text, run_evaluation,
    strip_fences, CriterionRecord, EvaluationReport,
};
pub use llm::{request_completion, ChatOpenAI, LlmClient, LlmResponse, LlmUsage, MockLlm};
pub use message::Message;
pub use orchestrator::{
    handle_failure, ConversationOrchestrator, EvaluationTurn, ImprovementFilter,
    OrchestratorOptions, RefinementPolicy,
};
pub use prompts::PromptTemplates;
pub use session::{
    InMemorySessionStore, SessionState, SessionStore, SessionStoreError, SqliteSessionStore,
};
