//! Error types for one conversation turn.
//!
//! Every variant is terminal for the turn that produced it: nothing in the crate retries a
//! backend call. [`EvalError::user_message`] gives the text shown to the end user; the
//! `Display` output and the `raw` payload of [`EvalError::ParseFailure`] are for logs only.

use thiserror::Error;

use crate::session::SessionStoreError;

/// Failure of a draft, evaluation or refinement turn.
#[derive(Debug, Error)]
pub enum EvalError {
    /// The LLM call failed or returned no content.
    #[error("backend error: {0}")]
    Backend(String),

    /// No structurally valid object boundary was found after exhaustive trimming.
    ///
    /// `raw` is the model output as received, kept for diagnostics.
    #[error("could not parse evaluation ({} chars of model output)", raw.chars().count())]
    ParseFailure { raw: String },

    /// The parsed value is not a map-like record (bare array, string, number...).
    #[error("evaluation is not an object: {0}")]
    Schema(String),

    /// A prompt template required by the turn is not configured.
    #[error("prompt template not found: {0}")]
    TemplateMissing(String),

    /// Evaluate or improve was requested before any prompt was drafted.
    #[error("no drafted prompt in session")]
    NoDraft,

    /// Reading or writing the per-user session failed.
    #[error(transparent)]
    Session(#[from] SessionStoreError),
}

impl EvalError {
    /// Text safe to show to the end user. Never includes raw model output.
    pub fn user_message(&self) -> &'static str {
        match self {
            EvalError::Backend(_) => {
                "A processing error occurred while contacting the model. Please try again."
            }
            EvalError::ParseFailure { .. } | EvalError::Schema(_) => {
                "Could not parse the evaluation returned by the model. Please run the evaluation again."
            }
            EvalError::TemplateMissing(_) => {
                "The assistant is misconfigured (missing prompt template). Please contact the operator."
            }
            EvalError::NoDraft => "There is no prompt yet. Describe your task first.",
            EvalError::Session(_) => "Your session could not be loaded or saved. Please try again.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_failure_display_omits_raw_text() {
        let err = EvalError::ParseFailure {
            raw: "{\"secret\": ".to_string(),
        };
        let s = err.to_string();
        assert!(s.contains("could not parse evaluation"), "{}", s);
        assert!(!s.contains("secret"), "{}", s);
    }

    #[test]
    fn parse_and_schema_errors_share_user_message() {
        let parse = EvalError::ParseFailure { raw: String::new() };
        let schema = EvalError::Schema("array".to_string());
        assert_eq!(parse.user_message(), schema.user_message());
    }

    #[test]
    fn backend_user_message_is_generic() {
        let err = EvalError::Backend("HTTP 500 from upstream".to_string());
        assert!(err.user_message().contains("processing error"));
        assert!(!err.user_message().contains("500"));
    }
}
