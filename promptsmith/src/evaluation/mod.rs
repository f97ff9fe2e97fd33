//! Evaluation pipeline: raw model output → fence stripping → truncation-tolerant parse →
//! normalization → rendering.
//!
//! [`run_evaluation`] performs the backend call and the whole pipeline; [`evaluate_raw`] is
//! the offline part for output that is already at hand. Any stage failure ends the pipeline
//! with an [`EvalError`].

mod fence;
mod normalize;
mod parse;
mod render;
mod report;

pub use fence::strip_fences;
pub use normalize::{normalize, Field};
pub use parse::parse_truncated;
pub use render::{render, REPORT_HEADER};
pub(crate) use render::format_number;
pub use report::{
    CriterionRecord, EvaluationReport, MAX_CRITERION_SCORE, MAX_TOTAL_SCORE, RUBRIC_CRITERIA,
};

use tracing::{debug, warn};

use crate::error::EvalError;
use crate::llm::{request_completion, LlmClient};

/// Heading placed between the rubric and the prompt under evaluation.
const EVALUATED_PROMPT_HEADING: &str = "Prompt to evaluate:";

/// Builds the evaluation request: rubric, blank line, heading, drafted prompt.
pub fn evaluation_prompt(draft_prompt: &str, rubric_template: &str) -> String {
    format!(
        "{}\n\n{}\n{}",
        rubric_template.trim_end(),
        EVALUATED_PROMPT_HEADING,
        draft_prompt
    )
}

/// Turns raw model output into an [`EvaluationReport`].
///
/// A [`EvalError::ParseFailure`] carries `raw` exactly as received.
pub fn evaluate_raw(raw: &str) -> Result<EvaluationReport, EvalError> {
    let stripped = strip_fences(raw);
    let value = parse_truncated(&stripped).map_err(|e| match e {
        EvalError::ParseFailure { .. } => EvalError::ParseFailure {
            raw: raw.to_string(),
        },
        other => other,
    })?;
    normalize(&value)
}

/// Asks the backend to evaluate `draft_prompt` against `rubric_template` and normalizes the
/// answer. One backend call, no retries.
pub async fn run_evaluation(
    llm: &dyn LlmClient,
    draft_prompt: &str,
    rubric_template: &str,
) -> Result<EvaluationReport, EvalError> {
    let prompt = evaluation_prompt(draft_prompt, rubric_template);
    let raw = request_completion(llm, &prompt, None).await?;
    debug!(raw_chars = raw.chars().count(), "evaluation received");
    match evaluate_raw(&raw) {
        Ok(report) => Ok(report),
        Err(e) => {
            warn!(error = %e, raw = %raw, "evaluation output rejected");
            Err(e)
        }
    }
}

/// Display text for a report.
pub fn rendered_text(report: &EvaluationReport) -> String {
    render(report)
}
