//! Builds the refinement instruction from the last evaluation.
//!
//! Criteria scoring below the threshold are listed with their improvement text. Criteria the
//! model left unscored are never listed. Whether a below-threshold criterion with an empty or
//! literal `None` improvement is listed is the [`ImprovementFilter`] option.

use crate::evaluation::{format_number, CriterionRecord, EvaluationReport, MAX_CRITERION_SCORE};

/// Improvement text models use to say "nothing to improve".
const NONE_MARKER: &str = "none";

/// Which below-threshold criteria are listed in a targeted refinement instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ImprovementFilter {
    /// List every below-threshold criterion, whatever its improvement text.
    IncludeAll,
    /// Drop criteria whose improvement is empty or a literal `None` (any case).
    #[default]
    SkipEmptyOrNone,
}

impl std::str::FromStr for ImprovementFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "include_all" | "all" => Ok(Self::IncludeAll),
            "skip_empty_or_none" | "skip_none" => Ok(Self::SkipEmptyOrNone),
            _ => Err(format!(
                "unknown improvement filter: {} (use include_all or skip_empty_or_none)",
                s
            )),
        }
    }
}

/// How a refinement instruction is derived from an evaluation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RefinementPolicy {
    /// Criteria scoring strictly below this are refinement targets.
    pub threshold: f64,
    pub filter: ImprovementFilter,
}

impl Default for RefinementPolicy {
    fn default() -> Self {
        Self {
            threshold: MAX_CRITERION_SCORE,
            filter: ImprovementFilter::default(),
        }
    }
}

impl RefinementPolicy {
    pub fn with_filter(mut self, filter: ImprovementFilter) -> Self {
        self.filter = filter;
        self
    }
}

fn is_actionable(improvement: &str) -> bool {
    let text = improvement.trim();
    !text.is_empty() && !text.trim_end_matches('.').eq_ignore_ascii_case(NONE_MARKER)
}

/// Criteria to address, in report order.
pub fn improvement_targets<'a>(
    report: &'a EvaluationReport,
    policy: &RefinementPolicy,
) -> Vec<&'a CriterionRecord> {
    report
        .criteria()
        .iter()
        .filter(|c| c.score().is_some_and(|s| s < policy.threshold))
        .filter(|c| match policy.filter {
            ImprovementFilter::IncludeAll => true,
            ImprovementFilter::SkipEmptyOrNone => is_actionable(c.improvement()),
        })
        .collect()
}

fn target_line(c: &CriterionRecord) -> String {
    let score = c.score().map(format_number).unwrap_or_default();
    let head = format!(
        "- {} ({}/{})",
        c.name(),
        score,
        format_number(MAX_CRITERION_SCORE)
    );
    let improvement = c.improvement().trim();
    if improvement.is_empty() {
        head
    } else {
        format!("{}: {}", head, improvement)
    }
}

/// Targeted instruction (`targeted_header` plus one line per target) or `generic` when there
/// is no report or nothing to address.
pub fn build_instruction(
    report: Option<&EvaluationReport>,
    policy: &RefinementPolicy,
    targeted_header: &str,
    generic: &str,
) -> String {
    let targets = report
        .map(|r| improvement_targets(r, policy))
        .unwrap_or_default();
    if targets.is_empty() {
        return generic.trim().to_string();
    }
    let mut lines = vec![targeted_header.trim().to_string()];
    lines.extend(targets.into_iter().map(target_line));
    lines.join("\n")
}
