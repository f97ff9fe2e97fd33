//! Renders an [`EvaluationReport`] as chat-ready text.

use super::report::{EvaluationReport, MAX_CRITERION_SCORE, MAX_TOTAL_SCORE};

/// First line of every rendered report.
pub const REPORT_HEADER: &str = "📊 Prompt evaluation";

/// Shown instead of a score the model did not give.
const MISSING_SCORE: &str = "-";

/// Renders `report`: header, one block per criterion in report order, then the total line
/// when the report carries a total. Blocks are separated by a blank line.
pub fn render(report: &EvaluationReport) -> String {
    let mut blocks = Vec::with_capacity(report.criteria().len() + 2);
    blocks.push(REPORT_HEADER.to_string());
    for c in report.criteria() {
        blocks.push(format!(
            "{}\nScore: {}/{}\nStrength: {}\nImprovement: {}",
            c.name(),
            format_score(c.score()),
            format_number(MAX_CRITERION_SCORE),
            c.strength(),
            c.improvement(),
        ));
    }
    if let Some(total) = report.total_score() {
        blocks.push(format!(
            "Total score: {}/{}",
            format_number(total),
            format_number(MAX_TOTAL_SCORE)
        ));
    }
    blocks.join("\n\n")
}

fn format_score(score: Option<f64>) -> String {
    score
        .map(format_number)
        .unwrap_or_else(|| MISSING_SCORE.to_string())
}

/// Whole numbers without a fractional part (`4`, not `4.0`).
pub(crate) fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}
