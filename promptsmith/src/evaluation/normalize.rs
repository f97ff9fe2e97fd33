//! Maps a parsed, loosely keyed evaluation record onto [`EvaluationReport`].
//!
//! Accepted key spellings live in one table ([`Field::aliases`]) instead of being scattered
//! through the lookup code. Missing fields are filled with defaults; the only failure is a
//! top-level value that is not an object.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::EvalError;

use super::report::{CriterionRecord, EvaluationReport};

/// Two-character escape some models emit instead of a real line break.
const LITERAL_LINE_BREAK: &str = "\\n";

/// A field the normalizer reads from model output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    /// Wrapper object that nests the per-criterion map one level deeper.
    Evaluation,
    Score,
    Strength,
    Improvement,
    /// Top-level aggregate score.
    TotalScore,
}

impl Field {
    /// Accepted keys in priority order; the capitalized spelling wins when both are present.
    pub const fn aliases(self) -> &'static [&'static str] {
        match self {
            Field::Evaluation => &["Evaluation", "evaluation"],
            Field::Score => &["Score", "score"],
            Field::Strength => &["Strength", "strength"],
            Field::Improvement => &["Improvement", "improvement"],
            Field::TotalScore => &["Total Score", "total_score"],
        }
    }

    /// First non-null value stored under one of this field's aliases.
    pub fn lookup(self, map: &Map<String, Value>) -> Option<&Value> {
        self.aliases()
            .iter()
            .filter_map(|key| map.get(*key))
            .find(|v| !v.is_null())
    }

    /// First object stored under one of this field's aliases; scalar values are skipped.
    pub fn lookup_object(self, map: &Map<String, Value>) -> Option<&Map<String, Value>> {
        self.aliases()
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_object))
    }
}

/// Normalizes a parsed evaluation record.
///
/// Entries whose value is an object become criteria, in source order; scalar entries (such as
/// the total score) are not criteria. Fails with [`EvalError::Schema`] only when `record` is
/// not an object.
pub fn normalize(record: &Value) -> Result<EvaluationReport, EvalError> {
    let outer = record
        .as_object()
        .ok_or_else(|| EvalError::Schema(json_kind(record).to_string()))?;

    let body = match Field::Evaluation.lookup_object(outer) {
        Some(inner) => {
            debug!("unwrapping nested evaluation object");
            inner
        }
        None => outer,
    };

    let mut criteria = Vec::new();
    for (key, value) in body {
        let Some(fields) = value.as_object() else {
            continue;
        };
        match criterion_from_fields(key, fields) {
            Some(c) => criteria.push(c),
            None => warn!("skipping criterion with empty name"),
        }
    }

    let total_score = Field::TotalScore
        .lookup(body)
        .or_else(|| Field::TotalScore.lookup(outer))
        .and_then(score_value);

    debug!(
        criteria = criteria.len(),
        has_total = total_score.is_some(),
        "normalized evaluation"
    );
    Ok(EvaluationReport::new(criteria, total_score))
}

fn criterion_from_fields(name: &str, fields: &Map<String, Value>) -> Option<CriterionRecord> {
    let score = Field::Score.lookup(fields).and_then(score_value);
    let strength = Field::Strength
        .lookup(fields)
        .map(text_value)
        .unwrap_or_default();
    let improvement = Field::Improvement
        .lookup(fields)
        .map(text_value)
        .unwrap_or_default();
    CriterionRecord::new(name, score, strength, improvement)
}

/// Reads a score from a number or a numeric string (`"4"`, `"4/5"`, `" 3.5 "`).
fn score_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let head = s.split('/').next().unwrap_or_default().trim();
            head.parse::<f64>().ok().filter(|f| f.is_finite())
        }
        _ => None,
    }
}

/// Text of a free-form field with literal `\n` escapes turned into line breaks.
/// Non-string values keep their JSON rendering.
fn text_value(value: &Value) -> String {
    let text = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    text.replace(LITERAL_LINE_BREAK, "\n")
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
