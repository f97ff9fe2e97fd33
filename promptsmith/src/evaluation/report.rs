//! Canonical evaluation structure produced by normalization.

use serde::{Deserialize, Serialize};

/// Highest score a single criterion can receive.
pub const MAX_CRITERION_SCORE: f64 = 5.0;

/// Number of criteria in the rubric.
pub const RUBRIC_CRITERIA: u32 = 15;

/// Highest possible total: every criterion at [`MAX_CRITERION_SCORE`].
pub const MAX_TOTAL_SCORE: f64 = RUBRIC_CRITERIA as f64 * MAX_CRITERION_SCORE;

/// One rubric dimension as reported by the model.
///
/// `name` is never empty. Text fields may be empty; a record with nothing but a name is
/// still a valid record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CriterionRecord {
    name: String,
    score: Option<f64>,
    strength: String,
    improvement: String,
}

impl CriterionRecord {
    /// Returns `None` when `name` is empty or whitespace only.
    pub fn new(
        name: impl Into<String>,
        score: Option<f64>,
        strength: impl Into<String>,
        improvement: impl Into<String>,
    ) -> Option<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return None;
        }
        Some(Self {
            name,
            score,
            strength: strength.into(),
            improvement: improvement.into(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn score(&self) -> Option<f64> {
        self.score
    }

    pub fn strength(&self) -> &str {
        &self.strength
    }

    pub fn improvement(&self) -> &str {
        &self.improvement
    }
}

/// Normalized evaluation of one drafted prompt.
///
/// `criteria` keeps the order in which the model listed them. `total_score` is the model's
/// own total and is never computed from the criteria.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    criteria: Vec<CriterionRecord>,
    total_score: Option<f64>,
}

impl EvaluationReport {
    pub fn new(criteria: Vec<CriterionRecord>, total_score: Option<f64>) -> Self {
        Self {
            criteria,
            total_score,
        }
    }

    pub fn criteria(&self) -> &[CriterionRecord] {
        &self.criteria
    }

    pub fn total_score(&self) -> Option<f64> {
        self.total_score
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty() && self.total_score.is_none()
    }
}
