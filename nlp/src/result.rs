//! Match results and ranking.

use serde::{Deserialize, Serialize};

use crate::rule::RuleId;

/// A response produced by one rule phrase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Expanded output text.
    pub text: String,
    pub rule_id: RuleId,
    /// Index of the rule input phrase that matched.
    pub input_index: usize,
    pub score: f32,
}

/// Sorts by descending score. Equal scores keep their discovery order.
pub fn rank(results: &mut [MatchResult]) {
    results.sort_by(|a, b| b.score.total_cmp(&a.score));
}
