//! Match weights and path scoring.

use crate::config::MatchWeights;
use crate::tree::NodeKind;
use crate::word::Word;

/// Decides how well a node matches an input word.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchPolicy {
    weights: MatchWeights,
}

impl MatchPolicy {
    pub fn new(weights: MatchWeights) -> Self {
        Self { weights }
    }

    /// Weight of matching `word` at `node`; zero means no match.
    pub fn weight(&self, node: &NodeKind, word: &Word) -> f32 {
        match node {
            NodeKind::Root => 0.0,
            NodeKind::Word(w) => {
                let same_norm = w.normalized == word.normalized;
                let same_lemma = !w.lemma.is_empty() && w.lemma == word.lemma;
                if same_norm || same_lemma {
                    self.weights.word
                } else {
                    0.0
                }
            }
            NodeKind::Wildcard(_) => self.weights.wildcard,
            NodeKind::Variable(_) => self.weights.variable,
        }
    }
}

/// Running score of the current search path.
///
/// Keeps one prefix sum per input offset so that backtracking to an earlier
/// offset discards the contributions of the abandoned branch.
#[derive(Debug, Clone, Default)]
pub struct Scorer {
    sums: Vec<f32>,
}

impl Scorer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a match of `weight` at `offset`. Later offsets weigh more.
    pub fn update(&mut self, offset: usize, weight: f32) {
        self.sums.truncate(offset);
        let prev = self.sums.last().copied().unwrap_or(0.0);
        self.sums.resize(offset, prev);
        self.sums.push(prev + weight * (offset + 1) as f32);
    }

    pub fn current(&self) -> f32 {
        self.sums.last().copied().unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::word::Quantifier;

    #[test]
    fn test_word_weight() {
        let policy = MatchPolicy::default();
        let node = NodeKind::Word(Word::new("run", "run", "run", ""));

        assert_eq!(policy.weight(&node, &Word::plain("run")), 1.0);
        assert_eq!(policy.weight(&node, &Word::new("running", "running", "run", "")), 1.0);
        assert_eq!(policy.weight(&node, &Word::plain("walk")), 0.0);
    }

    #[test]
    fn test_exact_word_ignores_lemma() {
        let policy = MatchPolicy::default();
        let node = NodeKind::Word(Word::new("run", "run", "", ""));
        assert_eq!(policy.weight(&node, &Word::new("running", "running", "run", "")), 0.0);
        assert_eq!(policy.weight(&node, &Word::plain("run")), 1.0);
    }

    #[test]
    fn test_loop_weights() {
        let policy = MatchPolicy::new(MatchWeights {
            word: 2.0,
            variable: 0.4,
            wildcard: 0.1,
        });
        let word = Word::plain("anything");
        assert_eq!(policy.weight(&NodeKind::Wildcard(Quantifier::OneOrMore), &word), 0.1);
        assert_eq!(policy.weight(&NodeKind::Variable("x".into()), &word), 0.4);
        assert_eq!(policy.weight(&NodeKind::Root, &word), 0.0);
    }

    #[test]
    fn test_scorer_backtracking() {
        let mut s = Scorer::new();
        assert_eq!(s.current(), 0.0);

        s.update(0, 1.0);
        s.update(1, 1.0);
        assert_eq!(s.current(), 3.0);

        // Sibling branch at offset 1
        s.update(1, 0.5);
        assert_eq!(s.current(), 2.0);

        s.update(0, 0.5);
        assert_eq!(s.current(), 0.5);
    }

    #[test]
    fn test_longer_literal_path_scores_higher() {
        let mut literal = Scorer::new();
        let mut wild = Scorer::new();
        for offset in 0..3 {
            literal.update(offset, 1.0);
            wild.update(offset, if offset == 2 { 0.5 } else { 1.0 });
        }
        assert!(literal.current() > wild.current());
    }
}
