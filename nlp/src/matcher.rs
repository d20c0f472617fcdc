//! The matching engine.
//!
//! Matching is a depth-first walk of the pattern tree against the tokenized
//! input. Every walk runs inside a [`Search`] that owns all mutable state of
//! one call: the capture stack and scorer of the current context, the saved
//! contexts of enclosing recursive expansions, and the loop detector.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::capture::CaptureStack;
use crate::compiler::{compile_rule, display_words, parse_user_input};
use crate::config::EngineConfig;
use crate::policy::{MatchPolicy, Scorer};
use crate::result::{rank, MatchResult};
use crate::rule::{Rule, RuleId};
use crate::template::{Segment, Template};
use crate::tokenizer::{SimpleTokenizer, Tokenizer};
use crate::tree::{NodeId, PatternTree};
use crate::word::Word;

/// A compiled rule set that answers utterances.
///
/// The engine is immutable while matching, so one instance can serve many
/// threads; each call to [`Engine::match_input`] keeps its own state.
pub struct Engine {
    tree: PatternTree,
    tokenizer: Arc<dyn Tokenizer>,
    policy: MatchPolicy,
    max_recursion_depth: usize,
    rule_ids: BTreeSet<RuleId>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Engine {
    /// Creates an empty engine using the built-in tokenizer.
    pub fn new(config: EngineConfig) -> Self {
        let tokenizer = Arc::new(SimpleTokenizer::new(config.tokenizer.clone()));
        Self::with_tokenizer(config, tokenizer)
    }

    /// Creates an empty engine using an external tokenizer.
    pub fn with_tokenizer(config: EngineConfig, tokenizer: Arc<dyn Tokenizer>) -> Self {
        Self {
            tree: PatternTree::new(),
            tokenizer,
            policy: MatchPolicy::new(config.weights),
            max_recursion_depth: config.max_recursion_depth,
            rule_ids: BTreeSet::new(),
        }
    }

    /// Compiles `rules` into the tree, in order.
    pub fn compile(&mut self, rules: &[Rule]) {
        for rule in rules {
            self.add_rule(rule);
        }
        debug!(
            "engine: compiled {} rules into {} nodes",
            self.rule_ids.len(),
            self.tree.len()
        );
    }

    /// Compiles one rule. Returns false if a rule with the same id was
    /// already compiled, in which case the rule is skipped.
    pub fn add_rule(&mut self, rule: &Rule) -> bool {
        if !self.rule_ids.insert(rule.id) {
            warn!("engine: duplicate rule id, skipping: {}", rule.id);
            return false;
        }
        let compiled = compile_rule(&mut self.tree, self.tokenizer.as_ref(), rule);
        if compiled < rule.input.len() {
            debug!(
                "engine: rule {} compiled {} of {} inputs",
                rule.id,
                compiled,
                rule.input.len()
            );
        }
        true
    }

    /// Drops every compiled rule.
    pub fn clear(&mut self) {
        self.tree = PatternTree::new();
        self.rule_ids.clear();
    }

    pub fn tree(&self) -> &PatternTree {
        &self.tree
    }

    /// Number of compiled rules.
    pub fn rule_count(&self) -> usize {
        self.rule_ids.len()
    }

    /// Returns every response for `input`, best first.
    pub fn match_input(&self, input: &str) -> Vec<MatchResult> {
        Search::new(self).run(input)
    }

    /// Returns the best response for `input`, if any rule matched.
    pub fn best_match(&self, input: &str) -> Option<MatchResult> {
        self.match_input(input).into_iter().next()
    }
}

/// Capture and scoring state of one (possibly nested) match.
#[derive(Default)]
struct Context<'e> {
    captures: CaptureStack<'e>,
    scorer: Scorer,
}

/// State of a single top-level call.
struct Search<'e> {
    engine: &'e Engine,
    current: Context<'e>,
    /// Contexts of enclosing recursive expansions, innermost last.
    saved: Vec<Context<'e>>,
    /// Terminal positions being resolved; shared with nested matches.
    visited: HashSet<(NodeId, usize)>,
}

impl<'e> Search<'e> {
    fn new(engine: &'e Engine) -> Self {
        Self {
            engine,
            current: Context::default(),
            saved: Vec::new(),
            visited: HashSet::new(),
        }
    }

    fn run(&mut self, input: &str) -> Vec<MatchResult> {
        let engine = self.engine;
        let words = parse_user_input(engine.tokenizer.as_ref(), input);
        debug!("engine: parsed user input {:?} into {}", input, display_words(&words));

        let mut results = Vec::new();
        self.scored_dfs(&mut results, engine.tree.root(), &words, 0);
        rank(&mut results);

        debug!("engine: {} results for {:?}", results.len(), input);
        results
    }

    fn scored_dfs(
        &mut self,
        results: &mut Vec<MatchResult>,
        node: NodeId,
        words: &[Word],
        offset: usize,
    ) {
        let Some(word) = words.get(offset) else {
            return;
        };

        let engine = self.engine;
        for &child in engine.tree.children(node) {
            let child_node = engine.tree.node(child);
            let weight = engine.policy.weight(child_node.kind(), word);

            self.current.captures.bind(offset, child_node.var_name());

            if weight > 0.0 {
                trace!(
                    "engine: {}{} matched {} {} with weight {}",
                    " ".repeat(offset * 2),
                    word,
                    child,
                    child_node.kind(),
                    weight
                );

                self.current.captures.capture(offset, &word.original);
                self.current.scorer.update(offset, weight);

                if offset + 1 < words.len() {
                    self.scored_dfs(results, child, words, offset + 1);
                } else {
                    self.handle_end_word(results, child, offset);
                }
            }
        }
    }

    fn handle_end_word(&mut self, results: &mut Vec<MatchResult>, node: NodeId, offset: usize) {
        let key = (node, offset);
        if !self.visited.insert(key) {
            debug!("engine: loop detected at {} offset {}, pruned", node, offset);
            return;
        }

        match self.resolve(node) {
            Some(mut result) => {
                result.score = self.current.scorer.current();
                results.push(result);
            }
            None => trace!("engine: no output at {} offset {}", node, offset),
        }

        self.visited.remove(&key);
    }

    /// Each output list offers its first applicable output; the first one
    /// that expands wins.
    fn resolve(&mut self, node: NodeId) -> Option<MatchResult> {
        let engine = self.engine;
        for (key, outputs) in engine.tree.node(node).outputs() {
            let Some(output) = outputs.iter().find(|o| o.applies(&self.current.captures)) else {
                continue;
            };
            match self.expand(&output.template) {
                Some(text) => {
                    return Some(MatchResult {
                        text,
                        rule_id: key.rule_id,
                        input_index: key.input_index,
                        score: 0.0,
                    });
                }
                None => debug!(
                    "engine: failed to expand output {:?} of rule {}, trying next rule",
                    output.template.source(),
                    key.rule_id
                ),
            }
        }
        None
    }

    /// Substitutes variable references. `None` if a recursive reference has
    /// no response.
    fn expand(&mut self, template: &Template) -> Option<String> {
        let mut out = String::new();
        for segment in template.segments() {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Var(name) => out.push_str(&self.current.captures.value(name)),
                Segment::Recursive(name) => {
                    let value = self.current.captures.value(name);
                    out.push_str(&self.nested_response(&value)?);
                }
            }
        }
        Some(out)
    }

    /// Matches `input` in a fresh context and returns the best response text.
    /// An empty best response counts as no response.
    fn nested_response(&mut self, input: &str) -> Option<String> {
        if self.saved.len() >= self.engine.max_recursion_depth {
            warn!(
                "engine: recursion depth {} reached, not expanding {:?}",
                self.saved.len(),
                input
            );
            return None;
        }

        let outer = std::mem::take(&mut self.current);
        self.saved.push(outer);

        let best = self.run(input).into_iter().next();

        if let Some(outer) = self.saved.pop() {
            self.current = outer;
        }
        best.map(|r| r.text).filter(|text| !text.is_empty())
    }
}
