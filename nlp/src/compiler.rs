//! Compiles rules into the pattern tree.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::debug;

use crate::rule::{ConditionalOutput, Rule};
use crate::tokenizer::Tokenizer;
use crate::tree::{OutputKey, PatternTree};
use crate::word::{Quantifier, Word, WordKind};

/// Inserts every input phrase of `rule` and attaches its outputs.
///
/// Phrases without words are skipped. Returns the number of phrases compiled.
pub(crate) fn compile_rule(tree: &mut PatternTree, tokenizer: &dyn Tokenizer, rule: &Rule) -> usize {
    // (input index, node) pairs that receive the rule output
    let mut onodes = BTreeSet::new();

    for (i, input) in rule.input.iter().enumerate() {
        debug!("compiler: parsing rule {} input #{}", rule.id, i);
        let words = parse_rule_input(tokenizer, input);

        let Some(last) = words.last() else {
            debug!("compiler: rule {} input #{} has no words, skipped", rule.id, i);
            continue;
        };

        let mut cur = tree.root();
        for word in &words {
            cur = tree.add_node(word, cur);
        }
        onodes.insert((i, cur));

        // A trailing `*` may match nothing, so the node before it ends the phrase too
        if last.kind == WordKind::Wildcard(Quantifier::ZeroOrMore) {
            if let Some(parent) = tree.node(cur).parent() {
                if parent != tree.root() {
                    onodes.insert((i, parent));
                }
            }
        }
    }

    let outputs: Arc<[ConditionalOutput]> = Arc::from(rule.output.clone());
    let compiled: BTreeSet<usize> = onodes.iter().map(|(i, _)| *i).collect();
    for (input_index, node) in onodes {
        let key = OutputKey {
            rule_id: rule.id,
            input_index,
        };
        tree.attach_outputs(node, key, outputs.clone());
    }
    compiled.len()
}

/// Tokenizes a rule phrase: exact-match quotes are honored, symbols dropped.
pub(crate) fn parse_rule_input(tokenizer: &dyn Tokenizer, input: &str) -> Vec<Word> {
    let mut words = tokenizer.tokenize(input);
    parse_exact_match(&mut words);
    filter_symbols(&mut words);
    debug!("compiler: parsed rule input {:?} into {}", input, display_words(&words));
    words
}

/// Tokenizes user text: quote characters are removed first, symbols dropped.
pub(crate) fn parse_user_input(tokenizer: &dyn Tokenizer, input: &str) -> Vec<Word> {
    let input = input.replace('\'', "");
    let mut words = tokenizer.tokenize(&input);
    filter_symbols(&mut words);
    words
}

/// Turns `'word'` into a literal that only matches its exact lowercase text.
fn parse_exact_match(words: &mut [Word]) {
    for w in words.iter_mut() {
        let quoted = w.original.chars().count() >= 3
            && w.original.starts_with('\'')
            && w.original.ends_with('\'');
        if !quoted {
            continue;
        }
        let inner = w.original[1..w.original.len() - 1].to_lowercase();
        w.original = inner.clone();
        w.normalized = inner;
        w.lemma.clear();
        w.pos_tag.clear();
        w.kind = WordKind::Literal;
    }
}

fn filter_symbols(words: &mut Vec<Word>) {
    words.retain(|w| !w.is_symbol());
}

pub(crate) fn display_words(words: &[Word]) -> String {
    let parts: Vec<String> = words.iter().map(|w| w.to_string()).collect();
    format!("[{}]", parts.join(" "))
}
