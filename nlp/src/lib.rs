//! Rule-based conversational pattern matching.
//!
//! Rules map input phrases to conditional outputs. Input phrases are made of
//! words, wildcards and variables:
//! - `hello` - a literal word (matches its normalized form or lemma)
//! - `'hello'` - an exact literal (no lemma matching)
//! - `*` - zero or more words
//! - `+` - one or more words
//! - `[name]` - one or more words captured as `name`
//!
//! Outputs can reference captures with `[name]`, or feed a capture back
//! through the engine with `^[name]` and use the best response.
//!
//! All rules are compiled into one shared word tree; matching walks the tree
//! depth first, scores every complete path and ranks the responses.
//!
//! # Example
//!
//! ```rust
//! use parley_nlp::{Engine, Rule};
//!
//! let mut engine = Engine::default();
//! engine.compile(&[
//!     Rule::new(1).with_input("hello").with_output("hi there"),
//!     Rule::new(2).with_input("my name is [name]").with_output("nice to meet you [name]"),
//! ]);
//!
//! let best = engine.best_match("My name is Bob").unwrap();
//! assert_eq!(best.rule_id, 2);
//! assert_eq!(best.text, "nice to meet you Bob");
//! assert!(engine.match_input("goodbye").is_empty());
//! ```

mod capture;
mod compiler;
mod condition;
mod config;
mod error;
mod matcher;
mod policy;
mod result;
mod rule;
mod template;
mod tokenizer;
mod tree;
mod word;

pub use capture::CaptureStack;
pub use condition::Condition;
pub use config::{EngineConfig, MatchWeights, TokenizerConfig};
pub use error::{Error, Result};
pub use matcher::Engine;
pub use policy::{MatchPolicy, Scorer};
pub use result::{rank, MatchResult};
pub use rule::{parse_rules_json, parse_rules_yaml, ConditionalOutput, Rule, RuleId};
pub use template::{Segment, Template, RECURSIVE_MARKER};
pub use tokenizer::{SimpleTokenizer, Tokenizer};
pub use tree::{Node, NodeId, NodeKind, OutputKey, OutputMap, PatternTree};
pub use word::{Quantifier, Word, WordKind, PLUS_OP, STAR_OP};

#[cfg(test)]
mod tests;
